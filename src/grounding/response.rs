//! Turns free-form model output into one validated, normalized box.
//!
//! Expected shape is `Thought: … BBox: [xmin, ymin, xmax, ymax]`, but nothing
//! is assumed: markers may be missing, there may be several bracketed groups,
//! values may be pixels instead of fractions. Failure is reported through the
//! degenerate box, never through an error.

use regex::Regex;

use crate::config::ResolverConfig;
use crate::errors::{GroundError, GroundResult};
use crate::grounding::types::{NormalizedBox, ResolvedAnswer};

pub const EXTRACTION_FAILED: &str = "failed to extract a valid bounding box";

const THOUGHT_PATTERN: &str =
    r"(?is)(?:thought|思考过程|思考)\s*[:：]\s*(.*?)\s*(?:(?:bbox|边界框|坐标)\s*[:：]|\z)";
const MARKED_GROUP_PATTERN: &str = r"(?i)(?:bbox|边界框|坐标)\s*[:：]?\s*\[([^\[\]]*)\]";
const ANY_GROUP_PATTERN: &str = r"\[([^\[\]]*)\]";
const NUMBER_PATTERN: &str = r"[-+]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][-+]?[0-9]+)?";

#[derive(Debug, Clone)]
pub struct ResponseResolver {
    config: ResolverConfig,
    thought: Regex,
    marked_group: Regex,
    any_group: Regex,
    number: Regex,
}

impl ResponseResolver {
    pub fn new(config: ResolverConfig) -> GroundResult<Self> {
        if !(config.pixel_threshold > 0.0) {
            return Err(GroundError::Config(format!(
                "pixel_threshold must be positive, got {}",
                config.pixel_threshold
            )));
        }
        if config.precision > 12 {
            return Err(GroundError::Config(format!(
                "precision must be at most 12 digits, got {}",
                config.precision
            )));
        }
        let compile = |p: &str| {
            Regex::new(p).map_err(|e| GroundError::Config(format!("resolver pattern: {e}")))
        };
        Ok(Self {
            thought: compile(THOUGHT_PATTERN)?,
            marked_group: compile(MARKED_GROUP_PATTERN)?,
            any_group: compile(ANY_GROUP_PATTERN)?,
            number: compile(NUMBER_PATTERN)?,
            config,
        })
    }

    /// Resolve `text` against an image of `image_size = (W, H)` pixels.
    ///
    /// Candidates are tried last-to-first: a model that restates its answer
    /// usually means the later one. The first candidate that survives unit
    /// inference, clamping, rounding and validation wins.
    pub fn resolve(&self, text: &str, image_size: (u32, u32)) -> ResolvedAnswer {
        let thought = self.extract_thought(text);
        let candidates = self.extract_candidates(text);

        for (rank, values) in candidates.iter().enumerate().rev() {
            match self.normalize(*values, image_size) {
                Some(bbox) => {
                    tracing::debug!(
                        candidate = rank,
                        of = candidates.len(),
                        bbox = ?bbox.to_array(),
                        "grounding box resolved"
                    );
                    return ResolvedAnswer { thought, bbox };
                }
                None => {
                    tracing::debug!(candidate = rank, values = ?values, "candidate rejected");
                }
            }
        }

        tracing::warn!(
            candidates = candidates.len(),
            response = %preview(text),
            "no valid bounding box in response"
        );
        let note = if thought.is_empty() {
            EXTRACTION_FAILED.to_string()
        } else {
            format!("{EXTRACTION_FAILED}\n{thought}")
        };
        ResolvedAnswer {
            thought: note,
            bbox: NormalizedBox::DEGENERATE,
        }
    }

    /// Text between a leading `Thought:` marker and the first `BBox:` marker,
    /// trimmed. Empty when there is no rationale marker.
    pub fn extract_thought(&self, text: &str) -> String {
        self.thought
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    }

    /// Every four-number bracketed group in order of appearance.
    ///
    /// Groups right after a coordinate marker take precedence; only when
    /// there are none does any bracketed group with exactly four numbers count.
    pub fn extract_candidates(&self, text: &str) -> Vec<[f64; 4]> {
        let marked = self.tuples(&self.marked_group, text);
        if !marked.is_empty() {
            return marked;
        }
        self.tuples(&self.any_group, text)
    }

    fn tuples(&self, groups: &Regex, text: &str) -> Vec<[f64; 4]> {
        groups
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .filter_map(|inner| self.four_numbers(inner.as_str()))
            .collect()
    }

    fn four_numbers(&self, s: &str) -> Option<[f64; 4]> {
        let nums: Vec<f64> = self
            .number
            .find_iter(s)
            .map(|m| m.as_str().parse::<f64>())
            .collect::<Result<_, _>>()
            .ok()?;
        <[f64; 4]>::try_from(nums).ok()
    }

    /// Pixel → fraction conversion when any value exceeds the pixel threshold,
    /// then clamp, round and validate.
    fn normalize(&self, values: [f64; 4], (w, h): (u32, u32)) -> Option<NormalizedBox> {
        let values = if values.iter().any(|&v| v > self.config.pixel_threshold) {
            if w == 0 || h == 0 {
                return None;
            }
            let (w, h) = (w as f64, h as f64);
            [values[0] / w, values[1] / h, values[2] / w, values[3] / h]
        } else {
            values
        };
        NormalizedBox::canonicalize(values, self.config.precision)
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 200;
    match text.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> ResponseResolver {
        ResponseResolver::new(ResolverConfig::default()).unwrap()
    }

    #[test]
    fn well_formed_normalized_answer() {
        let a = resolver().resolve("Thought: ok\nBBox: [0.1, 0.2, 0.5, 0.6]", (100, 100));
        assert_eq!(a.thought, "ok");
        assert_eq!(a.bbox.to_array(), [0.1, 0.2, 0.5, 0.6]);
        assert!(a.found());
    }

    #[test]
    fn pixel_scale_is_inferred() {
        let a = resolver().resolve("BBox: [10, 20, 50, 60]", (100, 100));
        assert_eq!(a.bbox.to_array(), [0.1, 0.2, 0.5, 0.6]);
        assert_eq!(a.thought, "");
    }

    #[test]
    fn pixel_values_use_width_for_x_and_height_for_y() {
        let a = resolver().resolve("BBox: [50, 100, 250, 400]", (500, 800));
        assert_eq!(a.bbox.to_array(), [0.1, 0.125, 0.5, 0.5]);
    }

    #[test]
    fn small_overshoot_stays_normalized_and_is_clamped() {
        let a = resolver().resolve("BBox: [0.2, 0.3, 1.05, 0.9]", (1000, 1000));
        assert_eq!(a.bbox.to_array(), [0.2, 0.3, 1.0, 0.9]);
    }

    #[test]
    fn inverted_box_yields_sentinel() {
        let a = resolver().resolve("Thought: hmm BBox: [0.9,0.9,0.5,0.5]", (100, 100));
        assert!(!a.found());
        assert_eq!(a.bbox.to_array(), [0.0; 4]);
        assert!(a.thought.starts_with(EXTRACTION_FAILED));
        assert!(a.thought.ends_with("hmm"));
    }

    #[test]
    fn later_valid_candidate_wins() {
        let text = "Thought: first guess BBox: [0.1, 0.1, 0.2, 0.2]\n\
                    Actually, correcting myself. BBox: [0.3, 0.3, 0.4, 0.4]";
        let a = resolver().resolve(text, (100, 100));
        assert_eq!(a.bbox.to_array(), [0.3, 0.3, 0.4, 0.4]);
        assert_eq!(a.thought, "first guess");
    }

    #[test]
    fn invalid_later_candidate_falls_back_to_earlier() {
        let text = "BBox: [0.1, 0.1, 0.2, 0.2] then BBox: [0.9, 0.9, 0.5, 0.5]";
        let a = resolver().resolve(text, (100, 100));
        assert_eq!(a.bbox.to_array(), [0.1, 0.1, 0.2, 0.2]);
    }

    #[test]
    fn unmarked_groups_need_exactly_four_numbers() {
        let text = "The answer is [1, 2, 3] or maybe [0.25, 0.25, 0.75, 0.5] and [1,2,3,4,5]";
        let r = resolver();
        assert_eq!(r.extract_candidates(text), vec![[0.25, 0.25, 0.75, 0.5]]);
        assert_eq!(r.resolve(text, (10, 10)).bbox.to_array(), [0.25, 0.25, 0.75, 0.5]);
    }

    #[test]
    fn marked_groups_shadow_unmarked_ones() {
        let text = "see [0.5, 0.5, 0.6, 0.6]; bbox: [0.1, 0.1, 0.2, 0.2]";
        assert_eq!(resolver().extract_candidates(text), vec![[0.1, 0.1, 0.2, 0.2]]);
    }

    #[test]
    fn marker_is_case_insensitive_and_localized() {
        let r = resolver();
        assert_eq!(r.extract_candidates("BBOX:[0.1,0.2,0.3,0.4]").len(), 1);
        let a = r.resolve("思考：搜索框在顶部\n坐标：[0.1, 0.05, 0.9, 0.15]", (500, 800));
        assert_eq!(a.thought, "搜索框在顶部");
        assert_eq!(a.bbox.to_array(), [0.1, 0.05, 0.9, 0.15]);
    }

    #[test]
    fn numeric_token_forms() {
        let r = resolver();
        assert_eq!(
            r.extract_candidates("bbox: [+1e-1, .2, 5E-1, 6.]"),
            vec![[0.1, 0.2, 0.5, 6.0]]
        );
        assert_eq!(
            r.extract_candidates("bbox: [-0.1, 0.2, 0.5, 0.6]"),
            vec![[-0.1, 0.2, 0.5, 0.6]]
        );
    }

    #[test]
    fn negative_values_are_clamped_to_zero() {
        let a = resolver().resolve("bbox: [-0.1, 0.2, 0.5, 0.6]", (100, 100));
        assert_eq!(a.bbox.to_array(), [0.0, 0.2, 0.5, 0.6]);
    }

    #[test]
    fn output_is_rounded_to_three_digits() {
        let a = resolver().resolve("BBox: [0.12345, 0.2, 0.56789, 0.6]", (100, 100));
        assert_eq!(a.bbox.to_array(), [0.123, 0.2, 0.568, 0.6]);
        let again = NormalizedBox::canonicalize(a.bbox.to_array(), 3).unwrap();
        assert_eq!(again, a.bbox);
    }

    #[test]
    fn arbitrary_text_degrades_gracefully() {
        let r = resolver();
        for text in ["", "no idea", "[", "BBox: []", "Thought:", "BBox: [a, b, c, d]"] {
            let a = r.resolve(text, (100, 100));
            assert!(!a.found(), "{text:?}");
            assert!(a.thought.starts_with(EXTRACTION_FAILED));
        }
    }

    #[test]
    fn pixel_tuple_against_empty_image_is_rejected() {
        let a = resolver().resolve("BBox: [10, 20, 50, 60]", (0, 0));
        assert!(!a.found());
    }

    #[test]
    fn thought_without_bbox_marker_runs_to_end() {
        let r = resolver();
        assert_eq!(r.extract_thought("Thought:  looking at the header  "), "looking at the header");
        assert_eq!(r.extract_thought("no rationale here [0.1,0.2,0.3,0.4]"), "");
    }

    #[test]
    fn bad_config_is_rejected() {
        let cfg = ResolverConfig {
            pixel_threshold: 0.0,
            ..ResolverConfig::default()
        };
        assert!(ResponseResolver::new(cfg).is_err());
    }
}
