use serde::{Deserialize, Serialize};

/// `[xmin, ymin, xmax, ymax]` as fractions of the image size.
///
/// A box built through [`NormalizedBox::new`] always satisfies
/// `0 <= xmin < xmax <= 1` and `0 <= ymin < ymax <= 1`. The only exception
/// is [`NormalizedBox::DEGENERATE`], the all-zero "nothing found" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 4]", try_from = "[f64; 4]")]
pub struct NormalizedBox {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
}

impl NormalizedBox {
    pub const DEGENERATE: NormalizedBox = NormalizedBox {
        xmin: 0.0,
        ymin: 0.0,
        xmax: 0.0,
        ymax: 0.0,
    };

    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Option<Self> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if [xmin, ymin, xmax, ymax].into_iter().all(in_unit) && xmax > xmin && ymax > ymin {
            Some(Self { xmin, ymin, xmax, ymax })
        } else {
            None
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.xmin, self.ymin, self.xmax, self.ymax]
    }

    pub fn is_degenerate(&self) -> bool {
        *self == Self::DEGENERATE
    }

    /// Clamp each value to `[0, 1]` and round to `precision` decimals, then
    /// re-check the ordering invariant.
    pub fn canonicalize(values: [f64; 4], precision: u32) -> Option<Self> {
        let [a, b, c, d] = values.map(|v| round_to(v.clamp(0.0, 1.0), precision));
        Self::new(a, b, c, d)
    }
}

impl From<NormalizedBox> for [f64; 4] {
    fn from(b: NormalizedBox) -> Self {
        b.to_array()
    }
}

impl TryFrom<[f64; 4]> for NormalizedBox {
    type Error = String;

    fn try_from(v: [f64; 4]) -> Result<Self, Self::Error> {
        if v == [0.0; 4] {
            return Ok(Self::DEGENERATE);
        }
        Self::new(v[0], v[1], v[2], v[3]).ok_or_else(|| format!("invalid normalized box {v:?}"))
    }
}

pub(crate) fn round_to(v: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision as i32);
    (v * scale).round() / scale
}

/// Rationale plus box returned by the response resolver.
///
/// `thought` may be empty. A degenerate `bbox` means no grounding was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAnswer {
    pub thought: String,
    pub bbox: NormalizedBox,
}

impl ResolvedAnswer {
    pub fn found(&self) -> bool {
        !self.bbox.is_degenerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_enforces_invariants() {
        assert!(NormalizedBox::new(0.1, 0.2, 0.5, 0.6).is_some());
        assert!(NormalizedBox::new(0.5, 0.2, 0.5, 0.6).is_none());
        assert!(NormalizedBox::new(0.1, 0.6, 0.5, 0.2).is_none());
        assert!(NormalizedBox::new(-0.1, 0.2, 0.5, 0.6).is_none());
        assert!(NormalizedBox::new(0.1, 0.2, 1.5, 0.6).is_none());
    }

    #[test]
    fn canonicalize_clamps_and_rounds() {
        let b = NormalizedBox::canonicalize([-0.2, 0.12345, 1.04, 0.66666], 3).unwrap();
        assert_eq!(b.to_array(), [0.0, 0.123, 1.0, 0.667]);
    }

    #[test]
    fn canonical_boxes_are_fixed_points() {
        let samples = [
            [0.1234, 0.5678, 0.9876, 0.99999],
            [0.0004, 0.3333, 0.6667, 0.7],
            [0.1, 0.2, 0.5, 0.6],
        ];
        for s in samples {
            let once = NormalizedBox::canonicalize(s, 3).unwrap();
            let twice = NormalizedBox::canonicalize(once.to_array(), 3).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn serializes_as_plain_array() {
        let answer = ResolvedAnswer {
            thought: "ok".into(),
            bbox: NormalizedBox::new(0.1, 0.2, 0.5, 0.6).unwrap(),
        };
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json, serde_json::json!({"thought": "ok", "bbox": [0.1, 0.2, 0.5, 0.6]}));
        let back: ResolvedAnswer = serde_json::from_value(json).unwrap();
        assert_eq!(back, answer);
    }

    #[test]
    fn sentinel_deserializes_and_reports_not_found() {
        let answer: ResolvedAnswer =
            serde_json::from_str(r#"{"thought": "", "bbox": [0, 0, 0, 0]}"#).unwrap();
        assert!(!answer.found());
        assert!(serde_json::from_str::<NormalizedBox>("[0.9, 0.9, 0.5, 0.5]").is_err());
    }
}
