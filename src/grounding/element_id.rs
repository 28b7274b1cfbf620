//! Maps an answer like "The target is element 3." back onto the detector's
//! numbered regions.

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::errors::{GroundError, GroundResult};
use crate::perception::types::{PixelBox, Region};

const LABEL_PATTERN: &str = r"\b([0-9]+)\b";

/// Why a label answer could not be mapped to a region.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnresolvableLabel {
    #[error("no standalone integer in the response")]
    NoInteger,

    #[error("label {label} is outside 1..={count}")]
    OutOfRange { label: String, count: usize },
}

/// A region picked by label, with its corner-form pixel box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectedElement {
    pub label: u32,
    pub region: Region,
    pub pixel_box: PixelBox,
}

#[derive(Debug, Clone)]
pub struct ElementIdResolver {
    label: Regex,
}

impl ElementIdResolver {
    pub fn new() -> GroundResult<Self> {
        let label = Regex::new(LABEL_PATTERN)
            .map_err(|e| GroundError::Config(format!("label pattern: {e}")))?;
        Ok(Self { label })
    }

    /// First whole-word integer in `text`, as written.
    pub fn extract_label<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.label
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    /// Interpret the first standalone integer in `text` as a 1-based label
    /// into `regions`.
    pub fn resolve(&self, text: &str, regions: &[Region]) -> Result<SelectedElement, UnresolvableLabel> {
        let Some(token) = self.extract_label(text) else {
            tracing::warn!(response = %text, "no element id in response");
            return Err(UnresolvableLabel::NoInteger);
        };

        let index = token
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .filter(|&i| i < regions.len());
        let Some(index) = index else {
            tracing::warn!(label = %token, count = regions.len(), "element id out of range");
            return Err(UnresolvableLabel::OutOfRange {
                label: token.to_string(),
                count: regions.len(),
            });
        };

        let region = regions[index];
        tracing::debug!(label = index + 1, "element id resolved");
        Ok(SelectedElement {
            label: (index + 1) as u32,
            region,
            pixel_box: region.to_pixel_box(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regions() -> Vec<Region> {
        vec![
            Region { label: 1, x: 5, y: 5, w: 20, h: 20 },
            Region { label: 2, x: 40, y: 10, w: 30, h: 16 },
            Region { label: 3, x: 100, y: 60, w: 50, h: 25 },
        ]
    }

    fn resolver() -> ElementIdResolver {
        ElementIdResolver::new().unwrap()
    }

    #[test]
    fn picks_labelled_region_in_corner_form() {
        let picked = resolver().resolve("The target is element 3.", &regions()).unwrap();
        assert_eq!(picked.label, 3);
        assert_eq!(picked.region, regions()[2]);
        assert_eq!(
            picked.pixel_box,
            PixelBox { xmin: 100, ymin: 60, xmax: 150, ymax: 85 }
        );
    }

    #[test]
    fn bare_number_answer() {
        assert_eq!(resolver().resolve("2", &regions()).unwrap().label, 2);
    }

    #[test]
    fn digits_glued_to_letters_are_ignored() {
        let r = resolver();
        assert_eq!(r.extract_label("id42x"), None);
        assert_eq!(r.resolve("id42x then 1", &regions()).unwrap().label, 1);
    }

    #[test]
    fn first_standalone_integer_wins() {
        assert_eq!(resolver().resolve("Element 2, not 3", &regions()).unwrap().label, 2);
    }

    #[test]
    fn missing_integer_is_not_found() {
        assert_eq!(
            resolver().resolve("I cannot see it", &regions()),
            Err(UnresolvableLabel::NoInteger)
        );
    }

    #[test]
    fn zero_and_overflowing_labels_are_out_of_range() {
        let r = resolver();
        assert_eq!(
            r.resolve("0", &regions()),
            Err(UnresolvableLabel::OutOfRange { label: "0".into(), count: 3 })
        );
        assert!(matches!(r.resolve("4", &regions()), Err(UnresolvableLabel::OutOfRange { .. })));
        assert!(matches!(
            r.resolve("99999999999999999999999", &regions()),
            Err(UnresolvableLabel::OutOfRange { .. })
        ));
        assert!(matches!(r.resolve("1", &[]), Err(UnresolvableLabel::OutOfRange { count: 0, .. })));
    }
}
