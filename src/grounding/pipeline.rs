//! Grounding pipeline: ties a predictor to the detector and resolvers for
//! the two answering schemes:
//!
//! * direct: the predictor sees the raw screenshot and answers with
//!   coordinates, which the response resolver turns into a box;
//! * element: the detector numbers candidate regions, the predictor sees the
//!   annotated image and answers with a number, which the element-id
//!   resolver maps back to a region.

use image::DynamicImage;
use serde::Serialize;

use crate::errors::GroundResult;
use crate::grounding::element_id::{ElementIdResolver, SelectedElement, UnresolvableLabel};
use crate::grounding::predictor::{GroundingPredictor, Query};
use crate::grounding::prompt::{element_prompt, grounding_prompt};
use crate::grounding::response::ResponseResolver;
use crate::grounding::types::ResolvedAnswer;
use crate::perception::detector::CandidateDetector;
use crate::perception::screenshot::Screenshot;

/// Outcome of the element scheme. Only predictor failures are errors; the
/// three branches below are all ordinary results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ElementGrounding {
    NoCandidates,
    Unresolved {
        reason: UnresolvableLabel,
        response: String,
    },
    Selected(SelectedElement),
}

pub struct Grounder {
    detector: CandidateDetector,
    response: ResponseResolver,
    element_id: ElementIdResolver,
    predictor: Box<dyn GroundingPredictor>,
}

impl Grounder {
    pub fn new(
        detector: CandidateDetector,
        response: ResponseResolver,
        element_id: ElementIdResolver,
        predictor: Box<dyn GroundingPredictor>,
    ) -> Self {
        Self {
            detector,
            response,
            element_id,
            predictor,
        }
    }

    pub fn ground_direct(&self, shot: &Screenshot, instruction: &str) -> GroundResult<ResolvedAnswer> {
        let prompt = grounding_prompt(instruction);
        let text = self.predictor.predict(shot, Query { instruction, prompt: &prompt })?;
        tracing::debug!(predictor = self.predictor.name(), len = text.len(), "prediction received");
        Ok(self.response.resolve(&text, shot.dimensions()))
    }

    pub fn ground_by_element(&self, shot: &Screenshot, instruction: &str) -> GroundResult<ElementGrounding> {
        let detection = self.detector.detect(&shot.image);
        if detection.is_empty() {
            return Ok(ElementGrounding::NoCandidates);
        }

        let annotated = Screenshot::from_image(DynamicImage::ImageRgb8(detection.annotated));
        let prompt = element_prompt(instruction);
        let text = self.predictor.predict(&annotated, Query { instruction, prompt: &prompt })?;
        tracing::debug!(predictor = self.predictor.name(), response = %text, "element answer received");

        Ok(match self.element_id.resolve(&text, &detection.regions) {
            Ok(selected) => ElementGrounding::Selected(selected),
            Err(reason) => ElementGrounding::Unresolved {
                reason,
                response: text,
            },
        })
    }
}
