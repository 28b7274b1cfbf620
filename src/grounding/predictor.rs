use std::path::Path;

use crate::errors::GroundResult;
use crate::grounding::dataset::{load_dataset, DatasetRecord};
use crate::perception::screenshot::Screenshot;

/// One request to a predictor: the user's instruction and the full prompt
/// built around it for the answering scheme in use.
#[derive(Debug, Clone, Copy)]
pub struct Query<'a> {
    pub instruction: &'a str,
    pub prompt: &'a str,
}

/// Anything that can look at a screenshot and answer an instruction in text:
/// a local model, a hosted multimodal API, a human, or a canned dataset.
///
/// Model-backed predictors send `query.prompt` with the image. The answer is
/// returned raw; turning it into geometry is the resolvers' job.
pub trait GroundingPredictor: Send + Sync {
    fn name(&self) -> &str;

    fn predict(&self, shot: &Screenshot, query: Query<'_>) -> GroundResult<String>;
}

/// Answers from ground-truth records instead of a model, keyed by the
/// screenshot's file path. Useful for exercising the whole flow offline.
pub struct MockPredictor {
    records: Vec<DatasetRecord>,
}

impl MockPredictor {
    pub fn new(records: Vec<DatasetRecord>) -> Self {
        Self { records }
    }

    pub fn from_file(path: &Path) -> GroundResult<Self> {
        Ok(Self::new(load_dataset(path)?))
    }

    fn lookup(&self, path: &Path) -> Option<&DatasetRecord> {
        self.records.iter().find(|r| r.image_path == path).or_else(|| {
            let wanted = path.canonicalize().ok()?;
            self.records
                .iter()
                .find(|r| r.image_path.canonicalize().ok().as_deref() == Some(wanted.as_path()))
        })
    }
}

impl GroundingPredictor for MockPredictor {
    fn name(&self) -> &str {
        "mock"
    }

    fn predict(&self, shot: &Screenshot, query: Query<'_>) -> GroundResult<String> {
        let instruction = query.instruction;
        let record = shot.path.as_deref().and_then(|p| self.lookup(p));
        let Some(record) = record else {
            tracing::debug!(instruction = %instruction, "mock predictor has no record for screenshot");
            return Ok("Thought: Unable to identify the target element.".to_string());
        };
        let [x0, y0, x1, y1] = record.bbox;
        Ok(format!(
            "Thought: Found the element '{}' related to the instruction '{}'.\nBBox: [{x0}, {y0}, {x1}, {y1}]",
            record.target, instruction
        ))
    }
}
