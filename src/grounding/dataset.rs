use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{GroundError, GroundResult};

/// One grounding task: a screenshot, an instruction and the target's box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub id: String,
    pub image_path: PathBuf,
    pub instruction: String,
    /// Human-readable name of the target element.
    #[serde(default)]
    pub target: String,
    /// Normalized `[xmin, ymin, xmax, ymax]`.
    pub bbox: [f64; 4],
}

pub fn load_dataset(path: &Path) -> GroundResult<Vec<DatasetRecord>> {
    let content = std::fs::read_to_string(path)?;
    let records: Vec<DatasetRecord> = serde_json::from_str(&content)?;
    if let Some(bad) = records.iter().find(|r| r.bbox.iter().any(|v| !(0.0..=1.0).contains(v))) {
        return Err(GroundError::Dataset(format!(
            "record {} has a bbox outside [0, 1]: {:?}",
            bad.id, bad.bbox
        )));
    }
    tracing::info!(path = %path.display(), records = records.len(), "dataset loaded");
    Ok(records)
}
