use std::path::Path;

use serde::Serialize;

use crate::cli::Command;
use crate::config::AppConfig;
use crate::errors::{GroundError, GroundResult};
use crate::grounding::element_id::ElementIdResolver;
use crate::grounding::pipeline::Grounder;
use crate::grounding::predictor::MockPredictor;
use crate::grounding::response::ResponseResolver;
use crate::perception::annotator::encode_png;
use crate::perception::detector::CandidateDetector;
use crate::perception::grid::draw_reference_grid;
use crate::perception::screenshot::Screenshot;

/// Execute one subcommand and return its JSON report.
pub fn execute(command: Command, config: &AppConfig) -> GroundResult<String> {
    match command {
        Command::Detect { input, output } => detect(&input, output.as_deref(), config),
        Command::Resolve {
            width,
            height,
            text,
            text_file,
        } => {
            let text = match (text, text_file) {
                (Some(t), _) => t,
                (None, Some(path)) => std::fs::read_to_string(path)?,
                (None, None) => {
                    return Err(GroundError::Config("resolve needs --text or --text-file".into()))
                }
            };
            let resolver = ResponseResolver::new(config.resolver.clone())?;
            to_json(&resolver.resolve(&text, (width, height)))
        }
        Command::Element { input, text } => {
            let shot = Screenshot::open(&input)?;
            let detector = CandidateDetector::new(config.detector.clone(), config.annotation.clone())?;
            let regions = detector.regions_only(&shot.image);
            let report = match ElementIdResolver::new()?.resolve(&text, &regions) {
                Ok(selected) => serde_json::to_value(selected)?,
                Err(reason) => serde_json::json!({ "not_found": reason.to_string() }),
            };
            to_json(&report)
        }
        Command::Grid {
            input,
            output,
            grid_size,
        } => {
            let shot = Screenshot::open(&input)?;
            let grid = draw_reference_grid(&shot.image, grid_size.unwrap_or(config.grid.grid_size));
            std::fs::write(&output, encode_png(&grid)?)?;
            tracing::info!(path = %output.display(), "grid overlay written");
            to_json(&serde_json::json!({ "output": output }))
        }
        Command::Ground {
            input,
            instruction,
            dataset,
        } => {
            let dataset = dataset
                .or_else(|| config.predictor.dataset.clone())
                .ok_or_else(|| GroundError::Config("ground needs --dataset or [predictor].dataset".into()))?;
            let grounder = Grounder::new(
                CandidateDetector::new(config.detector.clone(), config.annotation.clone())?,
                ResponseResolver::new(config.resolver.clone())?,
                ElementIdResolver::new()?,
                Box::new(MockPredictor::from_file(&dataset)?),
            );
            let shot = Screenshot::open(&input)?;
            to_json(&grounder.ground_direct(&shot, &instruction)?)
        }
    }
}

fn detect(input: &Path, output: Option<&Path>, config: &AppConfig) -> GroundResult<String> {
    let shot = Screenshot::open(input)?;
    let detector = CandidateDetector::new(config.detector.clone(), config.annotation.clone())?;
    let detection = detector.detect(&shot.image);
    if let Some(path) = output {
        std::fs::write(path, encode_png(&detection.annotated)?)?;
        tracing::info!(path = %path.display(), "annotated image written");
    }
    to_json(&detection.regions)
}

fn to_json<T: Serialize>(value: &T) -> GroundResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
