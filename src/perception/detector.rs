//! Candidate detector: edges → consolidation → regions → annotation.

use image::DynamicImage;

use crate::config::{AnnotationConfig, DetectorConfig};
use crate::errors::GroundResult;
use crate::perception::annotator;
use crate::perception::edges::EdgeExtractor;
use crate::perception::morphology::EdgeConsolidator;
use crate::perception::regions::RegionExtractor;
use crate::perception::types::{Detection, EdgeMap, Region};

#[derive(Debug, Clone)]
pub struct CandidateDetector {
    edges: EdgeExtractor,
    consolidator: EdgeConsolidator,
    regions: RegionExtractor,
    style: AnnotationConfig,
}

impl CandidateDetector {
    pub fn new(config: DetectorConfig, style: AnnotationConfig) -> GroundResult<Self> {
        config.validate()?;
        Ok(Self {
            edges: EdgeExtractor::new(&config),
            consolidator: EdgeConsolidator::new(&config),
            regions: RegionExtractor::new(&config),
            style,
        })
    }

    /// Ordered, labelled candidate regions plus the annotated copy of `image`.
    /// The input is never modified.
    pub fn detect(&self, image: &DynamicImage) -> Detection {
        let regions = self.regions_only(image);
        let annotated = annotator::annotate_regions(image, &regions, &self.style);
        if regions.is_empty() {
            tracing::info!("no candidate regions detected");
        } else {
            tracing::info!(count = regions.len(), "candidate regions detected");
        }
        Detection { regions, annotated }
    }

    /// Same regions as [`detect`](Self::detect) without drawing anything.
    pub fn regions_only(&self, image: &DynamicImage) -> Vec<Region> {
        let merged = self.consolidated_edges(image);
        self.regions.extract(&merged, (image.width(), image.height()))
    }

    /// Intermediate map handed to contour tracing; useful for debug dumps.
    pub fn consolidated_edges(&self, image: &DynamicImage) -> EdgeMap {
        let raw = self.edges.extract(image);
        self.consolidator.consolidate(&raw)
    }
}

impl Default for CandidateDetector {
    fn default() -> Self {
        let config = DetectorConfig::default();
        Self {
            edges: EdgeExtractor::new(&config),
            consolidator: EdgeConsolidator::new(&config),
            regions: RegionExtractor::new(&config),
            style: AnnotationConfig::default(),
        }
    }
}
