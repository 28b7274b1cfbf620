pub mod annotator;
pub mod detector;
pub mod edges;
pub mod glyphs;
pub mod grid;
pub mod morphology;
pub mod regions;
pub mod screenshot;
pub mod types;
