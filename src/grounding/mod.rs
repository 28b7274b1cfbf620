pub mod dataset;
pub mod element_id;
pub mod pipeline;
pub mod predictor;
pub mod prompt;
pub mod response;
pub mod types;
