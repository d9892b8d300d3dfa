#![allow(clippy::missing_docs_in_private_items, clippy::result_large_err)]

pub mod pipeline;
pub mod sources;
pub mod types;
pub mod utils;

pub use pipeline::{
    BatchPipeline, BatchReport, DataSources, DefaultPipelineServices, IngestionConfig,
    PipelineServices, VideoOutcome,
};
