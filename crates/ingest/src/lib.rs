//! Lead ingestion pipeline.

pub mod pipeline;

pub use pipeline::LeadPipeline;
