//! Log retrieval from the search backend

pub mod dto;
pub mod source;

pub use source::{ElasticsearchSource, LogBatch, LogSource, SharedLogSource};
