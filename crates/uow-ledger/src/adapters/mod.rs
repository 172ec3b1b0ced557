//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits for the mapping layer.

mod storage_model;

pub use storage_model::{StorageModel, StorageModelBuilder};
