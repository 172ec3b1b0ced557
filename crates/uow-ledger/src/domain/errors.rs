//! Error types for the unit-of-work ledger

use super::value_objects::DocumentType;
use thiserror::Error;

/// Errors raised while ordering a staged batch
#[derive(Debug, Error)]
pub enum OrderingError {
    /// Cycle among the batch's document types
    #[error("Cycle detected in document dependencies: {}", format_types(.types))]
    CycleDetected { types: Vec<DocumentType> },

    /// Batch size exceeded configured limit
    #[error("Batch size exceeded: {size} > {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Dependency edge count exceeded configured limit
    #[error("Edge count exceeded: {count} > {max}")]
    TooManyEdges { count: usize, max: usize },
}

/// Errors raised while building mapping metadata
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Document type {0} is mapped more than once")]
    DuplicateMapping(DocumentType),

    #[error("Sub class {sub_class} is already registered under {existing}")]
    DuplicateSubClass {
        sub_class: DocumentType,
        existing: DocumentType,
    },

    #[error("{child} already has parent {existing}, cannot also extend {requested}")]
    ConflictingParent {
        child: DocumentType,
        existing: DocumentType,
        requested: DocumentType,
    },

    #[error("Making {child} extend {parent} would create an inheritance loop")]
    HierarchyCycle {
        child: DocumentType,
        parent: DocumentType,
    },
}

fn format_types(types: &[DocumentType]) -> String {
    types
        .iter()
        .map(DocumentType::name)
        .collect::<Vec<_>>()
        .join(", ")
}
