//! Document mapping metadata consumed by dependency resolution

use super::value_objects::DocumentType;
use serde::{Deserialize, Serialize};

/// Foreign key from a document table to another document table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referenced document type; `None` when the key points at a plain table
    pub reference_document_type: Option<DocumentType>,
}

impl ForeignKey {
    pub fn to(document_type: impl Into<DocumentType>) -> Self {
        Self {
            reference_document_type: Some(document_type.into()),
        }
    }

    /// Key into a table that is not a mapped document.
    pub fn external() -> Self {
        Self {
            reference_document_type: None,
        }
    }
}

/// Storage mapping of one root document type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMapping {
    pub document_type: DocumentType,
    pub foreign_keys: Vec<ForeignKey>,
    /// Subclasses stored in the same table
    pub sub_classes: Vec<DocumentType>,
}

impl DocumentMapping {
    pub fn new(document_type: impl Into<DocumentType>) -> Self {
        Self {
            document_type: document_type.into(),
            foreign_keys: Vec::new(),
            sub_classes: Vec::new(),
        }
    }

    pub fn with_foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Shorthand for a foreign key to another document type.
    pub fn references(self, document_type: impl Into<DocumentType>) -> Self {
        self.with_foreign_key(ForeignKey::to(document_type))
    }

    pub fn with_sub_class(mut self, document_type: impl Into<DocumentType>) -> Self {
        self.sub_classes.push(document_type.into());
        self
    }

    pub fn has_sub_classes(&self) -> bool {
        !self.sub_classes.is_empty()
    }
}
