//! Value objects for the unit-of-work ledger
//!
//! Nominal identifiers shared by every layer: document types, document ids,
//! operation kinds and event-stream identities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Nominal document type descriptor.
///
/// Cheap to clone; equality is exact name equality. Inheritance and
/// capability checks go through [`crate::domain::TypeHierarchy`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentType(Arc<str>);

impl DocumentType {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DocumentType {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Identity of a stored document row.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<Uuid> for DocumentId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

/// Discriminator of a staged operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Insert,
    Update,
    Upsert,
    Delete,
    Patch,
    AppendEvents,
}

impl OperationKind {
    pub fn is_deletion(self) -> bool {
        matches!(self, OperationKind::Delete)
    }

    /// Insert, update or upsert of a whole document payload.
    pub fn is_document_write(self) -> bool {
        matches!(
            self,
            OperationKind::Insert | OperationKind::Update | OperationKind::Upsert
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Insert => "insert",
            OperationKind::Update => "update",
            OperationKind::Upsert => "upsert",
            OperationKind::Delete => "delete",
            OperationKind::Patch => "patch",
            OperationKind::AppendEvents => "append-events",
        };
        f.write_str(name)
    }
}

/// Lookup key for a staged event stream.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamId {
    /// Stream identified by a unique id
    Id(Uuid),
    /// Stream identified by a string key
    Key(String),
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamId::Id(id) => write!(f, "{}", id),
            StreamId::Key(key) => f.write_str(key),
        }
    }
}

impl From<Uuid> for StreamId {
    fn from(id: Uuid) -> Self {
        StreamId::Id(id)
    }
}

impl From<&str> for StreamId {
    fn from(key: &str) -> Self {
        StreamId::Key(key.to_string())
    }
}

impl From<String> for StreamId {
    fn from(key: String) -> Self {
        StreamId::Key(key)
    }
}

/// Comparator strategy chosen for a sort call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortStrategy {
    /// No deletions staged: dependencies before dependents
    WriteOrder,
    /// Deletions staged: deletes run dependents first
    WriteDeleteOrder,
}

/// Why a sort call left the batch in insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Zero or one staged operation
    TooFewOperations,
    /// Every operation shares the same document type
    SingleDocumentType,
}

/// Result of a successful sort call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOutcome {
    Skipped(SkipReason),
    Sorted {
        strategy: SortStrategy,
        /// Number of types in the computed topological order
        ordered_types: usize,
    },
}

impl SortOutcome {
    pub fn was_skipped(&self) -> bool {
        matches!(self, SortOutcome::Skipped(_))
    }
}
