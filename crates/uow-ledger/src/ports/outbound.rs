//! Outbound Ports (Driven Ports / SPI)
//!
//! Metadata the ledger needs from the mapping layer.

use crate::domain::hierarchy::TypeHierarchy;
use crate::domain::mapping::DocumentMapping;
use crate::domain::value_objects::DocumentType;

/// Document mapping metadata provider.
///
/// Implementations are built once per store configuration and shared by
/// every unit of work.
pub trait MappingProvider: Send + Sync {
    /// Mapping for `document_type`.
    ///
    /// A subclass resolves to the mapping of the root type it is stored with.
    /// `None` for types that are not mapped documents.
    fn find_mapping(&self, document_type: &DocumentType) -> Option<&DocumentMapping>;

    /// Inheritance and capability table for every mapped type.
    fn hierarchy(&self) -> &TypeHierarchy;
}
