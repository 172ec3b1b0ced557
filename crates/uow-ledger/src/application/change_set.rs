//! Change-set views over a staged batch
//!
//! Read-only projections recomputed on every call. Type-filtered views are
//! polymorphic: a payload matches when its runtime type is assignable to the
//! requested type through the [`TypeHierarchy`].

use crate::domain::entities::{Deletion, Document, Event, EventStream, PatchOperation, StorageOperation};
use crate::domain::hierarchy::TypeHierarchy;
use crate::domain::value_objects::DocumentType;
use std::sync::Arc;

/// Categorized view of the operations staged in a ledger.
#[derive(Clone, Copy)]
pub struct ChangeSet<'a> {
    operations: &'a [StorageOperation],
    hierarchy: &'a TypeHierarchy,
}

impl<'a> ChangeSet<'a> {
    pub fn new(operations: &'a [StorageOperation], hierarchy: &'a TypeHierarchy) -> Self {
        Self {
            operations,
            hierarchy,
        }
    }

    /// Payloads of insert operations.
    pub fn inserts(&self) -> Vec<&'a Arc<Document>> {
        self.payloads(|op| matches!(op, StorageOperation::Insert(_)))
    }

    /// Payloads of update and upsert operations.
    pub fn updates(&self) -> Vec<&'a Arc<Document>> {
        self.payloads(|op| {
            matches!(
                op,
                StorageOperation::Update(_) | StorageOperation::Upsert(_)
            )
        })
    }

    pub fn inserts_for(&self, document_type: &DocumentType) -> Vec<&'a Arc<Document>> {
        self.assignable(self.inserts(), document_type)
    }

    pub fn updates_for(&self, document_type: &DocumentType) -> Vec<&'a Arc<Document>> {
        self.assignable(self.updates(), document_type)
    }

    /// Every inserted, updated or upserted payload assignable to the type.
    pub fn all_changed_for(&self, document_type: &DocumentType) -> Vec<&'a Arc<Document>> {
        let changed = self.payloads(|op| op.kind().is_document_write());
        self.assignable(changed, document_type)
    }

    pub fn deletions(&self) -> Vec<&'a Deletion> {
        self.operations
            .iter()
            .filter_map(|op| match op {
                StorageOperation::Delete(deletion) => Some(deletion),
                _ => None,
            })
            .collect()
    }

    pub fn deletions_for(&self, document_type: &DocumentType) -> Vec<&'a Deletion> {
        self.deletions()
            .into_iter()
            .filter(|deletion| {
                self.hierarchy
                    .is_assignable(&deletion.document_type, document_type)
            })
            .collect()
    }

    pub fn patches(&self) -> Vec<&'a PatchOperation> {
        self.operations
            .iter()
            .filter_map(|op| match op {
                StorageOperation::Patch(patch) => Some(patch),
                _ => None,
            })
            .collect()
    }

    pub fn patches_for(&self, document_type: &DocumentType) -> Vec<&'a PatchOperation> {
        self.patches()
            .into_iter()
            .filter(|patch| self.hierarchy.is_assignable(&patch.document_type, document_type))
            .collect()
    }

    /// Staged event streams, in staging order.
    pub fn streams(&self) -> Vec<&'a EventStream> {
        self.operations
            .iter()
            .filter_map(StorageOperation::stream)
            .collect()
    }

    /// All staged events, stream by stream.
    pub fn events(&self) -> Vec<&'a Event> {
        self.streams()
            .into_iter()
            .flat_map(|stream| stream.events.iter())
            .collect()
    }

    fn payloads<P>(&self, include: P) -> Vec<&'a Arc<Document>>
    where
        P: Fn(&StorageOperation) -> bool,
    {
        self.operations
            .iter()
            .filter(|op| include(*op))
            .filter_map(|op| match op {
                StorageOperation::Insert(change)
                | StorageOperation::Update(change)
                | StorageOperation::Upsert(change) => Some(&change.document),
                _ => None,
            })
            .collect()
    }

    fn assignable(
        &self,
        documents: Vec<&'a Arc<Document>>,
        document_type: &DocumentType,
    ) -> Vec<&'a Arc<Document>> {
        documents
            .into_iter()
            .filter(|document| {
                self.hierarchy
                    .is_assignable(&document.document_type, document_type)
            })
            .collect()
    }
}
