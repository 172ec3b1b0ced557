//! Storage Model Adapter
//!
//! Implements `MappingProvider` from document mappings registered at store
//! configuration time.

use crate::domain::errors::MappingError;
use crate::domain::hierarchy::TypeHierarchy;
use crate::domain::mapping::DocumentMapping;
use crate::domain::value_objects::DocumentType;
use crate::ports::outbound::MappingProvider;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// In-memory registry of document mappings and the type hierarchy derived
/// from them.
#[derive(Debug, Clone)]
pub struct StorageModel {
    /// Root mappings by root document type
    mappings: HashMap<DocumentType, DocumentMapping>,
    /// Subclass -> root document type it is stored with
    roots: HashMap<DocumentType, DocumentType>,
    hierarchy: Arc<TypeHierarchy>,
}

impl StorageModel {
    pub fn builder() -> StorageModelBuilder {
        StorageModelBuilder::default()
    }

    /// Shared handle on the hierarchy, for ledgers created from this model.
    pub fn shared_hierarchy(&self) -> Arc<TypeHierarchy> {
        Arc::clone(&self.hierarchy)
    }

    /// Root type a document type is stored with, if it is mapped.
    pub fn root_of(&self, document_type: &DocumentType) -> Option<&DocumentType> {
        if let Some(mapping) = self.mappings.get(document_type) {
            return Some(&mapping.document_type);
        }
        self.roots.get(document_type)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl MappingProvider for StorageModel {
    fn find_mapping(&self, document_type: &DocumentType) -> Option<&DocumentMapping> {
        let root = self.root_of(document_type)?;
        self.mappings.get(root)
    }

    fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }
}

/// Collects mappings and explicit hierarchy links before validating them.
#[derive(Debug, Default)]
pub struct StorageModelBuilder {
    mappings: Vec<DocumentMapping>,
    parents: Vec<(DocumentType, DocumentType)>,
    capabilities: Vec<(DocumentType, DocumentType)>,
}

impl StorageModelBuilder {
    pub fn document(mut self, mapping: DocumentMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    /// Declare the direct parent of a subclass in a deep hierarchy.
    ///
    /// Subclasses without an explicit parent extend their root type.
    pub fn extends(
        mut self,
        child: impl Into<DocumentType>,
        parent: impl Into<DocumentType>,
    ) -> Self {
        self.parents.push((child.into(), parent.into()));
        self
    }

    /// Declare that a type implements a capability (interface/marker type).
    pub fn implements(
        mut self,
        document_type: impl Into<DocumentType>,
        capability: impl Into<DocumentType>,
    ) -> Self {
        self.capabilities
            .push((document_type.into(), capability.into()));
        self
    }

    pub fn build(self) -> Result<StorageModel, MappingError> {
        let mut mappings: HashMap<DocumentType, DocumentMapping> = HashMap::new();
        let mut roots: HashMap<DocumentType, DocumentType> = HashMap::new();

        for mapping in self.mappings {
            if mappings.contains_key(&mapping.document_type) {
                return Err(MappingError::DuplicateMapping(mapping.document_type));
            }
            mappings.insert(mapping.document_type.clone(), mapping);
        }

        for mapping in mappings.values() {
            for sub_class in &mapping.sub_classes {
                if mappings.contains_key(sub_class) {
                    return Err(MappingError::DuplicateMapping(sub_class.clone()));
                }
                if let Some(existing) = roots.get(sub_class) {
                    if *existing != mapping.document_type {
                        return Err(MappingError::DuplicateSubClass {
                            sub_class: sub_class.clone(),
                            existing: existing.clone(),
                        });
                    }
                }
                roots.insert(sub_class.clone(), mapping.document_type.clone());
            }
        }

        let mut hierarchy = TypeHierarchy::new();

        for (child, parent) in self.parents {
            hierarchy.register_parent(child, parent)?;
        }

        let mut implicit: Vec<(&DocumentType, &DocumentType)> = roots
            .iter()
            .filter(|(sub_class, _)| hierarchy.parent_of(sub_class).is_none())
            .collect();
        implicit.sort();
        for (sub_class, root) in implicit {
            hierarchy.register_parent(sub_class.clone(), root.clone())?;
        }

        for (document_type, capability) in self.capabilities {
            hierarchy.register_capability(document_type, capability);
        }

        debug!(
            documents = mappings.len(),
            sub_classes = roots.len(),
            "Built storage model"
        );

        Ok(StorageModel {
            mappings,
            roots,
            hierarchy: Arc::new(hierarchy),
        })
    }
}
