//! Document type hierarchy
//!
//! Explicit table of parent links and implemented capabilities, built once
//! per mapping configuration. Answers the two polymorphic questions the
//! ledger asks: "what is the parent of this type" and "can this type be used
//! where that type is expected".

use super::errors::MappingError;
use super::value_objects::DocumentType;
use std::collections::HashMap;

/// Parent links and capability sets for every registered document type.
#[derive(Clone, Debug, Default)]
pub struct TypeHierarchy {
    parents: HashMap<DocumentType, DocumentType>,
    capabilities: HashMap<DocumentType, Vec<DocumentType>>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `child` as a direct subclass of `parent`.
    ///
    /// Re-registering the same link is a no-op. A second, different parent or
    /// a link that would close a loop is rejected.
    pub fn register_parent(
        &mut self,
        child: DocumentType,
        parent: DocumentType,
    ) -> Result<(), MappingError> {
        if let Some(existing) = self.parents.get(&child) {
            if *existing == parent {
                return Ok(());
            }
            return Err(MappingError::ConflictingParent {
                child,
                existing: existing.clone(),
                requested: parent,
            });
        }

        if child == parent || self.ancestors(&parent).any(|ancestor| *ancestor == child) {
            return Err(MappingError::HierarchyCycle { child, parent });
        }

        self.parents.insert(child, parent);
        Ok(())
    }

    /// Record that `document_type` implements `capability` (an interface or
    /// marker type that is not itself a stored document).
    pub fn register_capability(&mut self, document_type: DocumentType, capability: DocumentType) {
        let entry = self.capabilities.entry(document_type).or_default();
        if !entry.contains(&capability) {
            entry.push(capability);
        }
    }

    pub fn parent_of(&self, document_type: &DocumentType) -> Option<&DocumentType> {
        self.parents.get(document_type)
    }

    /// Walk up the parent chain, nearest ancestor first. Excludes the type itself.
    pub fn ancestors<'a>(&'a self, document_type: &'a DocumentType) -> Ancestors<'a> {
        Ancestors {
            hierarchy: self,
            current: document_type,
        }
    }

    /// Is-a check: the type itself, any ancestor, or any capability of the
    /// type or its ancestors.
    pub fn is_assignable(&self, document_type: &DocumentType, target: &DocumentType) -> bool {
        if document_type == target {
            return true;
        }

        std::iter::once(document_type)
            .chain(self.ancestors(document_type))
            .any(|ty| {
                ty == target
                    || self
                        .capabilities
                        .get(ty)
                        .is_some_and(|caps| caps.contains(target))
            })
    }

    /// Every registered type whose ancestor chain contains `document_type`.
    pub fn descendants_of(&self, document_type: &DocumentType) -> Vec<DocumentType> {
        let mut descendants: Vec<DocumentType> = self
            .parents
            .keys()
            .filter(|child| self.ancestors(child).any(|ancestor| ancestor == document_type))
            .cloned()
            .collect();
        descendants.sort();
        descendants
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty() && self.capabilities.is_empty()
    }
}

/// Iterator over the ancestors of a document type.
pub struct Ancestors<'a> {
    hierarchy: &'a TypeHierarchy,
    current: &'a DocumentType,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a DocumentType;

    fn next(&mut self) -> Option<Self::Item> {
        let parent = self.hierarchy.parents.get(self.current)?;
        self.current = parent;
        Some(parent)
    }
}
