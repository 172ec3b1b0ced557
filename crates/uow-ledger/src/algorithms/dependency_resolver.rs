//! Dependency Resolver
//!
//! Turns foreign-key mapping metadata into document type dependencies and
//! builds the dependency graph for a batch.

use crate::domain::entities::DependencyGraph;
use crate::domain::value_objects::DocumentType;
use crate::ports::outbound::MappingProvider;
use std::collections::VecDeque;

/// Resolves the document types a type depends on through foreign keys.
pub struct DependencyResolver<'a> {
    mappings: &'a dyn MappingProvider,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(mappings: &'a dyn MappingProvider) -> Self {
        Self { mappings }
    }

    /// Types that must be written before `document_type`.
    ///
    /// Unmapped types have no dependencies. Self references are skipped. A
    /// key to a type with subclasses depends on every subclass as well,
    /// since the referenced row may be any of them.
    pub fn dependencies_of(&self, document_type: &DocumentType) -> Vec<DocumentType> {
        let Some(mapping) = self.mappings.find_mapping(document_type) else {
            return Vec::new();
        };

        let mut dependencies = Vec::new();

        for foreign_key in &mapping.foreign_keys {
            let Some(reference) = &foreign_key.reference_document_type else {
                continue;
            };
            if reference == document_type || *reference == mapping.document_type {
                continue;
            }

            push_unique(&mut dependencies, reference.clone());

            for sub_class in self.sub_classes_of(reference) {
                if sub_class != *document_type {
                    push_unique(&mut dependencies, sub_class);
                }
            }
        }

        dependencies
    }

    fn sub_classes_of(&self, reference: &DocumentType) -> Vec<DocumentType> {
        match self.mappings.find_mapping(reference) {
            Some(mapping) if mapping.document_type == *reference => mapping.sub_classes.clone(),
            // The key targets a subclass: only its own descendants qualify
            Some(_) => self.mappings.hierarchy().descendants_of(reference),
            None => Vec::new(),
        }
    }
}

fn push_unique(types: &mut Vec<DocumentType>, document_type: DocumentType) {
    if !types.contains(&document_type) {
        types.push(document_type);
    }
}

/// Build the dependency graph for the given batch types.
///
/// Batch types become nodes first, in the given order. Dependencies reached
/// from them are added as they are discovered, so ordering through a type
/// that is not itself in the batch is still preserved.
pub fn build_dependency_graph<F>(types: &[DocumentType], dependencies_of: F) -> DependencyGraph
where
    F: Fn(&DocumentType) -> Vec<DocumentType>,
{
    let mut graph = DependencyGraph::new();
    let mut pending: VecDeque<DocumentType> = VecDeque::new();

    for ty in types {
        if graph.add_node(ty.clone()) {
            pending.push_back(ty.clone());
        }
    }

    while let Some(dependent) = pending.pop_front() {
        for dependency in dependencies_of(&dependent) {
            if dependency == dependent {
                continue;
            }
            if graph.add_node(dependency.clone()) {
                pending.push_back(dependency.clone());
            }
            graph.add_edge(dependency, dependent.clone());
        }
    }

    graph
}
