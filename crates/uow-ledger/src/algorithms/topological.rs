//! Kahn's Topological Sort over document types
//!
//! O(V + E), detects cycles, groups independent types into levels.

use super::dependency_resolver::build_dependency_graph;
use crate::domain::entities::{DependencyGraph, TypeOrder};
use crate::domain::errors::OrderingError;
use crate::domain::value_objects::DocumentType;
use std::collections::HashMap;

/// Perform Kahn's topological sort on the dependency graph.
///
/// Returns a [`TypeOrder`] whose levels contain types with no dependency on
/// each other. Within a level, types keep the graph's first-seen order so the
/// result is deterministic.
pub fn kahns_topological_sort(graph: &DependencyGraph) -> Result<TypeOrder, OrderingError> {
    if graph.types.is_empty() {
        return Ok(TypeOrder::default());
    }

    let first_seen: HashMap<&DocumentType, usize> = graph
        .types
        .iter()
        .enumerate()
        .map(|(index, ty)| (ty, index))
        .collect();

    // 1. Copy in-degree map (we'll modify it)
    let mut in_degree: HashMap<DocumentType, usize> = graph.in_degree.clone();

    // 2. Initialize queue with zero in-degree nodes, already in first-seen order
    let mut queue: Vec<DocumentType> = graph
        .types
        .iter()
        .filter(|ty| in_degree.get(*ty).copied() == Some(0))
        .cloned()
        .collect();

    // 3. Process queue level by level
    let mut levels: Vec<Vec<DocumentType>> = Vec::new();
    let mut scheduled_count = 0;

    while !queue.is_empty() {
        let current_level = std::mem::take(&mut queue);
        scheduled_count += current_level.len();

        let mut next_queue: Vec<DocumentType> = Vec::new();

        for node in &current_level {
            let Some(dependents) = graph.adjacency.get(node) else {
                continue;
            };
            for dependent in dependents {
                let Some(degree) = in_degree.get_mut(dependent) else {
                    continue;
                };
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    next_queue.push(dependent.clone());
                }
            }
        }

        next_queue.sort_by_key(|ty| first_seen.get(ty).copied().unwrap_or(usize::MAX));
        levels.push(current_level);
        queue = next_queue;
    }

    // 4. Cycle detection: if not all nodes scheduled, there's a cycle
    if scheduled_count < graph.types.len() {
        let types = graph
            .types
            .iter()
            .filter(|ty| in_degree.get(*ty).is_some_and(|degree| *degree > 0))
            .cloned()
            .collect();
        return Err(OrderingError::CycleDetected { types });
    }

    Ok(TypeOrder::new(levels))
}

/// Order the batch's distinct types so dependencies come first.
pub fn order_types<F>(types: &[DocumentType], dependencies_of: F) -> Result<TypeOrder, OrderingError>
where
    F: Fn(&DocumentType) -> Vec<DocumentType>,
{
    let graph = build_dependency_graph(types, dependencies_of);
    kahns_topological_sort(&graph)
}
