//! Domain invariants for ordered batches
//!
//! Pure predicates over a type order or a sorted operation list, given the
//! dependency function used to build them.

use super::entities::{StorageOperation, TypeOrder};
use super::value_objects::{DocumentType, OperationKind};
use std::collections::{HashMap, HashSet};

/// Every dependency present in the order is placed before its dependent.
pub fn invariant_type_order<F>(order: &TypeOrder, dependencies_of: F) -> bool
where
    F: Fn(&DocumentType) -> Vec<DocumentType>,
{
    order.flatten().iter().all(|ty| {
        let Some(position) = order.index_of(ty) else {
            return false;
        };
        dependencies_of(ty).iter().all(|dependency| {
            dependency == ty
                || order
                    .index_of(dependency)
                    .map_or(true, |dep_position| dep_position < position)
        })
    })
}

/// The dependency graph over `types` is acyclic.
pub fn invariant_no_cycles<F>(types: &[DocumentType], dependencies_of: F) -> bool
where
    F: Fn(&DocumentType) -> Vec<DocumentType>,
{
    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();

    for ty in types {
        if has_cycle_dfs(ty, &dependencies_of, &mut visited, &mut rec_stack) {
            return false;
        }
    }

    true
}

fn has_cycle_dfs<F>(
    node: &DocumentType,
    dependencies_of: &F,
    visited: &mut HashSet<DocumentType>,
    rec_stack: &mut HashSet<DocumentType>,
) -> bool
where
    F: Fn(&DocumentType) -> Vec<DocumentType>,
{
    if rec_stack.contains(node) {
        return true; // Back edge
    }

    if visited.contains(node) {
        return false;
    }

    visited.insert(node.clone());
    rec_stack.insert(node.clone());

    for dependency in dependencies_of(node) {
        if dependency == *node {
            continue;
        }
        if has_cycle_dfs(&dependency, dependencies_of, visited, rec_stack) {
            return true;
        }
    }

    rec_stack.remove(node);
    false
}

/// No non-deletion operation is followed by a non-deletion operation on one
/// of its direct dependencies.
pub fn invariant_writes_follow_dependencies<F>(
    operations: &[StorageOperation],
    dependencies_of: F,
) -> bool
where
    F: Fn(&DocumentType) -> Vec<DocumentType>,
{
    ordered_pairs_hold(operations, false, |earlier, later| {
        !dependencies_of(earlier).contains(later)
    })
}

/// No deletion is followed by a deletion of a type that depends on it.
pub fn invariant_deletes_precede_dependencies<F>(
    operations: &[StorageOperation],
    dependencies_of: F,
) -> bool
where
    F: Fn(&DocumentType) -> Vec<DocumentType>,
{
    ordered_pairs_hold(operations, true, |earlier, later| {
        !dependencies_of(later).contains(earlier)
    })
}

fn ordered_pairs_hold<P>(operations: &[StorageOperation], deletions: bool, holds: P) -> bool
where
    P: Fn(&DocumentType, &DocumentType) -> bool,
{
    let typed: Vec<&DocumentType> = operations
        .iter()
        .filter(|op| op.is_deletion() == deletions)
        .filter_map(StorageOperation::document_type)
        .collect();

    for i in 0..typed.len() {
        for j in (i + 1)..typed.len() {
            if typed[i] != typed[j] && !holds(typed[i], typed[j]) {
                return false;
            }
        }
    }

    true
}

/// Sorting changed only the order: same number of operations per kind and type.
pub fn invariant_completeness(before: &[StorageOperation], after: &[StorageOperation]) -> bool {
    fn tally(operations: &[StorageOperation]) -> HashMap<(OperationKind, Option<DocumentType>), usize> {
        let mut counts = HashMap::new();
        for op in operations {
            *counts
                .entry((op.kind(), op.document_type().cloned()))
                .or_insert(0) += 1;
        }
        counts
    }

    before.len() == after.len() && tally(before) == tally(after)
}
