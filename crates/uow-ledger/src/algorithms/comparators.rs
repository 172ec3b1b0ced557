//! Batch comparators
//!
//! Orders staged operations by the position of their document type in the
//! topological [`TypeOrder`]. Subclasses missing from the order borrow the
//! position of their nearest ancestor.

use crate::domain::entities::{StorageOperation, TypeOrder};
use crate::domain::hierarchy::TypeHierarchy;
use crate::domain::value_objects::{DocumentType, SortStrategy};
use std::cmp::Ordering;

/// Common ordering interface for the sort strategies.
pub trait BatchComparator {
    fn compare(&self, left: &StorageOperation, right: &StorageOperation) -> Ordering;

    fn strategy(&self) -> SortStrategy;
}

/// Position of `document_type` in `order`, walking up the ancestor chain
/// when the exact type is absent. `None` sorts before every known index.
pub fn type_index(
    order: &TypeOrder,
    hierarchy: &TypeHierarchy,
    document_type: &DocumentType,
) -> Option<usize> {
    order.index_of(document_type).or_else(|| {
        hierarchy
            .ancestors(document_type)
            .find_map(|ancestor| order.index_of(ancestor))
    })
}

/// Dependencies before dependents. Used when no deletions are staged.
pub struct WriteOrder<'a> {
    order: &'a TypeOrder,
    hierarchy: &'a TypeHierarchy,
}

impl<'a> WriteOrder<'a> {
    pub fn new(order: &'a TypeOrder, hierarchy: &'a TypeHierarchy) -> Self {
        Self { order, hierarchy }
    }
}

impl BatchComparator for WriteOrder<'_> {
    fn compare(&self, left: &StorageOperation, right: &StorageOperation) -> Ordering {
        let (Some(left_type), Some(right_type)) = (left.document_type(), right.document_type())
        else {
            return Ordering::Equal;
        };
        if left_type == right_type {
            return Ordering::Equal;
        }

        let left_index = type_index(self.order, self.hierarchy, left_type);
        let right_index = type_index(self.order, self.hierarchy, right_type);
        left_index.cmp(&right_index)
    }

    fn strategy(&self) -> SortStrategy {
        SortStrategy::WriteOrder
    }
}

/// Write order for writes, reverse order among deletions.
///
/// A deletion compared with a non-deletion always reports the left operand
/// first, so the relation is only total within one kind. Callers order
/// writes and deletions separately with
/// [`super::slot_sort::sort_within_slots`].
pub struct WriteDeleteOrder<'a> {
    order: &'a TypeOrder,
    hierarchy: &'a TypeHierarchy,
}

impl<'a> WriteDeleteOrder<'a> {
    pub fn new(order: &'a TypeOrder, hierarchy: &'a TypeHierarchy) -> Self {
        Self { order, hierarchy }
    }
}

impl BatchComparator for WriteDeleteOrder<'_> {
    fn compare(&self, left: &StorageOperation, right: &StorageOperation) -> Ordering {
        let (Some(left_type), Some(right_type)) = (left.document_type(), right.document_type())
        else {
            return Ordering::Equal;
        };

        match (left.is_deletion(), right.is_deletion()) {
            (true, false) | (false, true) => Ordering::Less,
            (true, true) => {
                if left_type == right_type {
                    return Ordering::Equal;
                }
                let left_index = type_index(self.order, self.hierarchy, left_type);
                let right_index = type_index(self.order, self.hierarchy, right_type);
                // Dependents are removed before the rows they reference
                right_index.cmp(&left_index)
            }
            (false, false) => {
                if left_type == right_type {
                    return Ordering::Equal;
                }
                let left_index = type_index(self.order, self.hierarchy, left_type);
                let right_index = type_index(self.order, self.hierarchy, right_type);
                left_index.cmp(&right_index)
            }
        }
    }

    fn strategy(&self) -> SortStrategy {
        SortStrategy::WriteDeleteOrder
    }
}
