//! Algorithms module for batch ordering
//!
//! Contains:
//! - Dependency resolution and graph building
//! - Kahn's topological sort over document types
//! - Batch comparators
//! - Class-partitioned stable sort

pub mod comparators;
pub mod dependency_resolver;
pub mod slot_sort;
pub mod topological;

pub use comparators::{type_index, BatchComparator, WriteDeleteOrder, WriteOrder};
pub use dependency_resolver::{build_dependency_graph, DependencyResolver};
pub use slot_sort::sort_within_slots;
pub use topological::{kahns_topological_sort, order_types};
