//! Domain module for the unit-of-work ledger
//!
//! Contains core entities, value objects, mapping metadata, the type
//! hierarchy, errors, and invariants.

pub mod entities;
pub mod errors;
pub mod hierarchy;
pub mod invariants;
pub mod mapping;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use hierarchy::TypeHierarchy;
pub use mapping::{DocumentMapping, ForeignKey};
pub use value_objects::*;
