//! # UoW Ledger: Unit-of-Work Operation Ordering
//!
//! Stages document writes, deletes, patches and event appends for one unit
//! of work and reorders them so foreign keys between document tables hold
//! while the batch executes. Ordering uses Kahn's topological sort over the
//! document types in the batch.
//!
//! ## Architecture
//!
//! - **Domain**: Core entities (StorageOperation, DependencyGraph, TypeOrder), type hierarchy, mappings
//! - **Algorithms**: Dependency resolution, Kahn's sort, batch comparators, stable merge sort
//! - **Ports**: Inbound (UnitOfWorkApi) and Outbound (MappingProvider)
//! - **Adapters**: StorageModel built from document mappings
//! - **Application**: OperationLedger orchestration and ChangeSet views

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::{StorageModel, StorageModelBuilder};
pub use application::{ChangeSet, OperationLedger};
pub use config::LedgerConfig;
pub use domain::entities::*;
pub use domain::errors::{MappingError, OrderingError};
pub use domain::hierarchy::TypeHierarchy;
pub use domain::mapping::{DocumentMapping, ForeignKey};
pub use domain::value_objects::*;
pub use ports::inbound::UnitOfWorkApi;
pub use ports::outbound::MappingProvider;
