//! Inbound Ports (Driving Ports / API)

use crate::domain::entities::{Document, EventStream, StorageOperation};
use crate::domain::errors::OrderingError;
use crate::domain::value_objects::{SortOutcome, StreamId};
use crate::ports::outbound::MappingProvider;
use std::sync::Arc;

/// Primary unit-of-work API used by the session and the persistence executor.
pub trait UnitOfWorkApi {
    /// Stage an operation at the end of the batch.
    fn add(&mut self, operation: StorageOperation);

    /// Staged operations in execution order.
    fn operations(&self) -> &[StorageOperation];

    /// Reorder the batch so foreign keys are satisfied.
    ///
    /// This is the main entry point before execution. It:
    /// 1. Skips batches with one operation or one document type
    /// 2. Resolves dependencies between the batch's document types
    /// 3. Performs the topological sort
    /// 4. Stable-sorts the operations with the matching comparator
    fn sort(&mut self, mappings: &dyn MappingProvider) -> Result<SortOutcome, OrderingError>;

    fn has_outstanding_work(&self) -> bool;

    /// Remove staged operations carrying this exact instance.
    ///
    /// Returns the number of operations removed.
    fn eject(&mut self, document: &Arc<Document>) -> usize;

    /// First staged stream matching the id or key.
    fn try_find_stream(&self, stream_id: &StreamId) -> Option<&EventStream>;
}
