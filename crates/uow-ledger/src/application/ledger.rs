//! Operation Ledger
//!
//! Main unit-of-work batch implementing `UnitOfWorkApi`.

use crate::adapters::StorageModel;
use crate::algorithms::{
    build_dependency_graph, kahns_topological_sort, sort_within_slots, BatchComparator,
    DependencyResolver, WriteDeleteOrder, WriteOrder,
};
use crate::application::change_set::ChangeSet;
use crate::config::LedgerConfig;
use crate::domain::entities::{Document, EventStream, StorageOperation};
use crate::domain::errors::OrderingError;
use crate::domain::hierarchy::TypeHierarchy;
use crate::domain::value_objects::{DocumentType, SkipReason, SortOutcome, SortStrategy, StreamId};
use crate::ports::inbound::UnitOfWorkApi;
use crate::ports::outbound::MappingProvider;
use serde_json::Value;
use std::sync::Arc;

use tracing::{debug, info, warn};

/// Staged operations of one unit of work.
///
/// Orchestrates the ordering pipeline on `sort`:
/// 1. Validate batch limits
/// 2. Skip trivially ordered batches
/// 3. Build the type dependency graph
/// 4. Execute Kahn's algorithm
/// 5. Stable-sort with the write or write+delete comparator
///
/// Not synchronized: one ledger belongs to one unit of work.
pub struct OperationLedger {
    operations: Vec<StorageOperation>,
    hierarchy: Arc<TypeHierarchy>,
    config: LedgerConfig,
    sorted: bool,
}

impl OperationLedger {
    /// Create a ledger with an empty hierarchy and default config.
    ///
    /// Type-filtered views only match exact types until a `sort` adopts the
    /// mapping provider's hierarchy.
    pub fn new() -> Self {
        Self::with_config(Arc::new(TypeHierarchy::new()), LedgerConfig::default())
    }

    pub fn with_hierarchy(hierarchy: Arc<TypeHierarchy>) -> Self {
        Self::with_config(hierarchy, LedgerConfig::default())
    }

    pub fn with_config(hierarchy: Arc<TypeHierarchy>, config: LedgerConfig) -> Self {
        Self {
            operations: Vec::new(),
            hierarchy,
            config,
            sorted: false,
        }
    }

    /// Ledger sharing the model's type hierarchy.
    pub fn for_model(model: &StorageModel) -> Self {
        Self::with_hierarchy(model.shared_hierarchy())
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Drop every staged operation.
    pub fn clear(&mut self) {
        self.operations.clear();
        self.sorted = false;
    }

    /// True when the current order came from a `sort` call with no `add` or
    /// `eject` since.
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Hand the batch to the persistence executor.
    pub fn into_operations(self) -> Vec<StorageOperation> {
        self.operations
    }

    /// Read-only categorized views over the staged batch.
    pub fn change_set(&self) -> ChangeSet<'_> {
        ChangeSet::new(&self.operations, &self.hierarchy)
    }

    /// Operations whose declared type is exactly `document_type`.
    pub fn operations_for(&self, document_type: &DocumentType) -> Vec<&StorageOperation> {
        self.operations
            .iter()
            .filter(|op| op.document_type() == Some(document_type))
            .collect()
    }

    /// Remove every document operation declared as exactly `document_type`.
    pub fn eject_all_of_type(&mut self, document_type: &DocumentType) -> usize {
        let removed = self.remove_where(|op| {
            op.is_document_operation() && op.document_type() == Some(document_type)
        });

        if removed > 0 {
            debug!(document_type = %document_type, removed, "Ejected all operations of type");
        }
        removed
    }

    pub fn try_find_stream_mut(&mut self, stream_id: &StreamId) -> Option<&mut EventStream> {
        self.operations
            .iter_mut()
            .filter_map(StorageOperation::stream_mut)
            .find(|stream| stream.matches(stream_id))
    }

    /// Add an event to the staged stream with this id or key, staging a new
    /// append operation when none exists yet.
    ///
    /// Returns the stream version after the event.
    pub fn append_to_stream(
        &mut self,
        stream_id: impl Into<StreamId>,
        event_type: impl Into<String>,
        data: Value,
    ) -> u64 {
        let stream_id = stream_id.into();

        if let Some(stream) = self.try_find_stream_mut(&stream_id) {
            stream.push_event(event_type, data);
            return stream.current_version();
        }

        debug!(stream = %stream_id, "Staging new event stream");
        let stream = EventStream::append(stream_id).with_event(event_type, data);
        let version = stream.current_version();
        self.add(StorageOperation::append_events(stream));
        version
    }

    /// Validate batch size against the configured limit
    fn validate_batch(&self) -> Result<(), OrderingError> {
        if let Some(max) = self.config.max_batch_size {
            if self.operations.len() > max {
                return Err(OrderingError::BatchTooLarge {
                    size: self.operations.len(),
                    max,
                });
            }
        }

        Ok(())
    }

    /// Check whether insertion order can be kept as is
    fn skip_reason(&self) -> Option<SkipReason> {
        let Some((first, rest)) = self.operations.split_first() else {
            return Some(SkipReason::TooFewOperations);
        };
        if rest.is_empty() {
            return Some(SkipReason::TooFewOperations);
        }

        let first_type = first.document_type();
        if self.config.skip_single_type_batches
            && rest.iter().all(|op| op.document_type() == first_type)
        {
            return Some(SkipReason::SingleDocumentType);
        }

        None
    }

    /// Distinct document types in first-seen order
    fn distinct_types(&self) -> Vec<DocumentType> {
        let mut types: Vec<DocumentType> = Vec::new();
        for document_type in self.operations.iter().filter_map(StorageOperation::document_type) {
            if !types.contains(document_type) {
                types.push(document_type.clone());
            }
        }
        types
    }

    /// Share one hierarchy between sorting and the change-set views
    fn adopt_hierarchy(&mut self, mappings: &dyn MappingProvider) {
        if !std::ptr::eq(self.hierarchy.as_ref(), mappings.hierarchy()) {
            debug!(
                types = mappings.hierarchy().len(),
                "Adopting mapping provider hierarchy"
            );
            self.hierarchy = Arc::new(mappings.hierarchy().clone());
        }
    }

    /// Writes and deletions are sorted within their own positions; operations
    /// without a document type stay put.
    fn apply(&mut self, comparator: &dyn BatchComparator) -> SortStrategy {
        sort_within_slots(
            &mut self.operations,
            |op| op.document_type().map(|_| op.is_deletion()),
            |left, right| comparator.compare(left, right),
        );
        comparator.strategy()
    }

    fn remove_where<P>(&mut self, predicate: P) -> usize
    where
        P: Fn(&StorageOperation) -> bool,
    {
        let before = self.operations.len();
        self.operations.retain(|op| !predicate(op));
        let removed = before - self.operations.len();
        if removed > 0 {
            self.sorted = false;
        }
        removed
    }
}

impl Default for OperationLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitOfWorkApi for OperationLedger {
    fn add(&mut self, operation: StorageOperation) {
        self.operations.push(operation);
        self.sorted = false;
    }

    fn operations(&self) -> &[StorageOperation] {
        &self.operations
    }

    fn sort(&mut self, mappings: &dyn MappingProvider) -> Result<SortOutcome, OrderingError> {
        // 1. Validate input
        self.validate_batch()?;
        self.adopt_hierarchy(mappings);

        // 2. Nothing to reorder
        if let Some(reason) = self.skip_reason() {
            debug!(
                operations = self.operations.len(),
                ?reason,
                "Keeping insertion order"
            );
            self.sorted = true;
            return Ok(SortOutcome::Skipped(reason));
        }

        // 3. Build dependency graph over the batch's types
        let types = self.distinct_types();
        let resolver = DependencyResolver::new(mappings);
        let graph = build_dependency_graph(&types, |ty| resolver.dependencies_of(ty));

        if let Some(max) = self.config.max_edge_count {
            if graph.edge_count() > max {
                return Err(OrderingError::TooManyEdges {
                    count: graph.edge_count(),
                    max,
                });
            }
        }

        // 4. Topological order of types
        let order = match kahns_topological_sort(&graph) {
            Ok(order) => order,
            Err(err) => {
                warn!(error = %err, types = types.len(), "Cannot order unit of work");
                return Err(err);
            }
        };

        // 5. Reorder operations
        let hierarchy = Arc::clone(&self.hierarchy);
        let strategy = if self.operations.iter().any(StorageOperation::is_deletion) {
            self.apply(&WriteDeleteOrder::new(&order, &hierarchy))
        } else {
            self.apply(&WriteOrder::new(&order, &hierarchy))
        };
        self.sorted = true;

        info!(
            operations = self.operations.len(),
            document_types = types.len(),
            ordered_types = order.len(),
            ?strategy,
            "Unit of work sorted"
        );

        Ok(SortOutcome::Sorted {
            strategy,
            ordered_types: order.len(),
        })
    }

    fn has_outstanding_work(&self) -> bool {
        !self.operations.is_empty()
    }

    fn eject(&mut self, document: &Arc<Document>) -> usize {
        let removed = self.remove_where(|op| {
            op.document_type() == Some(&document.document_type)
                && op
                    .document()
                    .is_some_and(|staged| Arc::ptr_eq(staged, document))
        });

        if removed > 0 {
            debug!(
                document_type = %document.document_type,
                id = %document.id,
                removed,
                "Ejected document"
            );
        }
        removed
    }

    fn try_find_stream(&self, stream_id: &StreamId) -> Option<&EventStream> {
        self.operations
            .iter()
            .filter_map(StorageOperation::stream)
            .find(|stream| stream.matches(stream_id))
    }
}
