//! Core entities for the unit-of-work ledger
//!
//! Documents, events, event streams and the staged [`StorageOperation`]
//! variants that the ledger orders.

use super::value_objects::{DocumentId, DocumentType, OperationKind, StreamId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// A document payload as tracked by the session.
///
/// Shared as `Arc<Document>`; the ledger matches payloads by pointer
/// identity, never by value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Row identity
    pub id: DocumentId,
    /// Runtime type of the payload (may be a subclass)
    pub document_type: DocumentType,
    /// Serialized body
    pub body: Value,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, document_type: impl Into<DocumentType>, body: Value) -> Self {
        Self {
            id: id.into(),
            document_type: document_type.into(),
            body,
        }
    }

    /// Wrap in an `Arc` so the ledger can track this exact instance.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

/// Insert, update or upsert of a whole document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentChange {
    /// Declared storage type; may be an ancestor of the payload's runtime type
    pub document_type: DocumentType,
    pub document: Arc<Document>,
}

/// Removal of a document row.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deletion {
    pub document_type: DocumentType,
    pub id: DocumentId,
    /// Present when the deletion was staged from a loaded instance
    pub document: Option<Arc<Document>>,
}

/// Partial update applied to a stored document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatchOperation {
    pub document_type: DocumentType,
    pub id: DocumentId,
    pub patch: Value,
}

/// A single event staged on a stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    /// Event type name used by projections
    pub event_type: String,
    pub data: Value,
    /// Stream version this event lands at
    pub version: u64,
}

/// Whether the staged stream is new or continues an existing stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamAction {
    Start,
    Append,
}

/// Ordered events staged against one aggregate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventStream {
    pub id: Option<Uuid>,
    pub key: Option<String>,
    /// Aggregate document type, when the stream is bound to one
    pub aggregate_type: Option<DocumentType>,
    pub action: StreamAction,
    /// Version the stream is known to be at before these events
    pub expected_version: Option<u64>,
    pub events: Vec<Event>,
}

impl EventStream {
    fn empty(action: StreamAction) -> Self {
        Self {
            id: None,
            key: None,
            aggregate_type: None,
            action,
            expected_version: None,
            events: Vec::new(),
        }
    }

    /// Stage a brand new stream.
    pub fn start(stream_id: impl Into<StreamId>) -> Self {
        Self::empty(StreamAction::Start).with_identity(stream_id.into())
    }

    /// Stage events onto a stream that already exists in the store.
    pub fn append(stream_id: impl Into<StreamId>) -> Self {
        Self::empty(StreamAction::Append).with_identity(stream_id.into())
    }

    fn with_identity(mut self, stream_id: StreamId) -> Self {
        match stream_id {
            StreamId::Id(id) => self.id = Some(id),
            StreamId::Key(key) => self.key = Some(key),
        }
        self
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_aggregate_type(mut self, aggregate_type: impl Into<DocumentType>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    pub fn with_expected_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }

    /// Add an event at the next version of this stream.
    pub fn push_event(&mut self, event_type: impl Into<String>, data: Value) -> &Event {
        let version = self.current_version() + 1;
        self.events.push(Event {
            id: Uuid::new_v4(),
            event_type: event_type.into(),
            data,
            version,
        });
        &self.events[self.events.len() - 1]
    }

    pub fn with_event(mut self, event_type: impl Into<String>, data: Value) -> Self {
        self.push_event(event_type, data);
        self
    }

    /// Version after all staged events have been applied.
    pub fn current_version(&self) -> u64 {
        self.expected_version.unwrap_or(0) + self.events.len() as u64
    }

    /// True when either the id or the key matches.
    pub fn matches(&self, stream_id: &StreamId) -> bool {
        match stream_id {
            StreamId::Id(id) => self.id.as_ref() == Some(id),
            StreamId::Key(key) => self.key.as_deref() == Some(key.as_str()),
        }
    }
}

/// A pending unit of change staged in the ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum StorageOperation {
    Insert(DocumentChange),
    Update(DocumentChange),
    Upsert(DocumentChange),
    Delete(Deletion),
    Patch(PatchOperation),
    AppendEvents(EventStream),
}

impl StorageOperation {
    /// Insert declared as the payload's own runtime type.
    pub fn insert(document: Arc<Document>) -> Self {
        let document_type = document.document_type.clone();
        Self::insert_as(document_type, document)
    }

    pub fn insert_as(document_type: impl Into<DocumentType>, document: Arc<Document>) -> Self {
        StorageOperation::Insert(DocumentChange {
            document_type: document_type.into(),
            document,
        })
    }

    pub fn update(document: Arc<Document>) -> Self {
        let document_type = document.document_type.clone();
        Self::update_as(document_type, document)
    }

    pub fn update_as(document_type: impl Into<DocumentType>, document: Arc<Document>) -> Self {
        StorageOperation::Update(DocumentChange {
            document_type: document_type.into(),
            document,
        })
    }

    pub fn upsert(document: Arc<Document>) -> Self {
        let document_type = document.document_type.clone();
        Self::upsert_as(document_type, document)
    }

    pub fn upsert_as(document_type: impl Into<DocumentType>, document: Arc<Document>) -> Self {
        StorageOperation::Upsert(DocumentChange {
            document_type: document_type.into(),
            document,
        })
    }

    /// Delete a loaded instance.
    pub fn delete(document: Arc<Document>) -> Self {
        StorageOperation::Delete(Deletion {
            document_type: document.document_type.clone(),
            id: document.id.clone(),
            document: Some(document),
        })
    }

    pub fn delete_by_id(document_type: impl Into<DocumentType>, id: impl Into<DocumentId>) -> Self {
        StorageOperation::Delete(Deletion {
            document_type: document_type.into(),
            id: id.into(),
            document: None,
        })
    }

    pub fn patch(
        document_type: impl Into<DocumentType>,
        id: impl Into<DocumentId>,
        patch: Value,
    ) -> Self {
        StorageOperation::Patch(PatchOperation {
            document_type: document_type.into(),
            id: id.into(),
            patch,
        })
    }

    pub fn append_events(stream: EventStream) -> Self {
        StorageOperation::AppendEvents(stream)
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            StorageOperation::Insert(_) => OperationKind::Insert,
            StorageOperation::Update(_) => OperationKind::Update,
            StorageOperation::Upsert(_) => OperationKind::Upsert,
            StorageOperation::Delete(_) => OperationKind::Delete,
            StorageOperation::Patch(_) => OperationKind::Patch,
            StorageOperation::AppendEvents(_) => OperationKind::AppendEvents,
        }
    }

    /// Declared document type. `None` only for event appends that are not
    /// bound to an aggregate type.
    pub fn document_type(&self) -> Option<&DocumentType> {
        match self {
            StorageOperation::Insert(change)
            | StorageOperation::Update(change)
            | StorageOperation::Upsert(change) => Some(&change.document_type),
            StorageOperation::Delete(deletion) => Some(&deletion.document_type),
            StorageOperation::Patch(patch) => Some(&patch.document_type),
            StorageOperation::AppendEvents(stream) => stream.aggregate_type.as_ref(),
        }
    }

    /// Payload instance carried by document operations.
    pub fn document(&self) -> Option<&Arc<Document>> {
        match self {
            StorageOperation::Insert(change)
            | StorageOperation::Update(change)
            | StorageOperation::Upsert(change) => Some(&change.document),
            StorageOperation::Delete(deletion) => deletion.document.as_ref(),
            StorageOperation::Patch(_) | StorageOperation::AppendEvents(_) => None,
        }
    }

    pub fn is_deletion(&self) -> bool {
        self.kind().is_deletion()
    }

    /// Document-bearing operation that can be ejected by instance or type.
    pub fn is_document_operation(&self) -> bool {
        matches!(
            self,
            StorageOperation::Insert(_)
                | StorageOperation::Update(_)
                | StorageOperation::Upsert(_)
                | StorageOperation::Delete(_)
        )
    }

    pub fn stream(&self) -> Option<&EventStream> {
        match self {
            StorageOperation::AppendEvents(stream) => Some(stream),
            _ => None,
        }
    }

    pub fn stream_mut(&mut self) -> Option<&mut EventStream> {
        match self {
            StorageOperation::AppendEvents(stream) => Some(stream),
            _ => None,
        }
    }
}

/// Dependency graph over the document types of one batch
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Nodes in first-seen order
    pub types: Vec<DocumentType>,
    /// Adjacency list: dependency -> [dependent, dependent, ...]
    pub adjacency: HashMap<DocumentType, Vec<DocumentType>>,
    /// In-degree (number of unresolved dependencies) for each node
    pub in_degree: HashMap<DocumentType, usize>,
    edge_count: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type node. Returns false if it was already present.
    pub fn add_node(&mut self, document_type: DocumentType) -> bool {
        if self.in_degree.contains_key(&document_type) {
            return false;
        }
        self.adjacency.entry(document_type.clone()).or_default();
        self.in_degree.insert(document_type.clone(), 0);
        self.types.push(document_type);
        true
    }

    /// Add an edge meaning `dependency` must be written before `dependent`.
    ///
    /// Self edges and duplicates are ignored; missing nodes are added.
    pub fn add_edge(&mut self, dependency: DocumentType, dependent: DocumentType) {
        if dependency == dependent || self.has_edge(&dependency, &dependent) {
            return;
        }
        self.add_node(dependency.clone());
        self.add_node(dependent.clone());

        self.adjacency
            .entry(dependency)
            .or_default()
            .push(dependent.clone());
        *self.in_degree.entry(dependent).or_insert(0) += 1;
        self.edge_count += 1;
    }

    pub fn has_edge(&self, dependency: &DocumentType, dependent: &DocumentType) -> bool {
        self.adjacency
            .get(dependency)
            .map(|dependents| dependents.contains(dependent))
            .unwrap_or(false)
    }

    pub fn contains(&self, document_type: &DocumentType) -> bool {
        self.in_degree.contains_key(document_type)
    }

    pub fn node_count(&self) -> usize {
        self.types.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

/// Topological order of document types.
///
/// Grouped into levels: types in one level have no dependency on each other,
/// and every dependency of a type sits in an earlier level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeOrder {
    pub levels: Vec<Vec<DocumentType>>,
    positions: HashMap<DocumentType, usize>,
}

impl TypeOrder {
    pub fn new(levels: Vec<Vec<DocumentType>>) -> Self {
        let positions = levels
            .iter()
            .flatten()
            .enumerate()
            .map(|(index, ty)| (ty.clone(), index))
            .collect();

        Self { levels, positions }
    }

    /// One type per level, in the given order.
    pub fn sequential(types: Vec<DocumentType>) -> Self {
        Self::new(types.into_iter().map(|ty| vec![ty]).collect())
    }

    /// Flattened order, dependencies first.
    pub fn flatten(&self) -> Vec<DocumentType> {
        self.levels.iter().flatten().cloned().collect()
    }

    /// Position of an exact type in the flattened order.
    pub fn index_of(&self, document_type: &DocumentType) -> Option<usize> {
        self.positions.get(document_type).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
