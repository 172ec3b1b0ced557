//! # Unit-of-Work Flows
//!
//! A session stages changes against a blog model, the ledger sorts them and
//! the executor consumes the batch.
//!
//! ```text
//! User (Admin) <- Blog <- Post <- Comment
//!      ^                            |
//!      +----------------------------+
//! ```

#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::sync::Arc;
    use tracing_subscriber::EnvFilter;
    use uuid::Uuid;

    use uow_ledger::{
        Document, DocumentMapping, DocumentType, EventStream, ForeignKey, LedgerConfig,
        MappingError, OperationKind, OperationLedger, OrderingError, SkipReason, SortOutcome,
        SortStrategy, StorageModel, StorageOperation, StreamId, UnitOfWorkApi,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn blog_model() -> StorageModel {
        StorageModel::builder()
            .document(DocumentMapping::new("User").with_sub_class("Admin"))
            .document(DocumentMapping::new("Blog").references("User"))
            .document(DocumentMapping::new("Post").references("Blog"))
            .document(
                DocumentMapping::new("Comment")
                    .references("Post")
                    .references("User"),
            )
            .document(
                DocumentMapping::new("Category")
                    .references("Category")
                    .with_foreign_key(ForeignKey::external()),
            )
            .implements("Post", "IPublishable")
            .build()
            .expect("blog model is valid")
    }

    fn doc(id: &str, document_type: &str) -> Arc<Document> {
        Document::new(id, document_type, json!({ "id": id })).shared()
    }

    fn layout(ledger: &OperationLedger) -> Vec<(OperationKind, String)> {
        ledger
            .operations()
            .iter()
            .map(|op| {
                let name = op
                    .document_type()
                    .map(DocumentType::to_string)
                    .unwrap_or_default();
                (op.kind(), name)
            })
            .collect()
    }

    fn position(layout: &[(OperationKind, String)], kind: OperationKind, name: &str) -> usize {
        layout
            .iter()
            .position(|(k, n)| *k == kind && n == name)
            .expect("operation is staged")
    }

    // =============================================================================
    // FLOWS: WRITES
    // =============================================================================

    #[test]
    fn test_writes_staged_backwards_commit_dependencies_first() {
        init_tracing();
        let model = blog_model();
        let mut ledger = OperationLedger::for_model(&model);

        ledger.add(StorageOperation::insert(doc("c-1", "Comment")));
        ledger.add(StorageOperation::insert(doc("p-1", "Post")));
        ledger.add(StorageOperation::insert(doc("a-1", "Admin")));
        ledger.add(StorageOperation::insert(doc("b-1", "Blog")));
        ledger.add(StorageOperation::insert(doc("u-1", "User")));
        ledger.add(StorageOperation::patch("Blog", "b-1", json!({ "set": { "title": "hi" } })));
        ledger.add(StorageOperation::insert(doc("t-1", "Tag")));

        let outcome = ledger.sort(&model).expect("blog model has no cycles");

        assert!(matches!(
            outcome,
            SortOutcome::Sorted {
                strategy: SortStrategy::WriteOrder,
                ..
            }
        ));

        let layout = layout(&ledger);
        let user = position(&layout, OperationKind::Insert, "User");
        let admin = position(&layout, OperationKind::Insert, "Admin");
        let blog = position(&layout, OperationKind::Insert, "Blog");
        let patch = position(&layout, OperationKind::Patch, "Blog");
        let post = position(&layout, OperationKind::Insert, "Post");
        let comment = position(&layout, OperationKind::Insert, "Comment");

        assert!(user < blog);
        assert!(admin < blog);
        assert!(blog < patch);
        assert!(patch < post);
        assert!(post < comment);
        assert_eq!(layout.len(), 7);
    }

    #[test]
    fn test_mixed_session_removes_dependents_first() {
        init_tracing();
        let model = blog_model();
        let mut ledger = OperationLedger::for_model(&model);

        ledger.add(StorageOperation::insert(doc("b-2", "Blog")));
        ledger.add(StorageOperation::insert(doc("u-2", "User")));
        ledger.add(StorageOperation::delete_by_id("User", "u-1"));
        ledger.add(StorageOperation::delete_by_id("Comment", "c-1"));
        ledger.add(StorageOperation::delete_by_id("Blog", "b-1"));
        ledger.add(StorageOperation::delete_by_id("Post", "p-1"));

        let outcome = ledger.sort(&model).unwrap();

        assert!(matches!(
            outcome,
            SortOutcome::Sorted {
                strategy: SortStrategy::WriteDeleteOrder,
                ..
            }
        ));
        assert_eq!(
            layout(&ledger),
            vec![
                (OperationKind::Insert, "User".to_string()),
                (OperationKind::Insert, "Blog".to_string()),
                (OperationKind::Delete, "Comment".to_string()),
                (OperationKind::Delete, "Post".to_string()),
                (OperationKind::Delete, "Blog".to_string()),
                (OperationKind::Delete, "User".to_string()),
            ]
        );
    }

    #[test]
    fn test_interleaved_session_orders_each_kind() {
        init_tracing();
        let model = blog_model();
        let mut ledger = OperationLedger::for_model(&model);

        ledger.add(StorageOperation::delete_by_id("User", "u-1"));
        ledger.add(StorageOperation::insert(doc("p-2", "Post")));
        ledger.add(StorageOperation::delete_by_id("Blog", "b-1"));
        ledger.add(StorageOperation::insert(doc("b-2", "Blog")));
        ledger.add(StorageOperation::delete_by_id("Comment", "c-1"));

        ledger.sort(&model).unwrap();

        assert_eq!(
            layout(&ledger),
            vec![
                (OperationKind::Delete, "Comment".to_string()),
                (OperationKind::Insert, "Blog".to_string()),
                (OperationKind::Delete, "Blog".to_string()),
                (OperationKind::Insert, "Post".to_string()),
                (OperationKind::Delete, "User".to_string()),
            ]
        );
    }

    #[test]
    fn test_self_reference_does_not_cycle() {
        let model = blog_model();
        let mut ledger = OperationLedger::for_model(&model);

        ledger.add(StorageOperation::insert(doc("cat-1", "Category")));
        ledger.add(StorageOperation::insert(doc("cat-2", "Category")));
        ledger.add(StorageOperation::insert(doc("t-1", "Tag")));

        let outcome = ledger.sort(&model).unwrap();

        assert!(!outcome.was_skipped());
        let ids: Vec<_> = ledger
            .operations()
            .iter()
            .filter_map(|op| op.document())
            .map(|d| d.id.to_string())
            .collect();
        assert_eq!(ids, vec!["cat-1", "cat-2", "t-1"]);
    }

    #[test]
    fn test_key_into_mid_hierarchy_waits_for_its_descendants() {
        let model = StorageModel::builder()
            .document(
                DocumentMapping::new("Animal")
                    .with_sub_class("Dog")
                    .with_sub_class("Puppy"),
            )
            .extends("Puppy", "Dog")
            .document(DocumentMapping::new("Kennel").references("Dog"))
            .build()
            .unwrap();
        let mut ledger = OperationLedger::for_model(&model);

        ledger.add(StorageOperation::insert(doc("k-1", "Kennel")));
        ledger.add(StorageOperation::insert(doc("p-1", "Puppy")));

        ledger.sort(&model).unwrap();

        assert_eq!(
            layout(&ledger),
            vec![
                (OperationKind::Insert, "Puppy".to_string()),
                (OperationKind::Insert, "Kennel".to_string()),
            ]
        );
    }

    // =============================================================================
    // FLOWS: FAILURES AND LIMITS
    // =============================================================================

    #[test]
    fn test_mutual_references_fail_the_sort() {
        init_tracing();
        let model = StorageModel::builder()
            .document(DocumentMapping::new("Team").references("Player"))
            .document(DocumentMapping::new("Player").references("Team"))
            .build()
            .unwrap();
        let mut ledger = OperationLedger::for_model(&model);
        ledger.add(StorageOperation::insert(doc("t-1", "Team")));
        ledger.add(StorageOperation::insert(doc("p-1", "Player")));

        let err = ledger.sort(&model).unwrap_err();

        match &err {
            OrderingError::CycleDetected { types } => {
                assert_eq!(types.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("Cycle detected in document dependencies"));
        assert!(ledger.has_outstanding_work());
    }

    #[test]
    fn test_configured_limits_reject_large_batches() {
        let model = blog_model();
        let config = LedgerConfig {
            max_batch_size: Some(4),
            ..Default::default()
        };
        let mut ledger = OperationLedger::with_config(model.shared_hierarchy(), config);
        for i in 0..5 {
            ledger.add(StorageOperation::insert(doc(&format!("p-{i}"), "Post")));
        }

        assert!(matches!(
            ledger.sort(&model),
            Err(OrderingError::BatchTooLarge { size: 5, max: 4 })
        ));
    }

    #[test]
    fn test_single_type_batches_can_be_sorted_anyway() {
        let model = blog_model();
        let config = LedgerConfig {
            skip_single_type_batches: false,
            ..Default::default()
        };
        let mut ledger = OperationLedger::with_config(model.shared_hierarchy(), config);
        ledger.add(StorageOperation::insert(doc("u-1", "User")));
        ledger.add(StorageOperation::delete_by_id("User", "u-0"));

        let outcome = ledger.sort(&model).unwrap();

        assert!(!outcome.was_skipped());
        assert_eq!(ledger.operations()[0].kind(), OperationKind::Insert);
    }

    #[test]
    fn test_invalid_model_is_rejected() {
        let result = StorageModel::builder()
            .document(DocumentMapping::new("User"))
            .document(DocumentMapping::new("User"))
            .build();

        assert!(matches!(result, Err(MappingError::DuplicateMapping(_))));
    }

    // =============================================================================
    // FLOWS: EJECTION, STREAMS AND CHANGE SETS
    // =============================================================================

    #[test]
    fn test_ejected_document_leaves_the_batch() {
        let model = blog_model();
        let mut ledger = OperationLedger::for_model(&model);
        let user = doc("u-1", "User");

        ledger.add(StorageOperation::insert(user.clone()));
        ledger.add(StorageOperation::insert(doc("b-1", "Blog")));

        assert_eq!(ledger.eject(&user), 1);
        assert_eq!(
            ledger.sort(&model).unwrap(),
            SortOutcome::Skipped(SkipReason::TooFewOperations)
        );
        assert!(ledger.change_set().inserts_for(&DocumentType::new("User")).is_empty());
    }

    #[test]
    fn test_event_streams_staged_next_to_documents() {
        let model = blog_model();
        let mut ledger = OperationLedger::for_model(&model);
        let order_stream = Uuid::new_v4();

        ledger.add(StorageOperation::insert(doc("p-1", "Post")));
        ledger.add(StorageOperation::append_events(
            EventStream::start(order_stream)
                .with_aggregate_type("Post")
                .with_event("PostDrafted", json!({ "post": "p-1" })),
        ));
        ledger.add(StorageOperation::insert(doc("b-1", "Blog")));

        assert_eq!(ledger.append_to_stream(order_stream, "PostPublished", json!({})), 2);
        assert_eq!(ledger.append_to_stream("audit", "Touched", json!({})), 1);

        ledger.sort(&model).unwrap();

        let stream = ledger.try_find_stream(&StreamId::Id(order_stream)).unwrap();
        assert_eq!(stream.events.len(), 2);
        assert_eq!(stream.events[1].version, 2);

        let layout = layout(&ledger);
        let blog = position(&layout, OperationKind::Insert, "Blog");
        let events = position(&layout, OperationKind::AppendEvents, "Post");
        assert!(blog < events);
        assert_eq!(ledger.change_set().events().len(), 3);
    }

    #[test]
    fn test_change_set_views_follow_the_hierarchy() {
        let model = blog_model();
        let mut ledger = OperationLedger::for_model(&model);

        ledger.add(StorageOperation::insert(doc("u-1", "User")));
        ledger.add(StorageOperation::insert(doc("a-1", "Admin")));
        ledger.add(StorageOperation::upsert(doc("p-1", "Post")));
        ledger.add(StorageOperation::delete(doc("a-0", "Admin")));

        let changes = ledger.change_set();
        let ids = |docs: Vec<&Arc<Document>>| -> Vec<String> {
            docs.iter().map(|d| d.id.to_string()).collect()
        };

        assert_eq!(ids(changes.inserts_for(&DocumentType::new("User"))), vec!["u-1", "a-1"]);
        assert_eq!(ids(changes.inserts_for(&DocumentType::new("Admin"))), vec!["a-1"]);
        assert_eq!(
            ids(changes.all_changed_for(&DocumentType::new("IPublishable"))),
            vec!["p-1"]
        );
        assert_eq!(changes.deletions_for(&DocumentType::new("User")).len(), 1);
    }

    #[test]
    fn test_sorted_batch_serializes_for_the_executor() {
        let model = blog_model();
        let mut ledger = OperationLedger::for_model(&model);
        ledger.add(StorageOperation::insert(doc("b-1", "Blog")));
        ledger.add(StorageOperation::insert(doc("u-1", "User")));
        ledger.sort(&model).unwrap();

        let operations = ledger.into_operations();
        let encoded = serde_json::to_value(&operations).unwrap();

        assert_eq!(encoded.as_array().map(Vec::len), Some(2));
        let decoded: Vec<StorageOperation> = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded[0].document().unwrap().id.as_str(), "u-1");
    }
}
