mod common;

use common::{draft, insert_at, setup_queue};
use futures::future::join_all;
use offline_sync::{
    AppConfig, AppError, EntityCollection, GroupId, LocalRecordStore, OfflineRuntime,
    OperationStatus, OperationType, QueueServiceTrait,
};
use serde_json::json;
use std::collections::HashSet;

#[tokio::test]
async fn next_batch_follows_priority_target_and_type_precedence() {
    let ctx = setup_queue().await;
    let stock = insert_at(
        &ctx.store,
        draft(OperationType::StockUpdate, "products", 0),
        100,
    )
    .await;
    let create_product =
        insert_at(&ctx.store, draft(OperationType::Create, "products", 0), 50).await;
    let create_sale = insert_at(&ctx.store, draft(OperationType::Create, "sales", 1), 10).await;

    let batch = ctx.queue.next_batch().await.unwrap();
    let ids: Vec<_> = batch.iter().map(|op| op.id.clone()).collect();

    // 優先度 1 の sales が先頭、同一優先度の products 内では stock_update が create より先
    assert_eq!(ids, vec![create_sale.id, stock.id, create_product.id]);
}

#[tokio::test]
async fn next_batch_is_deterministic_and_fifo_within_equal_keys() {
    let ctx = setup_queue().await;
    let late = insert_at(&ctx.store, draft(OperationType::Update, "sales", 0), 300).await;
    let early = insert_at(&ctx.store, draft(OperationType::Update, "sales", 0), 100).await;
    let delete = insert_at(&ctx.store, draft(OperationType::Delete, "sales", 0), 50).await;
    let category = insert_at(&ctx.store, draft(OperationType::Delete, "categories", 0), 500).await;

    let first = ctx.queue.next_batch().await.unwrap();
    let second = ctx.queue.next_batch().await.unwrap();
    assert_eq!(first, second);

    let ids: Vec<_> = first.iter().map(|op| op.id.clone()).collect();
    assert_eq!(ids, vec![category.id, early.id, late.id, delete.id]);
}

#[tokio::test]
async fn dependents_are_excluded_while_parent_is_present() {
    let ctx = setup_queue().await;
    let parent = ctx
        .queue
        .enqueue(draft(OperationType::Create, "sales", 0))
        .await
        .unwrap();
    let child = ctx
        .queue
        .enqueue(draft(OperationType::Create, "sale_items", 9).with_parent(parent.id.clone()))
        .await
        .unwrap();

    let batch = ctx.queue.next_batch().await.unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].id, parent.id);

    // 親がエラー状態でもキューに残っている限り子は除外される
    ctx.queue
        .update_status(&parent.id, OperationStatus::Error, Some("rejected".into()))
        .await
        .unwrap();
    assert!(ctx.queue.next_batch().await.unwrap().is_empty());

    ctx.queue.remove_completed(&parent.id).await.unwrap();
    let batch = ctx.queue.next_batch().await.unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].id, child.id);
}

#[tokio::test]
async fn retry_count_increments_per_failure_and_resets_on_pending() {
    let ctx = setup_queue().await;
    let record = ctx
        .queue
        .enqueue(draft(OperationType::Update, "products", 0))
        .await
        .unwrap();

    for attempt in 1..=3u32 {
        let failed = ctx
            .queue
            .update_status(
                &record.id,
                OperationStatus::Error,
                Some(format!("attempt {attempt}")),
            )
            .await
            .unwrap();
        assert_eq!(failed.retry_count, attempt);
    }

    let failed = ctx.queue.list_failed().await.unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].error_detail.as_deref(), Some("attempt 3"));

    let reset = ctx
        .queue
        .update_status(&record.id, OperationStatus::Pending, None)
        .await
        .unwrap();
    assert_eq!(reset.retry_count, 0);
    assert!(reset.error_detail.is_none());
}

#[tokio::test]
async fn concurrent_failures_on_one_record_are_all_counted() {
    let ctx = setup_queue().await;
    let record = ctx
        .queue
        .enqueue(draft(OperationType::Update, "sales", 0))
        .await
        .unwrap();

    let updates = (0..20).map(|i| {
        let queue = ctx.queue.clone();
        let id = record.id.clone();
        async move {
            queue
                .update_status(&id, OperationStatus::Error, Some(format!("failure {i}")))
                .await
        }
    });
    for result in join_all(updates).await {
        result.unwrap();
    }

    let failed = ctx.queue.list_failed().await.unwrap();
    assert_eq!(failed[0].retry_count, 20);
}

#[tokio::test]
async fn concurrent_enqueue_produces_unique_ids_and_timestamps() {
    let ctx = setup_queue().await;

    let inserts = (0..50).map(|i| {
        let queue = ctx.queue.clone();
        async move {
            queue
                .enqueue(draft(OperationType::Create, "sales", i % 3))
                .await
        }
    });
    let records: Vec<_> = join_all(inserts)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    let ids: HashSet<_> = records.iter().map(|r| r.id.clone()).collect();
    let stamps: HashSet<_> = records.iter().map(|r| r.created_at).collect();
    assert_eq!(ids.len(), 50);
    assert_eq!(stamps.len(), 50);
    assert!(records.iter().all(|r| r.status == OperationStatus::Pending));
    assert_eq!(ctx.queue.stats().await.unwrap().pending, 50);
}

#[tokio::test]
async fn grouped_enqueue_is_all_or_nothing() {
    let ctx = setup_queue().await;
    let existing = ctx
        .queue
        .enqueue(draft(OperationType::Create, "sales", 0))
        .await
        .unwrap();

    // sale_items の挿入だけを失敗させる
    sqlx::query(
        "CREATE TRIGGER reject_sale_items BEFORE INSERT ON pending_operations
         WHEN NEW.target = 'sale_items'
         BEGIN SELECT RAISE(ABORT, 'sale_items rejected'); END;",
    )
    .execute(&ctx.pool)
    .await
    .unwrap();

    let group = GroupId::new("sale-99".into()).unwrap();
    let result = ctx
        .queue
        .enqueue_group(
            Some(group.clone()),
            vec![
                draft(OperationType::Create, "sales", 0),
                draft(OperationType::Create, "sale_items", 0),
            ],
        )
        .await;

    assert!(matches!(result, Err(AppError::Transaction(_))));
    assert!(ctx.queue.list_group(&group).await.unwrap().is_empty());
    assert_eq!(ctx.queue.stats().await.unwrap().total(), 1);
    assert!(ctx.queue.list_group(&existing.group_id).await.unwrap().len() == 1);
}

#[tokio::test]
async fn clear_all_data_empties_queue_and_collections() {
    let ctx = setup_queue().await;
    ctx.queue
        .enqueue(draft(OperationType::Create, "products", 0))
        .await
        .unwrap();
    for collection in EntityCollection::ALL {
        ctx.store
            .upsert_record(collection, "doc-1", &json!({"name": collection.table_name()}))
            .await
            .unwrap();
    }

    ctx.queue.clear_all_data().await.unwrap();

    assert_eq!(ctx.queue.stats().await.unwrap().total(), 0);
    for collection in EntityCollection::ALL {
        assert_eq!(ctx.store.count_records(collection).await.unwrap(), 0);
    }
}

#[tokio::test]
async fn clear_all_data_failure_changes_nothing() {
    let ctx = setup_queue().await;
    ctx.queue
        .enqueue(draft(OperationType::Create, "products", 0))
        .await
        .unwrap();
    ctx.store
        .upsert_record(EntityCollection::Products, "p1", &json!({"stock": 4}))
        .await
        .unwrap();
    ctx.store
        .upsert_record(EntityCollection::Sales, "s1", &json!({"total": 12}))
        .await
        .unwrap();

    sqlx::query(
        "CREATE TRIGGER block_queue_clear BEFORE DELETE ON pending_operations
         BEGIN SELECT RAISE(ABORT, 'queue locked'); END;",
    )
    .execute(&ctx.pool)
    .await
    .unwrap();

    let result = ctx.queue.clear_all_data().await;
    assert!(matches!(result, Err(AppError::Transaction(_))));

    assert_eq!(ctx.queue.stats().await.unwrap().pending, 1);
    assert_eq!(
        ctx.store
            .count_records(EntityCollection::Products)
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        ctx.store.count_records(EntityCollection::Sales).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn processing_records_return_to_pending_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("offline.db");

    let mut config = AppConfig::default();
    config.database.url = format!("sqlite://{}", db_path.display());
    config.database.max_connections = 1;

    let runtime = OfflineRuntime::open(&config).await.unwrap();
    let queue = runtime.queue();
    let interrupted = queue
        .enqueue(draft(OperationType::Create, "sales", 0))
        .await
        .unwrap();
    let untouched = queue
        .enqueue(draft(OperationType::Update, "sales", 0))
        .await
        .unwrap();
    assert!(queue.claim(&interrupted.id).await.unwrap());
    assert_eq!(queue.stats().await.unwrap().processing, 1);
    runtime.close().await;

    let reopened = OfflineRuntime::open(&config).await.unwrap();
    let stats = reopened.queue().stats().await.unwrap();
    assert_eq!(stats.processing, 0);
    assert_eq!(stats.pending, 2);

    let batch = reopened.queue().next_batch().await.unwrap();
    let ids: Vec<_> = batch.iter().map(|op| op.id.clone()).collect();
    assert_eq!(ids, vec![interrupted.id, untouched.id]);
    reopened.close().await;
}
