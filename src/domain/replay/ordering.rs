use crate::domain::entities::offline::PendingOperation;
use crate::domain::value_objects::offline::OperationId;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Point-in-time view of the queue used to plan a batch.
#[derive(Debug, Clone, Default)]
pub struct ReplaySnapshot {
    /// Records whose status is `pending`.
    pub pending: Vec<PendingOperation>,
    /// Every id still stored in the queue, regardless of status.
    pub present_ids: HashSet<OperationId>,
}

impl ReplaySnapshot {
    pub fn new(pending: Vec<PendingOperation>, present_ids: HashSet<OperationId>) -> Self {
        Self {
            pending,
            present_ids,
        }
    }

    /// A parent that is still stored blocks its dependent. Dangling parents do not.
    pub fn is_blocked(&self, operation: &PendingOperation) -> bool {
        match &operation.parent_id {
            Some(parent) => parent != &operation.id && self.present_ids.contains(parent),
            None => false,
        }
    }
}

/// Total replay order: priority desc, target (foundational first), type rank,
/// creation time, then id.
pub fn compare_for_replay(a: &PendingOperation, b: &PendingOperation) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.target.replay_cmp(&b.target))
        .then_with(|| a.op_type.replay_rank().cmp(&b.op_type.replay_rank()))
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Selects the eligible records of a snapshot and returns them in replay order.
pub fn plan_batch(snapshot: ReplaySnapshot) -> Vec<PendingOperation> {
    let mut eligible: Vec<PendingOperation> = snapshot
        .pending
        .iter()
        .filter(|operation| operation.is_pending() && !snapshot.is_blocked(operation))
        .cloned()
        .collect();

    eligible.sort_by(compare_for_replay);
    eligible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::offline::OperationDraft;
    use crate::domain::value_objects::offline::{
        OperationPayload, OperationStatus, OperationType, TargetCollection,
    };
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(ms).unwrap()
    }

    fn op(op_type: OperationType, target: &str, priority: i32, created_ms: i64) -> PendingOperation {
        let draft = OperationDraft::new(
            op_type,
            TargetCollection::new(target.to_string()).unwrap(),
            OperationPayload::new(json!({"t": created_ms})).unwrap(),
        )
        .with_priority(priority);
        PendingOperation::from_draft(draft, at(created_ms))
    }

    fn snapshot_of(ops: &[PendingOperation]) -> ReplaySnapshot {
        ReplaySnapshot::new(
            ops.to_vec(),
            ops.iter().map(|op| op.id.clone()).collect(),
        )
    }

    #[test]
    fn priority_dominates_then_type_rank() {
        let stock = op(OperationType::StockUpdate, "products", 0, 100);
        let create_product = op(OperationType::Create, "products", 0, 50);
        let create_sale = op(OperationType::Create, "sales", 1, 10);

        let batch = plan_batch(snapshot_of(&[
            stock.clone(),
            create_product.clone(),
            create_sale.clone(),
        ]));

        // 優先度が最上位、同一優先度・同一テーブル内では stock_update が create より先
        let ids: Vec<_> = batch.iter().map(|op| op.id.clone()).collect();
        assert_eq!(ids, vec![create_sale.id, stock.id, create_product.id]);
    }

    #[test]
    fn products_precede_other_targets_at_equal_priority() {
        let sale = op(OperationType::Create, "sales", 0, 1);
        let category = op(OperationType::Create, "categories", 0, 2);
        let product = op(OperationType::Create, "products", 0, 3);

        let batch = plan_batch(snapshot_of(&[sale.clone(), category.clone(), product.clone()]));
        let ids: Vec<_> = batch.iter().map(|op| op.id.clone()).collect();
        assert_eq!(ids, vec![product.id, category.id, sale.id]);
    }

    #[test]
    fn type_rank_then_fifo() {
        let delete = op(OperationType::Delete, "sales", 0, 1);
        let update = op(OperationType::Update, "sales", 0, 2);
        let create_late = op(OperationType::Create, "sales", 0, 9);
        let create_early = op(OperationType::Create, "sales", 0, 4);
        let stock = op(OperationType::StockUpdate, "sales", 0, 8);

        let batch = plan_batch(snapshot_of(&[
            delete.clone(),
            update.clone(),
            create_late.clone(),
            create_early.clone(),
            stock.clone(),
        ]));
        let ids: Vec<_> = batch.iter().map(|op| op.id.clone()).collect();
        assert_eq!(
            ids,
            vec![stock.id, create_early.id, create_late.id, update.id, delete.id]
        );
    }

    #[test]
    fn identical_keys_fall_back_to_id() {
        let mut a = op(OperationType::Update, "sales", 0, 5);
        let mut b = op(OperationType::Update, "sales", 0, 5);
        a.id = OperationId::new("aaa".into()).unwrap();
        b.id = OperationId::new("bbb".into()).unwrap();

        let forward = plan_batch(snapshot_of(&[a.clone(), b.clone()]));
        let backward = plan_batch(snapshot_of(&[b.clone(), a.clone()]));
        assert_eq!(forward, backward);
        assert_eq!(forward[0].id, a.id);
    }

    #[test]
    fn dependents_wait_for_present_parent() {
        let parent = op(OperationType::Create, "sales", 0, 1);
        let child = PendingOperation {
            parent_id: Some(parent.id.clone()),
            ..op(OperationType::Create, "sale_items", 5, 2)
        };

        let batch = plan_batch(snapshot_of(&[parent.clone(), child.clone()]));
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].id, parent.id);

        // 親が削除された後は子が対象になる
        let batch = plan_batch(snapshot_of(&[child.clone()]));
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].id, child.id);
    }

    #[test]
    fn failed_parent_still_blocks() {
        let mut parent = op(OperationType::Create, "sales", 0, 1);
        parent.status = OperationStatus::Error;
        parent.retry_count = 1;
        let child = PendingOperation {
            parent_id: Some(parent.id.clone()),
            ..op(OperationType::Create, "sale_items", 0, 2)
        };

        let snapshot = ReplaySnapshot::new(
            vec![child.clone()],
            [parent.id.clone(), child.id.clone()].into_iter().collect(),
        );
        assert!(plan_batch(snapshot).is_empty());
    }

    #[test]
    fn dangling_parent_is_ignored() {
        let child = PendingOperation {
            parent_id: Some(OperationId::new("gone".into()).unwrap()),
            ..op(OperationType::Update, "sales", 0, 1)
        };
        let batch = plan_batch(snapshot_of(&[child.clone()]));
        assert_eq!(batch, vec![child]);
    }

    #[test]
    fn non_pending_records_are_skipped() {
        let mut processing = op(OperationType::Create, "sales", 0, 1);
        processing.status = OperationStatus::Processing;
        let pending = op(OperationType::Create, "sales", 0, 2);

        let batch = plan_batch(snapshot_of(&[processing, pending.clone()]));
        assert_eq!(batch, vec![pending]);
    }
}
