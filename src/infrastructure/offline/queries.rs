pub(super) const INSERT_OPERATION: &str = r#"
    INSERT INTO pending_operations (
        id,
        op_type,
        target,
        payload,
        created_at,
        status,
        error_detail,
        retry_count,
        priority,
        parent_id,
        group_id,
        updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
"#;

pub(super) const SELECT_OPERATION_BY_ID: &str = r#"
    SELECT id, op_type, target, payload, created_at, status, error_detail,
           retry_count, priority, parent_id, group_id, updated_at
    FROM pending_operations
    WHERE id = ?1
"#;

pub(super) const DELETE_OPERATION: &str = r#"
    DELETE FROM pending_operations
    WHERE id = ?1
"#;

// 単一の UPDATE 文で retry_count を加算するため、同一 ID への同時更新でも取りこぼさない
pub(super) const UPDATE_OPERATION_STATUS: &str = r#"
    UPDATE pending_operations
    SET status = ?2,
        error_detail = CASE WHEN ?2 = 'error' THEN ?3 ELSE NULL END,
        retry_count = CASE WHEN ?2 = 'error' THEN retry_count + 1 ELSE 0 END,
        updated_at = ?4
    WHERE id = ?1
    RETURNING id, op_type, target, payload, created_at, status, error_detail,
              retry_count, priority, parent_id, group_id, updated_at
"#;

pub(super) const CLAIM_OPERATION: &str = r#"
    UPDATE pending_operations
    SET status = 'processing',
        error_detail = NULL,
        retry_count = 0,
        updated_at = ?2
    WHERE id = ?1 AND status = 'pending'
"#;

pub(super) const SELECT_OPERATIONS_FILTERED: &str = r#"
    SELECT id, op_type, target, payload, created_at, status, error_detail,
           retry_count, priority, parent_id, group_id, updated_at
    FROM pending_operations
    WHERE (?1 IS NULL OR status = ?1)
      AND (?2 IS NULL OR group_id = ?2)
      AND (?3 IS NULL OR updated_at < ?3)
    ORDER BY created_at ASC, id ASC
"#;

pub(super) const SELECT_PENDING_OPERATIONS: &str = r#"
    SELECT id, op_type, target, payload, created_at, status, error_detail,
           retry_count, priority, parent_id, group_id, updated_at
    FROM pending_operations
    WHERE status = 'pending'
"#;

pub(super) const SELECT_OPERATION_IDS: &str = r#"
    SELECT id FROM pending_operations
"#;

pub(super) const RECOVER_PROCESSING_OPERATIONS: &str = r#"
    UPDATE pending_operations
    SET status = 'pending',
        error_detail = NULL,
        retry_count = 0,
        updated_at = ?1
    WHERE status = 'processing'
"#;

pub(super) const SELECT_LATEST_CREATED_AT: &str = r#"
    SELECT MAX(created_at) FROM pending_operations
"#;

pub(super) const COUNT_OPERATIONS_BY_STATUS: &str = r#"
    SELECT status, COUNT(*) AS count
    FROM pending_operations
    GROUP BY status
"#;

/// Executed together inside one transaction.
pub(super) const CLEAR_ALL_DATA: [&str; 5] = [
    "DELETE FROM products",
    "DELETE FROM sales",
    "DELETE FROM sale_items",
    "DELETE FROM categories",
    "DELETE FROM pending_operations",
];

pub(super) const INSERT_REMINDER: &str = r#"
    INSERT INTO sale_reminders (id, sale_id, note, created_at, status)
    VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub(super) const SELECT_REMINDER_BY_ID: &str = r#"
    SELECT id, sale_id, note, created_at, status
    FROM sale_reminders
    WHERE id = ?1
"#;

pub(super) const SELECT_REMINDERS_BY_STATUS: &str = r#"
    SELECT id, sale_id, note, created_at, status
    FROM sale_reminders
    WHERE status = ?1
    ORDER BY created_at DESC, id ASC
"#;

pub(super) const UPDATE_REMINDER_STATUS: &str = r#"
    UPDATE sale_reminders
    SET status = ?2
    WHERE id = ?1
"#;
