//! Access to the canonical `orders` table.

use sqlx::SqliteConnection;

use crate::{
    db_types::{Order, OrderId},
    sync::OrderPatch,
    traits::StoreError,
};

pub async fn insert_order(order: Order, conn: &mut SqliteConnection) -> Result<Order, StoreError> {
    let services = serde_json::to_string(&order.services)?;
    let clothes = serde_json::to_string(&order.clothes)?;
    let feedbacks = serde_json::to_string(&order.feedbacks)?;
    let proof = order.proof_of_payment.as_ref().map(serde_json::to_string).transpose()?;
    let proof_history = serde_json::to_string(&order.proof_history)?;
    let inserted = sqlx::query_as::<_, Order>(
        r#"INSERT INTO orders (
            order_id, customer_id, shop_id, legacy_shop, order_type, order_status, payment_status,
            total_weight, total_price, notes, services, clothes, feedbacks, proof_of_payment,
            proof_history, pickup_date, date_placed, date_completed, updated_at, version
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
        RETURNING *"#,
    )
    .bind(&order.order_id)
    .bind(&order.customer_id)
    .bind(&order.shop_id)
    .bind(&order.legacy_shop)
    .bind(order.order_type)
    .bind(order.order_status)
    .bind(order.payment_status)
    .bind(order.total_weight)
    .bind(order.total_price)
    .bind(&order.notes)
    .bind(services)
    .bind(clothes)
    .bind(feedbacks)
    .bind(proof)
    .bind(proof_history)
    .bind(order.pickup_date)
    .bind(order.date_placed)
    .bind(order.date_completed)
    .bind(order.updated_at)
    .bind(order.version)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        if e.as_database_error().map(|de| de.is_unique_violation()).unwrap_or(false) {
            StoreError::DuplicateOrderId(order.order_id.clone())
        } else {
            StoreError::from(e)
        }
    })?;
    Ok(inserted)
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, StoreError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_id = $1")
        .bind(order_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(order)
}

/// Applies `patch` to the canonical record and returns the patched order.
///
/// The update is guarded on the version the order was read at, so a writer that raced us between the
/// read and the write surfaces as a [`StoreError::VersionConflict`] instead of silently clobbering the
/// other writer's fields.
pub async fn apply_patch(
    order_id: &OrderId,
    patch: &OrderPatch,
    expected_version: Option<i64>,
    conn: &mut SqliteConnection,
) -> Result<Order, StoreError> {
    let mut order = fetch_order_by_order_id(order_id, conn)
        .await?
        .ok_or_else(|| StoreError::OrderNotFound(order_id.clone()))?;
    if let Some(expected) = expected_version {
        if order.version != expected {
            return Err(StoreError::VersionConflict { order_id: order_id.clone(), expected, actual: order.version });
        }
    }
    let guard_version = order.version;
    patch.apply_to(&mut order);
    let feedbacks = serde_json::to_string(&order.feedbacks)?;
    let proof = order.proof_of_payment.as_ref().map(serde_json::to_string).transpose()?;
    let proof_history = serde_json::to_string(&order.proof_history)?;
    let result = sqlx::query(
        r#"UPDATE orders SET
            order_status = $1, payment_status = $2, total_weight = $3, total_price = $4, notes = $5,
            feedbacks = $6, proof_of_payment = $7, proof_history = $8, date_completed = $9,
            updated_at = $10, version = $11
        WHERE id = $12 AND version = $13"#,
    )
    .bind(order.order_status)
    .bind(order.payment_status)
    .bind(order.total_weight)
    .bind(order.total_price)
    .bind(&order.notes)
    .bind(feedbacks)
    .bind(proof)
    .bind(proof_history)
    .bind(order.date_completed)
    .bind(order.updated_at)
    .bind(order.version)
    .bind(order.id)
    .bind(guard_version)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return match fetch_order_by_order_id(order_id, conn).await? {
            Some(current) => Err(StoreError::VersionConflict {
                order_id: order_id.clone(),
                expected: guard_version,
                actual: current.version,
            }),
            None => Err(StoreError::OrderNotFound(order_id.clone())),
        };
    }
    Ok(order)
}

pub async fn delete_order(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<u64, StoreError> {
    let result = sqlx::query("DELETE FROM orders WHERE order_id = $1").bind(order_id).execute(&mut *conn).await?;
    Ok(result.rows_affected())
}
