//! Maintenance of the order copies embedded in shop, admin and customer documents.
//!
//! Shops and customers carry their copies in an `orders` JSON array; admins carry a whole shop
//! document whose `orders` array holds theirs. Copies are matched on the canonical record id, never on
//! the human-facing order id.

use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Admin, Customer, Order, Shop},
    sync::OrderPatch,
    traits::{AggregateKind, StoreError},
};

const SHOPS_WITH_ORDER: &str = r#"SELECT id, orders FROM shops WHERE EXISTS (
    SELECT 1 FROM json_each(shops.orders) WHERE json_extract(json_each.value, '$.id') = $1
)"#;
const CUSTOMERS_WITH_ORDER: &str = r#"SELECT id, orders FROM customers WHERE EXISTS (
    SELECT 1 FROM json_each(customers.orders) WHERE json_extract(json_each.value, '$.id') = $1
)"#;
const ADMINS_WITH_ORDER: &str = r#"SELECT id, shop FROM admins WHERE shop IS NOT NULL AND EXISTS (
    SELECT 1 FROM json_each(admins.shop, '$.orders') WHERE json_extract(json_each.value, '$.id') = $1
)"#;

fn holders_sql(kind: AggregateKind) -> &'static str {
    match kind {
        AggregateKind::Shops => SHOPS_WITH_ORDER,
        AggregateKind::Customers => CUSTOMERS_WITH_ORDER,
        AggregateKind::Admins => ADMINS_WITH_ORDER,
    }
}

/// Replays `patch` onto every copy of the order embedded in `kind` documents. Returns how many owning
/// documents were rewritten.
pub async fn patch_embedded(
    kind: AggregateKind,
    order_ref: i64,
    patch: &OrderPatch,
    conn: &mut SqliteConnection,
) -> Result<u64, StoreError> {
    let holders: Vec<(i64, String)> =
        sqlx::query_as(holders_sql(kind)).bind(order_ref).fetch_all(&mut *conn).await?;
    let mut updated = 0;
    for (doc_id, raw) in holders {
        let doc = match kind {
            AggregateKind::Admins => {
                let mut shop: Shop = serde_json::from_str(&raw)?;
                patch_order_list(&mut shop.orders, order_ref, patch)
                    .then(|| serde_json::to_string(&shop))
                    .transpose()?
            },
            _ => {
                let mut orders: Vec<Order> = serde_json::from_str(&raw)?;
                patch_order_list(&mut orders, order_ref, patch)
                    .then(|| serde_json::to_string(&orders))
                    .transpose()?
            },
        };
        if let Some(doc) = doc {
            write_doc(kind, doc_id, &doc, conn).await?;
            updated += 1;
        }
    }
    trace!("🗃️ Patched copies of order ref {order_ref} in {updated} {kind} document(s)");
    Ok(updated)
}

fn patch_order_list(orders: &mut [Order], order_ref: i64, patch: &OrderPatch) -> bool {
    let mut changed = false;
    for order in orders.iter_mut().filter(|o| o.id == order_ref) {
        patch.apply_to(order);
        changed = true;
    }
    changed
}

/// Embeds a copy of `order` into the `kind` document owned by `owner_id`, replacing any existing copy
/// with the same record id.
pub async fn embed_order(
    kind: AggregateKind,
    owner_id: &str,
    order: &Order,
    conn: &mut SqliteConnection,
) -> Result<(), StoreError> {
    match kind {
        AggregateKind::Shops => {
            let shop: Shop = sqlx::query_as("SELECT * FROM shops WHERE shop_id = $1")
                .bind(owner_id)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or_else(|| StoreError::ShopNotFound(owner_id.into()))?;
            let mut orders = shop.orders;
            upsert_order(&mut orders, order);
            let doc = serde_json::to_string(&orders)?;
            write_doc(kind, shop.id, &doc, conn).await?;
        },
        AggregateKind::Customers => {
            let customer: Customer = sqlx::query_as("SELECT * FROM customers WHERE customer_id = $1")
                .bind(owner_id)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or_else(|| StoreError::CustomerNotFound(owner_id.to_string()))?;
            let mut orders = customer.orders;
            upsert_order(&mut orders, order);
            let doc = serde_json::to_string(&orders)?;
            write_doc(kind, customer.id, &doc, conn).await?;
        },
        AggregateKind::Admins => {
            let admin: Admin = sqlx::query_as("SELECT * FROM admins WHERE admin_id = $1")
                .bind(owner_id)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or_else(|| StoreError::AdminNotFound(owner_id.to_string()))?;
            let Admin { id, admin_id, shop, .. } = admin;
            let mut shop = shop.ok_or(StoreError::AdminShopMissing(admin_id))?;
            upsert_order(&mut shop.orders, order);
            let doc = serde_json::to_string(&shop)?;
            write_doc(kind, id, &doc, conn).await?;
        },
    }
    trace!("🗃️ Embedded order {} into the {kind} document of {owner_id}", order.order_id);
    Ok(())
}

fn upsert_order(orders: &mut Vec<Order>, order: &Order) {
    match orders.iter_mut().find(|o| o.id == order.id) {
        Some(existing) => *existing = order.clone(),
        None => orders.push(order.clone()),
    }
}

/// Strips every copy of the order from `kind` documents. Returns how many owning documents were
/// rewritten.
pub async fn remove_embedded(
    kind: AggregateKind,
    order_ref: i64,
    conn: &mut SqliteConnection,
) -> Result<u64, StoreError> {
    let holders: Vec<(i64, String)> =
        sqlx::query_as(holders_sql(kind)).bind(order_ref).fetch_all(&mut *conn).await?;
    let mut updated = 0;
    for (doc_id, raw) in holders {
        let doc = match kind {
            AggregateKind::Admins => {
                let mut shop: Shop = serde_json::from_str(&raw)?;
                shop.orders.retain(|o| o.id != order_ref);
                serde_json::to_string(&shop)?
            },
            _ => {
                let mut orders: Vec<Order> = serde_json::from_str(&raw)?;
                orders.retain(|o| o.id != order_ref);
                serde_json::to_string(&orders)?
            },
        };
        write_doc(kind, doc_id, &doc, conn).await?;
        updated += 1;
    }
    trace!("🗃️ Removed copies of order ref {order_ref} from {updated} {kind} document(s)");
    Ok(updated)
}

async fn write_doc(
    kind: AggregateKind,
    doc_id: i64,
    doc: &str,
    conn: &mut SqliteConnection,
) -> Result<(), StoreError> {
    let sql = match kind {
        AggregateKind::Shops => "UPDATE shops SET orders = $1 WHERE id = $2",
        AggregateKind::Customers => "UPDATE customers SET orders = $1 WHERE id = $2",
        AggregateKind::Admins => "UPDATE admins SET shop = $1 WHERE id = $2",
    };
    sqlx::query(sql).bind(doc).bind(doc_id).execute(&mut *conn).await?;
    Ok(())
}
