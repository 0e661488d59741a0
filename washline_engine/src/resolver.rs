//! Works out who should be told about activity on an order.
//!
//! The customer side is trivial. The admin side is not, because the stored order shape has changed
//! over time: new orders carry a plain `shop_id`, while older records hold either a shop record id or
//! a public shop id in the raw `shop` field, and the very oldest carry no shop reference at all. The
//! resolver walks those generations from most to least specific and stops at the first admin it finds.

use log::debug;

use crate::{
    api::errors::ResolveError,
    db_types::{Admin, Order, ShopId},
    traits::DirectoryManagement,
};

/// Resolves the admin responsible for `order`.
///
/// The chain: the order's own `shop_id`; then, when `legacy_refs` is enabled, the raw shop reference
/// read first as a shop record id and then as a public shop id; and finally a scan for the admin whose
/// shop document already embeds a copy of the order. The result is deterministic for a fixed directory:
/// the first matching step always wins.
pub async fn admin_for_order<B>(db: &B, order: &Order, legacy_refs: bool) -> Result<Admin, ResolveError>
where B: DirectoryManagement {
    if let Some(shop_id) = &order.shop_id {
        if let Some(admin) = db.fetch_admin_for_shop(shop_id).await? {
            return Ok(admin);
        }
        debug!("🧭️ No admin owns shop {shop_id}, named by order {}", order.order_id);
    }
    if !legacy_refs {
        return Err(ResolveError::AdminNotFound(order.order_id.clone()));
    }
    // TODO: drop the legacy fallbacks once all stored orders carry a plain shop_id.
    if let Some(raw) = &order.legacy_shop {
        // The oldest records put the shop's record id in the shop field.
        if let Ok(record_id) = raw.parse::<i64>() {
            if let Some(shop) = db.fetch_shop_by_record_id(record_id).await? {
                if let Some(admin) = db.fetch_admin_for_shop(&shop.shop_id).await? {
                    debug!("🧭️ Resolved the admin for order {} via shop record id {record_id}", order.order_id);
                    return Ok(admin);
                }
            }
        }
        // A later generation stored the public shop id in the same field.
        let shop_id = ShopId::from(raw.as_str());
        if let Some(admin) = db.fetch_admin_for_shop(&shop_id).await? {
            debug!("🧭️ Resolved the admin for order {} via its raw shop reference", order.order_id);
            return Ok(admin);
        }
    }
    // Last resort: whichever admin already holds a copy of this order is responsible for it.
    if let Some(admin) = db.fetch_admin_with_order(order.id).await? {
        debug!("🧭️ Resolved the admin for order {} by scanning embedded copies", order.order_id);
        return Ok(admin);
    }
    Err(ResolveError::AdminNotFound(order.order_id.clone()))
}

/// The customer to notify about `order`. Exists for symmetry with [`admin_for_order`].
pub fn customer_for_order(order: &Order) -> &str {
    &order.customer_id
}
