use thiserror::Error;

use crate::{
    db_types::{Order, OrderId, ShopId},
    sync::OrderPatch,
    traits::{AggregateKind, DirectoryManagement},
};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Could not encode or decode an embedded document: {0}")]
    DocumentEncoding(String),
    #[error("Order id {0} is already taken")]
    DuplicateOrderId(OrderId),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Shop {0} does not exist")]
    ShopNotFound(ShopId),
    #[error("Admin {0} does not exist")]
    AdminNotFound(String),
    #[error("Admin {0} has no shop document to embed orders into")]
    AdminShopMissing(String),
    #[error("Customer {0} does not exist")]
    CustomerNotFound(String),
    #[error("Notification {0} does not exist")]
    NotificationNotFound(i64),
    #[error("Order {order_id} is at version {actual}, but version {expected} was expected")]
    VersionConflict { order_id: OrderId, expected: i64, actual: i64 },
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::DocumentEncoding(e.to_string())
    }
}

/// The storage contract for canonical orders and their embedded copies.
///
/// The canonical `orders` collection is the source of truth. Each aggregate in [`AggregateKind`] holds
/// denormalized copies of the same [`Order`] document; the methods below let the synchronizer keep the
/// copies aligned without knowing how a backend lays its documents out.
#[allow(async_fn_in_trait)]
pub trait EntityStore: Clone + DirectoryManagement {
    /// The URL of the database this store is connected to.
    fn url(&self) -> &str;

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// Inserts a brand-new canonical order and returns the stored record, with its assigned record id.
    /// Fails with [`StoreError::DuplicateOrderId`] if the order id is already taken.
    async fn insert_order(&self, order: Order) -> Result<Order, StoreError>;

    /// Applies `patch` to the canonical record and returns the patched order.
    ///
    /// When `expected_version` is given, the write only proceeds if the stored version still matches;
    /// otherwise [`StoreError::VersionConflict`] reports the version actually found.
    async fn apply_patch_to_canonical(
        &self,
        order_id: &OrderId,
        patch: &OrderPatch,
        expected_version: Option<i64>,
    ) -> Result<Order, StoreError>;

    /// Applies `patch` to every copy of the order embedded in `kind` documents, matching copies by the
    /// canonical record id. Returns the number of owning documents rewritten.
    async fn patch_embedded_orders(&self, kind: AggregateKind, order_ref: i64, patch: &OrderPatch)
        -> Result<u64, StoreError>;

    /// Embeds a copy of `order` into the `kind` document owned by `owner_id` (a shop, admin or customer
    /// public id). Replaces an existing copy with the same record id.
    async fn embed_order(&self, kind: AggregateKind, owner_id: &str, order: &Order) -> Result<(), StoreError>;

    /// Strips every embedded copy of the order from `kind` documents. Returns the number of owning
    /// documents rewritten.
    async fn remove_embedded_orders(&self, kind: AggregateKind, order_ref: i64) -> Result<u64, StoreError>;

    /// Deletes the canonical order record. Embedded copies are untouched; callers remove those first.
    async fn delete_order(&self, order_id: &OrderId) -> Result<(), StoreError>;
}
