//! `SqliteStore` is a concrete implementation of the engine's storage backend.
//!
//! Unsurprisingly, it uses SQLite, and implements all the storage traits defined in the [`crate::traits`]
//! module. Orders live in a canonical table with their list fields in JSON columns; the shop, admin and
//! customer documents carry their embedded order copies in JSON columns too, which keeps the
//! copy-maintenance queries in one dialect.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{copies, directory, new_pool, notifications, orders};
use crate::{
    db_types::{
        Admin,
        Customer,
        NewAdmin,
        NewCustomer,
        NewNotification,
        NewShop,
        Notification,
        Order,
        OrderId,
        Recipient,
        Shop,
        ShopId,
    },
    sync::OrderPatch,
    traits::{AggregateKind, DirectoryManagement, EntityStore, NotificationManagement, StoreError},
};

#[derive(Clone)]
pub struct SqliteStore {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteStore ({:?})", self.pool)
    }
}

impl SqliteStore {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl EntityStore for SqliteStore {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_order_id(order_id, &mut conn).await
    }

    async fn insert_order(&self, order: Order) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order {} saved with record id {}", order.order_id, order.id);
        Ok(order)
    }

    async fn apply_patch_to_canonical(
        &self,
        order_id: &OrderId,
        patch: &OrderPatch,
        expected_version: Option<i64>,
    ) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::apply_patch(order_id, patch, expected_version, &mut tx).await?;
        tx.commit().await?;
        trace!("🗃️ Canonical order {order_id} is at version {}", order.version);
        Ok(order)
    }

    async fn patch_embedded_orders(
        &self,
        kind: AggregateKind,
        order_ref: i64,
        patch: &OrderPatch,
    ) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let updated = copies::patch_embedded(kind, order_ref, patch, &mut tx).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn embed_order(&self, kind: AggregateKind, owner_id: &str, order: &Order) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        copies::embed_order(kind, owner_id, order, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn remove_embedded_orders(&self, kind: AggregateKind, order_ref: i64) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let updated = copies::remove_embedded(kind, order_ref, &mut tx).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_order(&self, order_id: &OrderId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let deleted = orders::delete_order(order_id, &mut tx).await?;
        tx.commit().await?;
        if deleted == 0 {
            return Err(StoreError::OrderNotFound(order_id.clone()));
        }
        debug!("🗃️ Canonical order {order_id} deleted");
        Ok(())
    }
}

impl DirectoryManagement for SqliteStore {
    async fn insert_shop(&self, shop: NewShop) -> Result<Shop, StoreError> {
        let mut tx = self.pool.begin().await?;
        let shop = directory::insert_shop(shop, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Shop {} registered", shop.shop_id);
        Ok(shop)
    }

    async fn insert_admin(&self, admin: NewAdmin) -> Result<Admin, StoreError> {
        let mut tx = self.pool.begin().await?;
        let admin = directory::insert_admin(admin, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Admin {} registered", admin.admin_id);
        Ok(admin)
    }

    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, StoreError> {
        let mut tx = self.pool.begin().await?;
        let customer = directory::insert_customer(customer, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Customer {} registered", customer.customer_id);
        Ok(customer)
    }

    async fn fetch_shop(&self, shop_id: &ShopId) -> Result<Option<Shop>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        directory::fetch_shop(shop_id, &mut conn).await
    }

    async fn fetch_shop_by_record_id(&self, id: i64) -> Result<Option<Shop>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        directory::fetch_shop_by_record_id(id, &mut conn).await
    }

    async fn fetch_admin(&self, admin_id: &str) -> Result<Option<Admin>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        directory::fetch_admin(admin_id, &mut conn).await
    }

    async fn fetch_admin_for_shop(&self, shop_id: &ShopId) -> Result<Option<Admin>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        directory::fetch_admin_for_shop(shop_id, &mut conn).await
    }

    async fn fetch_admin_with_order(&self, order_ref: i64) -> Result<Option<Admin>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        directory::fetch_admin_with_order(order_ref, &mut conn).await
    }

    async fn fetch_customer(&self, customer_id: &str) -> Result<Option<Customer>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        directory::fetch_customer(customer_id, &mut conn).await
    }
}

impl NotificationManagement for SqliteStore {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, StoreError> {
        let mut tx = self.pool.begin().await?;
        let notification = notifications::insert_notification(notification, &mut tx).await?;
        tx.commit().await?;
        Ok(notification)
    }

    async fn mark_notification_read(&self, id: i64) -> Result<Option<Notification>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let notification = notifications::mark_notification_read(id, &mut tx).await?;
        tx.commit().await?;
        Ok(notification)
    }

    async fn mark_all_notifications_read(&self, recipient: &Recipient) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let count = notifications::mark_all_read(recipient, &mut tx).await?;
        tx.commit().await?;
        Ok(count)
    }

    async fn fetch_notifications(
        &self,
        recipient: &Recipient,
        only_unread: bool,
    ) -> Result<Vec<Notification>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        notifications::fetch_for_recipient(recipient, only_unread, &mut conn).await
    }
}
