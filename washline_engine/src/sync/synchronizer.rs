use std::fmt::Display;

use chrono::Utc;
use log::{debug, info, trace, warn};

use crate::{
    api::errors::SyncError,
    db_types::{Order, OrderId, ShopId},
    sync::{OrderMutation, OrderPatch},
    traits::{AggregateKind, EntityStore, StoreError},
};

/// A copy update that did not land. The canonical write has already committed when one of these is
/// produced, so they are reported as warnings rather than failing the operation.
#[derive(Debug, Clone)]
pub struct CopyFailure {
    pub aggregate: AggregateKind,
    pub error: StoreError,
}

impl Display for CopyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not update the {} copies: {}", self.aggregate, self.error)
    }
}

/// What a successful mutation produced: the canonical record before and after, plus any copies that
/// could not be brought along.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub old_order: Order,
    pub order: Order,
    pub copy_failures: Vec<CopyFailure>,
}

/// Applies order mutations to the canonical record and replays the resulting patch onto every embedded
/// copy.
///
/// The canonical write is the commit point. Copy propagation runs afterwards, one aggregate at a time
/// since SQLite admits a single writer anyway. Individual copy failures never roll the canonical write
/// back; they are returned in [`SyncOutcome::copy_failures`] for the caller to surface.
#[derive(Clone)]
pub struct Synchronizer<B> {
    db: B,
}

impl<B> Synchronizer<B>
where B: EntityStore
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Applies `mutation` to the order, last write wins.
    pub async fn apply_order_mutation(
        &self,
        order_id: &OrderId,
        mutation: OrderMutation,
    ) -> Result<SyncOutcome, SyncError> {
        self.apply(order_id, mutation, None).await
    }

    /// As [`Self::apply_order_mutation`], but refuses to write unless the canonical order is still at
    /// `expected_version`.
    pub async fn apply_order_mutation_checked(
        &self,
        order_id: &OrderId,
        mutation: OrderMutation,
        expected_version: i64,
    ) -> Result<SyncOutcome, SyncError> {
        self.apply(order_id, mutation, Some(expected_version)).await
    }

    async fn apply(
        &self,
        order_id: &OrderId,
        mutation: OrderMutation,
        expected_version: Option<i64>,
    ) -> Result<SyncOutcome, SyncError> {
        mutation.validate()?;
        let old_order = self
            .db
            .fetch_order(order_id)
            .await
            .map_err(SyncError::from)?
            .ok_or_else(|| SyncError::OrderNotFound(order_id.clone()))?;
        if let Some(expected) = expected_version {
            if old_order.version != expected {
                return Err(SyncError::Conflict {
                    order_id: order_id.clone(),
                    expected,
                    actual: old_order.version,
                });
            }
        }
        let patch = mutation.prepare(&old_order, Utc::now())?;
        let order =
            self.db.apply_patch_to_canonical(order_id, &patch, expected_version).await.map_err(SyncError::from)?;
        debug!("🔄️ Applied {} mutation to order {order_id}, now at version {}", mutation.kind(), order.version);
        let copy_failures = self.propagate(order_id, order.id, &patch).await;
        Ok(SyncOutcome { old_order, order, copy_failures })
    }

    async fn propagate(&self, order_id: &OrderId, order_ref: i64, patch: &OrderPatch) -> Vec<CopyFailure> {
        let mut failures = Vec::new();
        for kind in AggregateKind::ALL {
            match self.db.patch_embedded_orders(kind, order_ref, patch).await {
                Ok(n) => trace!("🔄️ Patched copies of order {order_id} in {n} {kind} document(s)"),
                Err(error) => {
                    warn!("🔄️ The {kind} copies of order {order_id} are out of sync: {error}");
                    failures.push(CopyFailure { aggregate: kind, error });
                },
            }
        }
        failures
    }

    /// Embeds a freshly placed order into its shop, its customer, and (when one was resolved) the
    /// admin's shop document. Failures come back as warnings.
    pub async fn embed_new_order(
        &self,
        order: &Order,
        shop_id: &ShopId,
        customer_id: &str,
        admin_id: Option<&str>,
    ) -> Vec<CopyFailure> {
        let mut targets = vec![(AggregateKind::Shops, shop_id.as_str()), (AggregateKind::Customers, customer_id)];
        if let Some(admin_id) = admin_id {
            targets.push((AggregateKind::Admins, admin_id));
        }
        let mut failures = Vec::new();
        for (kind, owner) in targets {
            match self.db.embed_order(kind, owner, order).await {
                Ok(()) => trace!("🔄️ Embedded order {} into {kind} document {owner}", order.order_id),
                Err(error) => {
                    warn!("🔄️ Could not embed order {} into {kind} document {owner}: {error}", order.order_id);
                    failures.push(CopyFailure { aggregate: kind, error });
                },
            }
        }
        failures
    }

    /// Removes an order outright: first every embedded copy, then the canonical record.
    ///
    /// The order matters. If any copy cannot be stripped, the canonical record is left in place and
    /// [`SyncError::IncompleteRemoval`] is returned, so a retry can finish the job; no copy is ever
    /// left pointing at a canonical record that no longer exists.
    pub async fn remove_order_everywhere(&self, order_id: &OrderId) -> Result<Order, SyncError> {
        let order = self
            .db
            .fetch_order(order_id)
            .await
            .map_err(SyncError::from)?
            .ok_or_else(|| SyncError::OrderNotFound(order_id.clone()))?;
        let mut failures = Vec::new();
        for kind in AggregateKind::ALL {
            match self.db.remove_embedded_orders(kind, order.id).await {
                Ok(n) => debug!("🔄️ Removed copies of order {order_id} from {n} {kind} document(s)"),
                Err(error) => failures.push(CopyFailure { aggregate: kind, error }),
            }
        }
        if !failures.is_empty() {
            return Err(SyncError::IncompleteRemoval { order_id: order_id.clone(), failures });
        }
        self.db.delete_order(order_id).await.map_err(SyncError::from)?;
        info!("🔄️ Order {order_id} removed, canonical record and all copies");
        Ok(order)
    }
}

impl<B> std::fmt::Debug for Synchronizer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Synchronizer")
    }
}
