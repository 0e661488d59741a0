//! The error taxonomy of the engine's public operations.
//!
//! Hard failures end up here. Soft failures (a copy that could not be patched, an event that could not
//! be delivered) do not; those ride along on successful results as
//! [`crate::order_objects::EngineWarning`]s, because the canonical write they follow has already
//! committed.

use thiserror::Error;

use crate::{
    db_types::{Notification, OrderId, ShopId},
    sync::{CopyFailure, ValidationError},
    traits::{PublishError, StoreError},
};

/// Why a mutation could not be applied to the canonical order.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Shop {0} does not exist")]
    ShopNotFound(ShopId),
    #[error("Customer {0} does not exist")]
    CustomerNotFound(String),
    #[error("Order {order_id} already has feedback {feedback_id}")]
    DuplicateFeedback { order_id: OrderId, feedback_id: String },
    #[error("Order {order_id} has no feedback {feedback_id}")]
    FeedbackNotFound { order_id: OrderId, feedback_id: String },
    #[error("Order {order_id} has no active payment proof {payment_id}")]
    ProofNotFound { order_id: OrderId, payment_id: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Order {order_id} is at version {actual}, but the mutation expected version {expected}")]
    Conflict { order_id: OrderId, expected: i64, actual: i64 },
    #[error("Order {order_id} was not removed because {} of its copies could not be stripped first", .failures.len())]
    IncompleteRemoval { order_id: OrderId, failures: Vec<CopyFailure> },
    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::OrderNotFound(id) => SyncError::OrderNotFound(id),
            StoreError::ShopNotFound(id) => SyncError::ShopNotFound(id),
            StoreError::CustomerNotFound(id) => SyncError::CustomerNotFound(id),
            StoreError::VersionConflict { order_id, expected, actual } => {
                SyncError::Conflict { order_id, expected, actual }
            },
            e => SyncError::Store(e),
        }
    }
}

/// Why a notification could not be handled.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The notification was saved, but announcing it on the recipient's channel failed. The persisted
    /// record rides along so callers can degrade to "saved but not pushed".
    #[error("Notification {} was saved but could not be announced on {channel}: {source}", .notification.id)]
    Publish {
        notification: Notification,
        channel: String,
        #[source]
        source: PublishError,
    },
    #[error("Notification {0} does not exist")]
    NotificationNotFound(i64),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Why no admin recipient could be resolved for an order.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("No admin could be resolved for order {0}")]
    AdminNotFound(OrderId),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// The top-level error for [`crate::OrderFlowApi`] operations.
#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
