//! The result and request objects the order flow API speaks in.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use wl_common::{Money, Weight};

use crate::{
    db_types::{Feedback, Notification, Order, OrderId, PaymentProof},
    sync::CopyFailure,
    traits::AggregateKind,
};

/// A soft failure attached to an otherwise successful operation. The canonical write committed; one of
/// the follow-on effects did not land.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineWarning {
    /// An embedded copy could not be patched and now trails the canonical record.
    CopyOutOfSync { aggregate: AggregateKind, detail: String },
    /// A notification or event could not be delivered on the recipient's channel.
    NotificationNotDelivered { channel: String, event: String, detail: String },
    /// No admin recipient could be resolved, so the shop side was not told.
    AdminUnresolved { order_id: OrderId },
}

impl From<CopyFailure> for EngineWarning {
    fn from(failure: CopyFailure) -> Self {
        EngineWarning::CopyOutOfSync { aggregate: failure.aggregate, detail: failure.error.to_string() }
    }
}

impl Display for EngineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineWarning::CopyOutOfSync { aggregate, detail } => {
                write!(f, "The {aggregate} copies are out of sync: {detail}")
            },
            EngineWarning::NotificationNotDelivered { channel, event, detail } => {
                write!(f, "Could not deliver {event} on {channel}: {detail}")
            },
            EngineWarning::AdminUnresolved { order_id } => {
                write!(f, "No admin could be resolved for order {order_id}")
            },
        }
    }
}

/// What [`crate::OrderFlowApi::place_order`] hands back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order: Order,
    /// The pickup reminder that was sent, when the order's pickup date is today or tomorrow.
    pub reminder: Option<Notification>,
    pub warnings: Vec<EngineWarning>,
}

/// The canonical order before and after a mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub old_order: Order,
    pub order: Order,
    pub warnings: Vec<EngineWarning>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingUpdate {
    pub total_weight: Weight,
    pub total_price: Money,
    /// Replaces the order's notes outright. `None` clears them.
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackOutcome {
    pub order: Order,
    /// The feedback as stored, with the engine-stamped submission date.
    pub feedback: Feedback,
    pub warnings: Vec<EngineWarning>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofOutcome {
    pub order: Order,
    /// The proof as stored on the order after submission.
    pub proof: PaymentProof,
    pub warnings: Vec<EngineWarning>,
}
