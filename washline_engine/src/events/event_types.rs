use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wl_common::{Money, Weight};

use crate::db_types::{Feedback, Order, OrderId, OrderStatus, PaymentProof, PaymentStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub order_id: OrderId,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub updated_at: DateTime<Utc>,
}

impl OrderStatusChangedEvent {
    pub fn new(order: &Order, old_status: OrderStatus) -> Self {
        Self {
            order_id: order.order_id.clone(),
            old_status,
            new_status: order.order_status,
            payment_status: order.payment_status,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPricingChangedEvent {
    pub order_id: OrderId,
    pub total_weight: Weight,
    pub total_price: Money,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl OrderPricingChangedEvent {
    pub fn new(order: &Order) -> Self {
        Self {
            order_id: order.order_id.clone(),
            total_weight: order.total_weight,
            total_price: order.total_price,
            notes: order.notes.clone(),
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackChangedEvent {
    pub order_id: OrderId,
    pub feedback: Feedback,
}

impl FeedbackChangedEvent {
    pub fn new(order: &Order, feedback: Feedback) -> Self {
        Self { order_id: order.order_id.clone(), feedback }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRemovedEvent {
    pub order_id: OrderId,
    pub feedback_id: String,
}

impl FeedbackRemovedEvent {
    pub fn new(order: &Order, feedback_id: impl Into<String>) -> Self {
        Self { order_id: order.order_id.clone(), feedback_id: feedback_id.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProofSubmittedEvent {
    pub order_id: OrderId,
    pub payment_id: String,
    pub amount_paid: Money,
    pub payment_method: String,
    pub submitted_at: DateTime<Utc>,
}

impl PaymentProofSubmittedEvent {
    pub fn new(order: &Order, proof: &PaymentProof) -> Self {
        Self {
            order_id: order.order_id.clone(),
            payment_id: proof.payment_id.clone(),
            amount_paid: proof.amount_paid,
            payment_method: proof.payment_method.clone(),
            submitted_at: order.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentVerdictEvent {
    pub order_id: OrderId,
    pub payment_id: String,
    pub payment_status: PaymentStatus,
    pub updated_at: DateTime<Utc>,
}

impl PaymentVerdictEvent {
    pub fn new(order: &Order, payment_id: impl Into<String>) -> Self {
        Self {
            order_id: order.order_id.clone(),
            payment_id: payment_id.into(),
            payment_status: order.payment_status,
            updated_at: order.updated_at,
        }
    }
}
