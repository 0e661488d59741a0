use chrono::{DateTime, Utc};
use thiserror::Error;
use wl_common::{Money, Weight};

use crate::{
    api::errors::SyncError,
    db_types::{Feedback, NewFeedback, Order, OrderStatus, PaymentProof, PaymentStatus},
};

#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Price must not be negative, but {0} was given")]
    NegativePrice(Money),
    #[error("Weight must not be negative, but {0} was given")]
    NegativeWeight(Weight),
    #[error("Rating must be between 1 and 5, but {0} was given")]
    RatingOutOfRange(i32),
    #[error("Required field {0} is missing or empty")]
    MissingField(&'static str),
}

/// A requested change to an order. Mutations are validated and resolved against the canonical record
/// before anything is written; the result is an [`OrderPatch`] that every copy applies identically.
#[derive(Debug, Clone)]
pub enum OrderMutation {
    /// Move the order to a new fulfilment status. Cancelling an order whose payment has not completed
    /// also cancels the payment, and the first transition to `Completed` stamps `date_completed`.
    Status { new_status: OrderStatus },
    /// Replace the order's weight, price and notes. `notes: None` clears any existing notes.
    Pricing { total_weight: Weight, total_price: Money, notes: Option<String> },
    AddFeedback(NewFeedback),
    UpdateFeedback(NewFeedback),
    DeleteFeedback { feedback_id: String },
    /// Attach a proof of payment and move the payment to `ForReview`. A previously active proof with a
    /// different payment id is pushed into the order's proof history.
    SubmitProof(PaymentProof),
    /// Record the admin's verdict on the active proof: `Paid` if approved, `Failed` otherwise.
    ReviewProof { payment_id: String, approved: bool },
    /// Set the completion timestamp directly, without touching either status.
    Complete { date_completed: DateTime<Utc> },
}

impl OrderMutation {
    /// A short token naming the mutation, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderMutation::Status { .. } => "status",
            OrderMutation::Pricing { .. } => "pricing",
            OrderMutation::AddFeedback(_) => "add_feedback",
            OrderMutation::UpdateFeedback(_) => "update_feedback",
            OrderMutation::DeleteFeedback { .. } => "delete_feedback",
            OrderMutation::SubmitProof(_) => "submit_proof",
            OrderMutation::ReviewProof { .. } => "review_proof",
            OrderMutation::Complete { .. } => "complete",
        }
    }

    /// Field-level checks that need no database access.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            OrderMutation::Pricing { total_weight, total_price, .. } => {
                if total_price.is_negative() {
                    return Err(ValidationError::NegativePrice(*total_price));
                }
                if total_weight.is_negative() {
                    return Err(ValidationError::NegativeWeight(*total_weight));
                }
                Ok(())
            },
            OrderMutation::AddFeedback(f) | OrderMutation::UpdateFeedback(f) => {
                if f.feedback_id.trim().is_empty() {
                    return Err(ValidationError::MissingField("feedback_id"));
                }
                if !(1..=5).contains(&f.rating) {
                    return Err(ValidationError::RatingOutOfRange(f.rating));
                }
                Ok(())
            },
            OrderMutation::DeleteFeedback { feedback_id } => {
                if feedback_id.trim().is_empty() {
                    return Err(ValidationError::MissingField("feedback_id"));
                }
                Ok(())
            },
            OrderMutation::SubmitProof(proof) => {
                if proof.payment_id.trim().is_empty() {
                    return Err(ValidationError::MissingField("payment_id"));
                }
                if proof.amount_sent.is_negative() {
                    return Err(ValidationError::NegativePrice(proof.amount_sent));
                }
                if proof.amount_paid.is_negative() {
                    return Err(ValidationError::NegativePrice(proof.amount_paid));
                }
                Ok(())
            },
            OrderMutation::ReviewProof { payment_id, .. } => {
                if payment_id.trim().is_empty() {
                    return Err(ValidationError::MissingField("payment_id"));
                }
                Ok(())
            },
            OrderMutation::Status { .. } | OrderMutation::Complete { .. } => Ok(()),
        }
    }

    /// Resolves this mutation against the canonical pre-state into a concrete patch.
    ///
    /// This is where state-dependent rules live: the payment-cancellation cascade, the one-time
    /// completion stamp, duplicate-feedback rejection and the proof matching checks. The returned patch
    /// carries the next version number and the shared `updated_at` stamp.
    pub fn prepare(&self, order: &Order, now: DateTime<Utc>) -> Result<OrderPatch, SyncError> {
        let change = match self {
            OrderMutation::Status { new_status } => {
                let cancel_payment = *new_status == OrderStatus::Cancelled
                    && !matches!(order.payment_status, PaymentStatus::Paid | PaymentStatus::Cancelled);
                let payment_status = cancel_payment.then_some(PaymentStatus::Cancelled);
                let date_completed =
                    (*new_status == OrderStatus::Completed && order.date_completed.is_none()).then_some(now);
                FieldChange::Status { order_status: *new_status, payment_status, date_completed }
            },
            OrderMutation::Pricing { total_weight, total_price, notes } => FieldChange::Pricing {
                total_weight: *total_weight,
                total_price: *total_price,
                notes: notes.clone(),
            },
            OrderMutation::AddFeedback(f) => {
                if order.has_feedback(&f.feedback_id) {
                    return Err(SyncError::DuplicateFeedback {
                        order_id: order.order_id.clone(),
                        feedback_id: f.feedback_id.clone(),
                    });
                }
                FieldChange::UpsertFeedback(Feedback {
                    feedback_id: f.feedback_id.clone(),
                    customer_id: f.customer_id.clone(),
                    rating: f.rating,
                    comments: f.comments.clone(),
                    date_submitted: now,
                })
            },
            OrderMutation::UpdateFeedback(f) => {
                let existing = order.feedback(&f.feedback_id).ok_or_else(|| SyncError::FeedbackNotFound {
                    order_id: order.order_id.clone(),
                    feedback_id: f.feedback_id.clone(),
                })?;
                FieldChange::UpsertFeedback(Feedback {
                    feedback_id: f.feedback_id.clone(),
                    customer_id: f.customer_id.clone(),
                    rating: f.rating,
                    comments: f.comments.clone(),
                    date_submitted: existing.date_submitted,
                })
            },
            OrderMutation::DeleteFeedback { feedback_id } => {
                if !order.has_feedback(feedback_id) {
                    return Err(SyncError::FeedbackNotFound {
                        order_id: order.order_id.clone(),
                        feedback_id: feedback_id.clone(),
                    });
                }
                FieldChange::RemoveFeedback { feedback_id: feedback_id.clone() }
            },
            OrderMutation::SubmitProof(proof) => FieldChange::SubmitProof(proof.clone()),
            OrderMutation::ReviewProof { payment_id, approved } => {
                let active = order.active_proof().ok_or_else(|| SyncError::ProofNotFound {
                    order_id: order.order_id.clone(),
                    payment_id: payment_id.clone(),
                })?;
                if active.payment_id != *payment_id {
                    return Err(SyncError::ProofNotFound {
                        order_id: order.order_id.clone(),
                        payment_id: payment_id.clone(),
                    });
                }
                let payment_status = if *approved { PaymentStatus::Paid } else { PaymentStatus::Failed };
                FieldChange::PaymentVerdict { payment_status }
            },
            OrderMutation::Complete { date_completed } => FieldChange::Completed { date_completed: *date_completed },
        };
        Ok(OrderPatch { change, version: order.version + 1, updated_at: now })
    }
}

/// The resolved field changes a mutation makes, free of any state-dependent branching. Copies replaying
/// a `FieldChange` land on exactly the fields the canonical write landed on.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Status {
        order_status: OrderStatus,
        payment_status: Option<PaymentStatus>,
        date_completed: Option<DateTime<Utc>>,
    },
    Pricing {
        total_weight: Weight,
        total_price: Money,
        notes: Option<String>,
    },
    UpsertFeedback(Feedback),
    RemoveFeedback {
        feedback_id: String,
    },
    SubmitProof(PaymentProof),
    PaymentVerdict {
        payment_status: PaymentStatus,
    },
    Completed {
        date_completed: DateTime<Utc>,
    },
}

/// A fully resolved change, ready to apply to the canonical order and to each embedded copy.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPatch {
    pub change: FieldChange,
    /// The version the order is at once the patch is applied.
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl OrderPatch {
    pub fn apply_to(&self, order: &mut Order) {
        match &self.change {
            FieldChange::Status { order_status, payment_status, date_completed } => {
                order.order_status = *order_status;
                if let Some(payment_status) = payment_status {
                    order.payment_status = *payment_status;
                }
                if let Some(date_completed) = date_completed {
                    order.date_completed = Some(*date_completed);
                }
            },
            FieldChange::Pricing { total_weight, total_price, notes } => {
                order.total_weight = *total_weight;
                order.total_price = *total_price;
                order.notes = notes.clone();
            },
            FieldChange::UpsertFeedback(feedback) => {
                match order.feedbacks.iter_mut().find(|f| f.feedback_id == feedback.feedback_id) {
                    Some(existing) => *existing = feedback.clone(),
                    None => order.feedbacks.push(feedback.clone()),
                }
            },
            FieldChange::RemoveFeedback { feedback_id } => {
                order.feedbacks.retain(|f| f.feedback_id != *feedback_id);
            },
            FieldChange::SubmitProof(proof) => {
                if let Some(previous) = order.proof_of_payment.take() {
                    if previous.payment_id != proof.payment_id {
                        order.proof_history.push(previous);
                    }
                }
                order.proof_of_payment = Some(proof.clone());
                order.payment_status = PaymentStatus::ForReview;
            },
            FieldChange::PaymentVerdict { payment_status } => {
                order.payment_status = *payment_status;
            },
            FieldChange::Completed { date_completed } => {
                order.date_completed = Some(*date_completed);
            },
        }
        order.version = self.version;
        order.updated_at = self.updated_at;
    }
}
