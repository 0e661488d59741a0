use std::fmt::Debug;

use chrono::{DateTime, Local, Utc};
use futures_util::try_join;
use log::*;
use serde::Serialize;
use serde_json::Value;

use crate::{
    api::{
        errors::{DispatchError, OrderFlowError, SyncError},
        order_objects::{EngineWarning, FeedbackOutcome, OrderUpdate, PlacedOrder, PricingUpdate, ProofOutcome},
        NotificationApi,
    },
    db_types::{
        Admin,
        NewFeedback,
        NewOrder,
        Notification,
        Order,
        OrderId,
        OrderStatus,
        PaymentProof,
        Recipient,
    },
    events::{
        naming,
        FeedbackChangedEvent,
        FeedbackRemovedEvent,
        OrderPricingChangedEvent,
        OrderStatusChangedEvent,
        PaymentProofSubmittedEvent,
        PaymentVerdictEvent,
    },
    helpers::generate_order_id,
    reminders,
    resolver,
    sync::{OrderMutation, SyncOutcome, Synchronizer, ValidationError},
    traits::{EntityStore, EventPublisher, NotificationManagement, StoreError},
};

/// `OrderFlowApi` is the primary API for the order lifecycle: placing orders, mutating them with full
/// copy propagation, and telling the right people about it over notifications and real-time events.
pub struct OrderFlowApi<B, P> {
    db: B,
    publisher: P,
    notifications: NotificationApi<B, P>,
    synchronizer: Synchronizer<B>,
    legacy_shop_refs: bool,
}

impl<B, P> Debug for OrderFlowApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, P> OrderFlowApi<B, P>
where
    B: EntityStore + NotificationManagement,
    P: EventPublisher,
{
    /// How many random order ids are drawn before giving up on an insert.
    pub const MAX_ORDER_ID_ATTEMPTS: usize = 5;

    /// `legacy_shop_refs` enables the resolver's fallback chain for orders that predate the plain
    /// `shop_id` field. See [`crate::resolver::admin_for_order`].
    pub fn new(db: B, publisher: P, legacy_shop_refs: bool) -> Self {
        let notifications = NotificationApi::new(db.clone(), publisher.clone());
        let synchronizer = Synchronizer::new(db.clone());
        Self { db, publisher, notifications, synchronizer, legacy_shop_refs }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn notifications(&self) -> &NotificationApi<B, P> {
        &self.notifications
    }

    /// Place a brand-new order.
    ///
    /// The canonical record is written first, under a freshly drawn order id. Copies are then embedded
    /// into the shop, the customer, and (when one can be resolved) the admin's shop document, and a
    /// pickup reminder is sent if the pickup date is today or tomorrow. The reminder is the only thing
    /// announced at placement, and it goes to the customer's channel alone.
    ///
    /// The shop and customer must already exist; anything that goes wrong after the canonical insert is
    /// reported in [`PlacedOrder::warnings`] rather than failing the placement.
    pub async fn place_order(&self, new_order: NewOrder) -> Result<PlacedOrder, OrderFlowError> {
        validate_new_order(&new_order)?;
        let (shop, customer) =
            try_join!(self.db.fetch_shop(&new_order.shop_id), self.db.fetch_customer(&new_order.customer_id))
                .map_err(SyncError::from)?;
        let shop = shop.ok_or_else(|| SyncError::ShopNotFound(new_order.shop_id.clone()))?;
        let customer = customer.ok_or_else(|| SyncError::CustomerNotFound(new_order.customer_id.clone()))?;
        let order = self.insert_with_fresh_id(new_order).await?;
        info!("🧺️ Order {} placed by customer {} at shop {}", order.order_id, customer.customer_id, shop.shop_id);
        let mut warnings = Vec::new();
        let admin = self.resolve_admin(&order, &mut warnings).await;
        let admin_id = admin.as_ref().map(|a| a.admin_id.as_str());
        let copy_failures =
            self.synchronizer.embed_new_order(&order, &shop.shop_id, &customer.customer_id, admin_id).await;
        warnings.extend(copy_failures.into_iter().map(EngineWarning::from));
        let reminder = self.send_pickup_reminder(&order, &mut warnings).await;
        Ok(PlacedOrder { order, reminder, warnings })
    }

    /// Move an order to a new fulfilment status, last write wins.
    ///
    /// Both sides hear about it: `update-order-status` is published on the customer's and the admin's
    /// channels, and a notification record is written for each. Cancelling an order whose payment has
    /// not completed also cancels the payment, and the first move to `Completed` stamps
    /// `date_completed`.
    pub async fn update_order_status(
        &self,
        order_id: &OrderId,
        new_status: OrderStatus,
    ) -> Result<OrderUpdate, OrderFlowError> {
        self.change_status(order_id, new_status, None).await
    }

    /// As [`Self::update_order_status`], but fails with a conflict unless the canonical order is still
    /// at `expected_version`.
    pub async fn update_order_status_checked(
        &self,
        order_id: &OrderId,
        new_status: OrderStatus,
        expected_version: i64,
    ) -> Result<OrderUpdate, OrderFlowError> {
        self.change_status(order_id, new_status, Some(expected_version)).await
    }

    async fn change_status(
        &self,
        order_id: &OrderId,
        new_status: OrderStatus,
        expected_version: Option<i64>,
    ) -> Result<OrderUpdate, OrderFlowError> {
        let mutation = OrderMutation::Status { new_status };
        let outcome = match expected_version {
            Some(version) => self.synchronizer.apply_order_mutation_checked(order_id, mutation, version).await?,
            None => self.synchronizer.apply_order_mutation(order_id, mutation).await?,
        };
        let SyncOutcome { old_order, order, copy_failures } = outcome;
        let mut warnings: Vec<EngineWarning> = copy_failures.into_iter().map(EngineWarning::from).collect();
        info!("🧺️ Order {order_id} moved from {} to {}", old_order.order_status, order.order_status);
        let event = OrderStatusChangedEvent::new(&order, old_order.order_status);
        let payload = encode(&event)?;
        let customer = Recipient::customer(&order.customer_id);
        self.publish_or_warn(&customer, naming::UPDATE_ORDER_STATUS, payload.clone(), &mut warnings).await;
        let message = format!("Your order {} is now {}.", order.order_id, order.order_status);
        self.notify_or_warn(&customer, message, order_id, false, &mut warnings).await;
        if let Some(admin) = self.resolve_admin(&order, &mut warnings).await {
            let admin = Recipient::admin(&admin.admin_id);
            self.publish_or_warn(&admin, naming::UPDATE_ORDER_STATUS, payload, &mut warnings).await;
            let message = format!("Order {} was moved to {}.", order.order_id, order.order_status);
            self.notify_or_warn(&admin, message, order_id, false, &mut warnings).await;
        }
        Ok(OrderUpdate { old_order, order, warnings })
    }

    /// Replace an order's weight, price and notes.
    ///
    /// Pricing changes are announced in real time with `update-order-price` on the customer's channel
    /// and, when one can be resolved, the admin's. No notification record is written for them.
    pub async fn update_order_pricing(
        &self,
        order_id: &OrderId,
        pricing: PricingUpdate,
    ) -> Result<OrderUpdate, OrderFlowError> {
        let mutation = OrderMutation::Pricing {
            total_weight: pricing.total_weight,
            total_price: pricing.total_price,
            notes: pricing.notes,
        };
        let SyncOutcome { old_order, order, copy_failures } =
            self.synchronizer.apply_order_mutation(order_id, mutation).await?;
        let mut warnings: Vec<EngineWarning> = copy_failures.into_iter().map(EngineWarning::from).collect();
        info!("🧺️ Order {order_id} re-priced to {} for {}", order.total_price, order.total_weight);
        let event = OrderPricingChangedEvent::new(&order);
        let payload = encode(&event)?;
        let customer = Recipient::customer(&order.customer_id);
        self.publish_or_warn(&customer, naming::UPDATE_ORDER_PRICE, payload.clone(), &mut warnings).await;
        if let Some(admin) = self.resolve_admin(&order, &mut warnings).await {
            self.publish_or_warn(&Recipient::admin(&admin.admin_id), naming::UPDATE_ORDER_PRICE, payload, &mut warnings)
                .await;
        }
        Ok(OrderUpdate { old_order, order, warnings })
    }

    /// Attach customer feedback to an order. Fails if the order already has feedback with the same id.
    ///
    /// `new-feedback` is published on the admin's channel; the customer wrote it, so their side stays
    /// quiet.
    pub async fn add_feedback(
        &self,
        order_id: &OrderId,
        feedback: NewFeedback,
    ) -> Result<FeedbackOutcome, OrderFlowError> {
        let feedback_id = feedback.feedback_id.clone();
        self.feedback_op(order_id, feedback_id, OrderMutation::AddFeedback(feedback), naming::NEW_FEEDBACK).await
    }

    /// Revise existing feedback in place. The original submission date is kept; only the rating and
    /// comments move. `update-feedback` is published on the admin's channel.
    pub async fn update_feedback(
        &self,
        order_id: &OrderId,
        feedback: NewFeedback,
    ) -> Result<FeedbackOutcome, OrderFlowError> {
        let feedback_id = feedback.feedback_id.clone();
        self.feedback_op(order_id, feedback_id, OrderMutation::UpdateFeedback(feedback), naming::UPDATE_FEEDBACK)
            .await
    }

    async fn feedback_op(
        &self,
        order_id: &OrderId,
        feedback_id: String,
        mutation: OrderMutation,
        event_name: &'static str,
    ) -> Result<FeedbackOutcome, OrderFlowError> {
        let SyncOutcome { order, copy_failures, .. } =
            self.synchronizer.apply_order_mutation(order_id, mutation).await?;
        let mut warnings: Vec<EngineWarning> = copy_failures.into_iter().map(EngineWarning::from).collect();
        let feedback = order.feedback(&feedback_id).cloned().ok_or_else(|| SyncError::FeedbackNotFound {
            order_id: order_id.clone(),
            feedback_id: feedback_id.clone(),
        })?;
        info!("🧺️ Feedback {feedback_id} recorded on order {order_id}");
        if let Some(admin) = self.resolve_admin(&order, &mut warnings).await {
            let event = FeedbackChangedEvent::new(&order, feedback.clone());
            let payload = encode(&event)?;
            self.publish_or_warn(&Recipient::admin(&admin.admin_id), event_name, payload, &mut warnings).await;
        }
        Ok(FeedbackOutcome { order, feedback, warnings })
    }

    /// Remove feedback from an order. Fails with a not-found error, and changes nothing anywhere, if
    /// the order has no feedback with that id. `delete-feedback` is published on the admin's channel.
    pub async fn delete_feedback(
        &self,
        order_id: &OrderId,
        feedback_id: impl Into<String>,
    ) -> Result<OrderUpdate, OrderFlowError> {
        let feedback_id = feedback_id.into();
        let mutation = OrderMutation::DeleteFeedback { feedback_id: feedback_id.clone() };
        let SyncOutcome { old_order, order, copy_failures } =
            self.synchronizer.apply_order_mutation(order_id, mutation).await?;
        let mut warnings: Vec<EngineWarning> = copy_failures.into_iter().map(EngineWarning::from).collect();
        info!("🧺️ Feedback {feedback_id} removed from order {order_id}");
        if let Some(admin) = self.resolve_admin(&order, &mut warnings).await {
            let event = FeedbackRemovedEvent::new(&order, feedback_id);
            let payload = encode(&event)?;
            self.publish_or_warn(&Recipient::admin(&admin.admin_id), naming::DELETE_FEEDBACK, payload, &mut warnings)
                .await;
        }
        Ok(OrderUpdate { old_order, order, warnings })
    }

    /// Submit a proof of payment for an order.
    ///
    /// The payment moves to `ForReview`, and a proof that replaces a previous submission archives the
    /// old one in the order's proof history. The admin gets `update-payment-status-proof` on their
    /// channel plus a notification record asking them to review it.
    pub async fn add_payment_proof(
        &self,
        order_id: &OrderId,
        proof: PaymentProof,
    ) -> Result<ProofOutcome, OrderFlowError> {
        let payment_id = proof.payment_id.clone();
        let SyncOutcome { order, copy_failures, .. } =
            self.synchronizer.apply_order_mutation(order_id, OrderMutation::SubmitProof(proof)).await?;
        let mut warnings: Vec<EngineWarning> = copy_failures.into_iter().map(EngineWarning::from).collect();
        let proof = order.active_proof().cloned().ok_or_else(|| SyncError::ProofNotFound {
            order_id: order_id.clone(),
            payment_id: payment_id.clone(),
        })?;
        info!("🧺️ Payment proof {payment_id} submitted for order {order_id}; payment is {}", order.payment_status);
        if let Some(admin) = self.resolve_admin(&order, &mut warnings).await {
            let admin = Recipient::admin(&admin.admin_id);
            let event = PaymentProofSubmittedEvent::new(&order, &proof);
            let payload = encode(&event)?;
            self.publish_or_warn(&admin, naming::UPDATE_PAYMENT_STATUS_PROOF, payload, &mut warnings).await;
            let message =
                format!("Customer {} submitted a payment proof for order {}.", order.customer_id, order.order_id);
            self.notify_or_warn(&admin, message, order_id, false, &mut warnings).await;
        }
        Ok(ProofOutcome { order, proof, warnings })
    }

    /// Record the admin's verdict on an order's active payment proof: `Paid` when approved, `Failed`
    /// otherwise. The customer gets `update-payment-status` on their channel plus a notification with
    /// the outcome.
    pub async fn review_payment_proof(
        &self,
        order_id: &OrderId,
        payment_id: impl Into<String>,
        approved: bool,
    ) -> Result<OrderUpdate, OrderFlowError> {
        let payment_id = payment_id.into();
        let mutation = OrderMutation::ReviewProof { payment_id: payment_id.clone(), approved };
        let SyncOutcome { old_order, order, copy_failures } =
            self.synchronizer.apply_order_mutation(order_id, mutation).await?;
        let mut warnings: Vec<EngineWarning> = copy_failures.into_iter().map(EngineWarning::from).collect();
        info!(
            "🧺️ Payment {payment_id} on order {order_id} was {}",
            if approved { "approved" } else { "rejected" }
        );
        let customer = Recipient::customer(&order.customer_id);
        let event = PaymentVerdictEvent::new(&order, payment_id);
        let payload = encode(&event)?;
        self.publish_or_warn(&customer, naming::UPDATE_PAYMENT_STATUS, payload, &mut warnings).await;
        let message = if approved {
            format!("Payment for order {} has been confirmed. Thank you!", order.order_id)
        } else {
            format!("Payment for order {} could not be verified. Please submit a new proof of payment.", order.order_id)
        };
        self.notify_or_warn(&customer, message, order_id, false, &mut warnings).await;
        Ok(OrderUpdate { old_order, order, warnings })
    }

    /// Stamp the completion timestamp on an order without touching either status. Nothing is announced;
    /// use [`Self::update_order_status`] to move an order to `Completed` with announcements.
    pub async fn set_completion_date(
        &self,
        order_id: &OrderId,
        date_completed: DateTime<Utc>,
    ) -> Result<OrderUpdate, OrderFlowError> {
        let SyncOutcome { old_order, order, copy_failures } =
            self.synchronizer.apply_order_mutation(order_id, OrderMutation::Complete { date_completed }).await?;
        let warnings = copy_failures.into_iter().map(EngineWarning::from).collect();
        Ok(OrderUpdate { old_order, order, warnings })
    }

    /// Remove an order outright: every embedded copy first, then the canonical record.
    ///
    /// If any copy cannot be stripped, the canonical record stays and the whole call fails, so a retry
    /// can finish the job. Returns the order as it stood before removal.
    pub async fn delete_order(&self, order_id: &OrderId) -> Result<Order, OrderFlowError> {
        let order = self.synchronizer.remove_order_everywhere(order_id).await?;
        info!("🧺️ Order {order_id} removed everywhere");
        Ok(order)
    }

    pub async fn mark_notification_read(&self, id: i64) -> Result<Notification, OrderFlowError> {
        Ok(self.notifications.mark_read(id).await?)
    }

    pub async fn mark_all_notifications_read(&self, recipient: &Recipient) -> Result<u64, OrderFlowError> {
        Ok(self.notifications.mark_all_read(recipient).await?)
    }

    pub async fn notifications_for(
        &self,
        recipient: &Recipient,
        only_unread: bool,
    ) -> Result<Vec<Notification>, OrderFlowError> {
        Ok(self.notifications.notifications_for(recipient, only_unread).await?)
    }

    async fn insert_with_fresh_id(&self, new_order: NewOrder) -> Result<Order, SyncError> {
        let placed_at = Utc::now();
        for _ in 0..Self::MAX_ORDER_ID_ATTEMPTS {
            let order_id = generate_order_id(Local::now().date_naive());
            let order = Order::place(new_order.clone(), order_id, placed_at);
            match self.db.insert_order(order).await {
                Ok(order) => return Ok(order),
                Err(StoreError::DuplicateOrderId(order_id)) => {
                    debug!("🧺️ Order id {order_id} is already taken, drawing another");
                },
                Err(e) => return Err(SyncError::from(e)),
            }
        }
        Err(SyncError::Store(StoreError::DatabaseError(format!(
            "could not draw an unused order id in {} attempts",
            Self::MAX_ORDER_ID_ATTEMPTS
        ))))
    }

    async fn resolve_admin(&self, order: &Order, warnings: &mut Vec<EngineWarning>) -> Option<Admin> {
        match resolver::admin_for_order(&self.db, order, self.legacy_shop_refs).await {
            Ok(admin) => Some(admin),
            Err(e) => {
                warn!("🧺️ The shop side will not hear about order {}: {e}", order.order_id);
                warnings.push(EngineWarning::AdminUnresolved { order_id: order.order_id.clone() });
                None
            },
        }
    }

    async fn publish_or_warn(
        &self,
        recipient: &Recipient,
        event: &str,
        payload: Value,
        warnings: &mut Vec<EngineWarning>,
    ) {
        let channel = naming::channel_for(recipient);
        if let Err(e) = self.publisher.publish(&channel, event, payload).await {
            warn!("🧺️ Could not deliver {event} on {channel}: {e}");
            warnings.push(EngineWarning::NotificationNotDelivered {
                channel,
                event: event.to_string(),
                detail: e.to_string(),
            });
        }
    }

    async fn notify_or_warn(
        &self,
        recipient: &Recipient,
        message: String,
        order_id: &OrderId,
        is_reminder: bool,
        warnings: &mut Vec<EngineWarning>,
    ) -> Option<Notification> {
        match self.notifications.notify(recipient.clone(), message, Some(order_id.clone()), is_reminder).await {
            Ok(notification) => Some(notification),
            Err(DispatchError::Publish { notification, channel, source }) => {
                warnings.push(EngineWarning::NotificationNotDelivered {
                    channel,
                    event: naming::NEW_NOTIFICATION.to_string(),
                    detail: source.to_string(),
                });
                Some(notification)
            },
            Err(e) => {
                warn!("🧺️ Could not record a notification for {recipient} about order {order_id}: {e}");
                warnings.push(EngineWarning::NotificationNotDelivered {
                    channel: naming::channel_for(recipient),
                    event: naming::NEW_NOTIFICATION.to_string(),
                    detail: e.to_string(),
                });
                None
            },
        }
    }

    async fn send_pickup_reminder(
        &self,
        order: &Order,
        warnings: &mut Vec<EngineWarning>,
    ) -> Option<Notification> {
        let reminder = reminders::pickup_reminder(order, Local::now().date_naive())?;
        debug!("🧺️ Order {} is due for pickup {}", order.order_id, reminder.day);
        let customer = Recipient::customer(&order.customer_id);
        self.notify_or_warn(&customer, reminder.message, &order.order_id, true, warnings).await
    }
}

fn validate_new_order(order: &NewOrder) -> Result<(), ValidationError> {
    if order.customer_id.trim().is_empty() {
        return Err(ValidationError::MissingField("customer_id"));
    }
    if order.shop_id.as_str().trim().is_empty() {
        return Err(ValidationError::MissingField("shop_id"));
    }
    if order.total_price.is_negative() {
        return Err(ValidationError::NegativePrice(order.total_price));
    }
    if order.total_weight.is_negative() {
        return Err(ValidationError::NegativeWeight(order.total_weight));
    }
    Ok(())
}

fn encode<T: Serialize>(value: &T) -> Result<Value, SyncError> {
    serde_json::to_value(value).map_err(|e| SyncError::Store(StoreError::from(e)))
}
