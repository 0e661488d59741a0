use log::{debug, warn};

use crate::{
    api::errors::DispatchError,
    db_types::{NewNotification, Notification, OrderId, Recipient},
    events::naming,
    traits::{EventPublisher, NotificationManagement, StoreError},
};

/// Persists notifications and announces each one on its recipient's private channel.
#[derive(Clone)]
pub struct NotificationApi<B, P> {
    db: B,
    publisher: P,
}

impl<B, P> NotificationApi<B, P>
where
    B: NotificationManagement,
    P: EventPublisher,
{
    pub fn new(db: B, publisher: P) -> Self {
        Self { db, publisher }
    }

    /// Saves a notification for `recipient` and publishes `new-notification` on their channel.
    ///
    /// The save is the commit point. If the announcement fails, the already-persisted record comes back
    /// inside [`DispatchError::Publish`], so callers can treat the failure as "saved but not pushed"
    /// rather than rolling anything back.
    pub async fn notify(
        &self,
        recipient: Recipient,
        message: impl Into<String>,
        related_order_id: Option<OrderId>,
        is_reminder: bool,
    ) -> Result<Notification, DispatchError> {
        let notification = self
            .db
            .insert_notification(NewNotification {
                message: message.into(),
                recipient: recipient.clone(),
                related_order_id,
                is_reminder,
            })
            .await?;
        debug!("📬️ Notification {} saved for {recipient}", notification.id);
        let channel = naming::channel_for(&recipient);
        let payload = serde_json::to_value(&notification).map_err(StoreError::from)?;
        if let Err(source) = self.publisher.publish(&channel, naming::NEW_NOTIFICATION, payload).await {
            warn!("📬️ Notification {} was saved, but announcing it on {channel} failed: {source}", notification.id);
            return Err(DispatchError::Publish { notification, channel, source });
        }
        Ok(notification)
    }

    pub async fn mark_read(&self, id: i64) -> Result<Notification, DispatchError> {
        let notification =
            self.db.mark_notification_read(id).await?.ok_or(DispatchError::NotificationNotFound(id))?;
        debug!("📬️ Notification {id} marked read");
        Ok(notification)
    }

    pub async fn mark_all_read(&self, recipient: &Recipient) -> Result<u64, DispatchError> {
        let count = self.db.mark_all_notifications_read(recipient).await?;
        debug!("📬️ Marked {count} notification(s) read for {recipient}");
        Ok(count)
    }

    pub async fn notifications_for(
        &self,
        recipient: &Recipient,
        only_unread: bool,
    ) -> Result<Vec<Notification>, DispatchError> {
        Ok(self.db.fetch_notifications(recipient, only_unread).await?)
    }
}

impl<B, P> std::fmt::Debug for NotificationApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NotificationApi")
    }
}
