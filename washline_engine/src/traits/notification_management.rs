use crate::{
    db_types::{NewNotification, Notification, Recipient},
    traits::StoreError,
};

/// Storage for the persistent notification log.
#[allow(async_fn_in_trait)]
pub trait NotificationManagement: Clone {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, StoreError>;

    /// Marks a single notification as read. Returns `None` if no notification has that id.
    async fn mark_notification_read(&self, id: i64) -> Result<Option<Notification>, StoreError>;

    /// Marks every unread notification for `recipient` as read and returns how many were flipped.
    async fn mark_all_notifications_read(&self, recipient: &Recipient) -> Result<u64, StoreError>;

    /// Fetches notifications for `recipient`, newest first. `only_unread` restricts the result to
    /// notifications that have not been marked read.
    async fn fetch_notifications(&self, recipient: &Recipient, only_unread: bool)
        -> Result<Vec<Notification>, StoreError>;
}
