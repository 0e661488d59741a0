//! Access to the notification log.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{NewNotification, Notification, Recipient},
    traits::StoreError,
};

pub async fn insert_notification(
    notification: NewNotification,
    conn: &mut SqliteConnection,
) -> Result<Notification, StoreError> {
    let inserted = sqlx::query_as::<_, Notification>(
        r#"INSERT INTO notifications (message, recipient_id, recipient_type, related_order_id, is_read, is_reminder, created_at)
        VALUES ($1, $2, $3, $4, 0, $5, $6) RETURNING *"#,
    )
    .bind(&notification.message)
    .bind(notification.recipient.id())
    .bind(notification.recipient.recipient_type())
    .bind(&notification.related_order_id)
    .bind(notification.is_reminder)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;
    Ok(inserted)
}

pub async fn mark_notification_read(id: i64, conn: &mut SqliteConnection) -> Result<Option<Notification>, StoreError> {
    let notification =
        sqlx::query_as::<_, Notification>("UPDATE notifications SET is_read = 1 WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(notification)
}

pub async fn mark_all_read(recipient: &Recipient, conn: &mut SqliteConnection) -> Result<u64, StoreError> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = 1 WHERE recipient_id = $1 AND recipient_type = $2 AND is_read = 0",
    )
    .bind(recipient.id())
    .bind(recipient.recipient_type())
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn fetch_for_recipient(
    recipient: &Recipient,
    only_unread: bool,
    conn: &mut SqliteConnection,
) -> Result<Vec<Notification>, StoreError> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM notifications WHERE recipient_id = ");
    builder.push_bind(recipient.id());
    builder.push(" AND recipient_type = ");
    builder.push_bind(recipient.recipient_type());
    if only_unread {
        builder.push(" AND is_read = 0");
    }
    builder.push(" ORDER BY created_at DESC, id DESC");
    let notifications = builder.build_query_as::<Notification>().fetch_all(&mut *conn).await?;
    Ok(notifications)
}
