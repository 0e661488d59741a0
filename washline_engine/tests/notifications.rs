//! The notification log and its delivery behavior: read flags, ordering, the saved-but-not-pushed
//! contract when the publisher is down, and end-to-end delivery through the in-process relay.

mod support;

use std::sync::{Arc, Mutex};

use chrono::{Duration, Local};
use support::{
    prepare_env::{prepare_test_env, random_db_path},
    publishers::{CapturePublisher, FailingPublisher},
    seed::{basic_order, seed_directory},
};
use washline_engine::{
    db_types::{OrderStatus, Recipient},
    events::{EventEnvelope, EventRelay, RelayHandler},
    order_objects::EngineWarning,
    DispatchError,
    OrderFlowApi,
    OrderFlowError,
};

#[tokio::test]
async fn read_flags_round_trip() {
    let db = prepare_test_env(&random_db_path()).await;
    seed_directory(&db).await;
    let api = OrderFlowApi::new(db.clone(), CapturePublisher::new(), true);
    let customer = Recipient::customer("c1");
    let admin = Recipient::admin("a1");

    let first = api.notifications().notify(customer.clone(), "Welcome to Washline", None, false).await.unwrap();
    api.notifications().notify(customer.clone(), "Your order is ready", None, false).await.unwrap();
    api.notifications().notify(admin.clone(), "A new order came in", None, false).await.unwrap();

    // Newest first, and only the recipient's own records.
    let inbox = api.notifications_for(&customer, false).await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert!(inbox[0].message.contains("ready"));
    assert!(inbox[1].message.contains("Welcome"));
    assert!(inbox.iter().all(|n| !n.read));

    let marked = api.mark_notification_read(first.id).await.unwrap();
    assert!(marked.read);
    let unread = api.notifications_for(&customer, true).await.unwrap();
    assert_eq!(unread.len(), 1);
    assert!(unread[0].message.contains("ready"));

    let err = api.mark_notification_read(9999).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::Dispatch(DispatchError::NotificationNotFound(9999))));

    let flipped = api.mark_all_notifications_read(&customer).await.unwrap();
    assert_eq!(flipped, 1);
    assert!(api.notifications_for(&customer, true).await.unwrap().is_empty());
    // The admin's inbox is untouched.
    assert_eq!(api.notifications_for(&admin, true).await.unwrap().len(), 1);
}

#[tokio::test]
async fn a_dead_publisher_degrades_to_saved_but_not_pushed() {
    let db = prepare_test_env(&random_db_path()).await;
    seed_directory(&db).await;
    let api = OrderFlowApi::new(db.clone(), FailingPublisher, true);
    let customer = Recipient::customer("c1");

    // Direct dispatch: the record is persisted and rides along inside the error.
    let err = api.notifications().notify(customer.clone(), "Hello", None, false).await.unwrap_err();
    let notification = match err {
        DispatchError::Publish { notification, .. } => notification,
        e => panic!("Expected a publish error, got {e}"),
    };
    let marked = api.mark_notification_read(notification.id).await.unwrap();
    assert!(marked.read);

    // Placement: the reminder is persisted and reported, with a warning instead of a failure.
    let mut new_order = basic_order();
    new_order.pickup_date = Some(Local::now().date_naive() + Duration::days(1));
    let placed = api.place_order(new_order).await.unwrap();
    assert!(placed.reminder.is_some());
    assert_eq!(placed.warnings.len(), 1);
    assert!(matches!(
        &placed.warnings[0],
        EngineWarning::NotificationNotDelivered { event, .. } if event == "new-notification"
    ));

    // A status update still lands everywhere; every undelivered announcement becomes a warning.
    let update = api.update_order_status(&placed.order.order_id, OrderStatus::Confirmed).await.unwrap();
    assert_eq!(update.order.order_status, OrderStatus::Confirmed);
    assert_eq!(update.warnings.len(), 4);
    let customer_inbox = api.notifications_for(&customer, false).await.unwrap();
    assert!(customer_inbox.iter().any(|n| n.message.contains("is now confirmed")));
    let admin_inbox = api.notifications_for(&Recipient::admin("a1"), false).await.unwrap();
    assert!(admin_inbox.iter().any(|n| n.message.contains("was moved to confirmed")));
}

#[tokio::test]
async fn the_relay_carries_events_from_the_api_to_the_handler() {
    let db = prepare_test_env(&random_db_path()).await;
    seed_directory(&db).await;

    let delivered = Arc::new(Mutex::new(Vec::<EventEnvelope>::new()));
    let sink = delivered.clone();
    let handler: RelayHandler = Arc::new(move |envelope: EventEnvelope| {
        let sink = sink.clone();
        Box::pin(async move {
            sink.lock().unwrap().push(envelope);
        }) as std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
    });
    let relay = EventRelay::new(16, handler);
    let api = OrderFlowApi::new(db.clone(), relay.publisher(), true);
    let relay_task = tokio::spawn(relay.start_relay());

    let placed = api.place_order(basic_order()).await.unwrap();
    api.update_order_status(&placed.order.order_id, OrderStatus::Confirmed).await.unwrap();

    // Dropping the API drops the last publisher, which shuts the relay down once the queue drains.
    drop(api);
    relay_task.await.unwrap();

    let delivered = delivered.lock().unwrap();
    let count = |event: &str| delivered.iter().filter(|e| e.event == event).count();
    assert_eq!(count("update-order-status"), 2);
    assert_eq!(count("new-notification"), 2);
    assert!(delivered.iter().any(|e| e.channel == "private-client-c1"));
    assert!(delivered.iter().any(|e| e.channel == "private-admin-a1"));
}
