//! The admin side of recipient resolution, across every generation of stored order shape: a plain
//! shop id, a shop record id or public id left in the raw `shop` field, and orders with no shop
//! reference at all that can only be claimed through an embedded copy.

mod support;

use chrono::Utc;
use support::{
    prepare_env::{prepare_test_env, random_db_path},
    publishers::CapturePublisher,
    seed::{basic_order, seed_directory, ADMIN_ID},
};
use washline_engine::{
    db_types::{NewAdmin, NewShop, Order, OrderId, OrderStatus, Recipient},
    order_objects::EngineWarning,
    resolver,
    AggregateKind,
    DirectoryManagement,
    EntityStore,
    OrderFlowApi,
    ResolveError,
    SqliteStore,
};

/// Stores an order the way the oldest records look: no `shop_id`, just whatever the raw shop field
/// held at the time.
async fn legacy_order(db: &SqliteStore, order_id: &str, legacy_shop: Option<&str>) -> Order {
    let mut order = Order::place(basic_order(), OrderId::from(order_id), Utc::now());
    order.shop_id = None;
    order.legacy_shop = legacy_shop.map(String::from);
    db.insert_order(order).await.expect("Error inserting order")
}

#[tokio::test]
async fn a_current_order_resolves_through_its_shop_id() {
    let db = prepare_test_env(&random_db_path()).await;
    seed_directory(&db).await;

    let order = Order::place(basic_order(), OrderId::from("WL-20240101-000001"), Utc::now());
    let order = db.insert_order(order).await.unwrap();
    let admin = resolver::admin_for_order(&db, &order, true).await.unwrap();
    assert_eq!(admin.admin_id, ADMIN_ID);
}

#[tokio::test]
async fn a_shop_record_id_reference_resolves_through_the_shop_table() {
    let db = prepare_test_env(&random_db_path()).await;
    let (shop, ..) = seed_directory(&db).await;

    let order = legacy_order(&db, "WL-20220101-000001", Some(&shop.id.to_string())).await;
    let admin = resolver::admin_for_order(&db, &order, true).await.unwrap();
    assert_eq!(admin.admin_id, ADMIN_ID);
}

#[tokio::test]
async fn a_raw_public_shop_id_still_resolves() {
    let db = prepare_test_env(&random_db_path()).await;
    seed_directory(&db).await;

    let order = legacy_order(&db, "WL-20230101-000001", Some("s1")).await;
    let admin = resolver::admin_for_order(&db, &order, true).await.unwrap();
    assert_eq!(admin.admin_id, ADMIN_ID);
}

#[tokio::test]
async fn an_unreferenced_order_is_claimed_through_its_embedded_copy() {
    let db = prepare_test_env(&random_db_path()).await;
    seed_directory(&db).await;

    let order = legacy_order(&db, "WL-20210101-000001", None).await;
    // Without a copy anywhere, nothing claims the order.
    let err = resolver::admin_for_order(&db, &order, true).await.unwrap_err();
    assert!(matches!(err, ResolveError::AdminNotFound(id) if id == order.order_id));

    db.embed_order(AggregateKind::Admins, ADMIN_ID, &order).await.unwrap();
    let admin = resolver::admin_for_order(&db, &order, true).await.unwrap();
    assert_eq!(admin.admin_id, ADMIN_ID);
}

#[tokio::test]
async fn the_most_specific_reference_wins() {
    let db = prepare_test_env(&random_db_path()).await;
    seed_directory(&db).await;
    db.insert_shop(NewShop::new("s2", "Washline Makati", "88 Ayala Ave, Makati")).await.unwrap();
    db.insert_admin(NewAdmin::new("a2", "Ben Cruz", "s2")).await.unwrap();

    // The raw field points at the second shop, but the plain shop_id is still authoritative.
    let mut order = Order::place(basic_order(), OrderId::from("WL-20240101-000002"), Utc::now());
    order.legacy_shop = Some("s2".into());
    let order = db.insert_order(order).await.unwrap();
    let admin = resolver::admin_for_order(&db, &order, true).await.unwrap();
    assert_eq!(admin.admin_id, ADMIN_ID);
}

#[tokio::test]
async fn legacy_fallbacks_can_be_switched_off() {
    let db = prepare_test_env(&random_db_path()).await;
    seed_directory(&db).await;

    let order = legacy_order(&db, "WL-20220101-000002", Some("s1")).await;
    assert!(resolver::admin_for_order(&db, &order, true).await.is_ok());
    let err = resolver::admin_for_order(&db, &order, false).await.unwrap_err();
    assert!(matches!(err, ResolveError::AdminNotFound(id) if id == order.order_id));
}

#[tokio::test]
async fn an_unresolvable_order_warns_instead_of_failing() {
    let db = prepare_test_env(&random_db_path()).await;
    seed_directory(&db).await;
    let publisher = CapturePublisher::new();
    let api = OrderFlowApi::new(db.clone(), publisher.clone(), true);

    let order = legacy_order(&db, "WL-20200101-000001", None).await;
    let update = api.update_order_status(&order.order_id, OrderStatus::Confirmed).await.unwrap();
    assert_eq!(update.order.order_status, OrderStatus::Confirmed);
    assert!(update
        .warnings
        .iter()
        .any(|w| matches!(w, EngineWarning::AdminUnresolved { order_id } if *order_id == order.order_id)));

    // The customer was still told on their side; no admin channel was touched.
    assert_eq!(publisher.count_for("private-client-c1", "update-order-status"), 1);
    assert_eq!(publisher.count_for("private-client-c1", "new-notification"), 1);
    assert!(publisher.records().iter().all(|(channel, ..)| !channel.starts_with("private-admin")));
    assert!(api.notifications_for(&Recipient::admin(ADMIN_ID), false).await.unwrap().is_empty());
}
