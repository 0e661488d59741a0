//! Directory fixtures, input builders and copy probes shared by the integration tests.

use chrono::Utc;
use washline_engine::{
    db_types::{
        Admin,
        ClothingLine,
        Customer,
        NewAdmin,
        NewCustomer,
        NewFeedback,
        NewOrder,
        NewShop,
        Order,
        PaymentProof,
        ServiceLine,
        Shop,
        ShopId,
    },
    DirectoryManagement,
    SqliteStore,
};
use wl_common::{Money, Weight};

pub const SHOP_ID: &str = "s1";
pub const ADMIN_ID: &str = "a1";
pub const CUSTOMER_ID: &str = "c1";

/// One shop, its admin, and one customer: everything the order flow needs to run end to end.
pub async fn seed_directory(db: &SqliteStore) -> (Shop, Admin, Customer) {
    let shop = db
        .insert_shop(NewShop::new(SHOP_ID, "Washline Cubao", "742 Aurora Blvd, Quezon City"))
        .await
        .expect("Error inserting shop");
    let admin =
        db.insert_admin(NewAdmin::new(ADMIN_ID, "Alice Reyes", SHOP_ID)).await.expect("Error inserting admin");
    let customer =
        db.insert_customer(NewCustomer::new(CUSTOMER_ID, "Carlos Tan")).await.expect("Error inserting customer");
    (shop, admin, customer)
}

/// A 5kg wash-and-fold order for the seeded shop and customer.
pub fn basic_order() -> NewOrder {
    let mut order = NewOrder::new(CUSTOMER_ID, SHOP_ID);
    order.total_weight = Weight::from_kg(5);
    order.total_price = Money::from_pesos(350);
    order.services = vec![ServiceLine {
        service_id: "svc-wash-fold".to_string(),
        name: "Wash & Fold".to_string(),
        price: Money::from_pesos(350),
    }];
    order.clothes = vec![ClothingLine { clothing_type: "shirts".to_string(), quantity: 12 }];
    order
}

pub fn feedback(feedback_id: &str, rating: i32) -> NewFeedback {
    NewFeedback {
        feedback_id: feedback_id.to_string(),
        customer_id: CUSTOMER_ID.to_string(),
        rating,
        comments: "Clothes came back fresh and on time".to_string(),
    }
}

pub fn proof(payment_id: &str) -> PaymentProof {
    PaymentProof {
        payment_id: payment_id.to_string(),
        amount_sent: Money::from_pesos(350),
        amount_paid: Money::from_pesos(350),
        reference_number: "GC-1122334455".to_string(),
        payment_method: "gcash".to_string(),
        payment_date: Utc::now(),
        screenshot: "uploads/gcash-1122334455.png".to_string(),
    }
}

/// The copy of the order embedded in each of the three seeded owning documents. Panics if any copy is
/// missing.
pub async fn copies_of(db: &SqliteStore, order_ref: i64) -> (Order, Order, Order) {
    let shop = db.fetch_shop(&ShopId::from(SHOP_ID)).await.unwrap().unwrap();
    let admin = db.fetch_admin(ADMIN_ID).await.unwrap().unwrap();
    let customer = db.fetch_customer(CUSTOMER_ID).await.unwrap().unwrap();
    let in_shop = shop.orders.into_iter().find(|o| o.id == order_ref).expect("No copy in the shop document");
    let in_admin = admin
        .shop
        .expect("Admin has no shop document")
        .orders
        .into_iter()
        .find(|o| o.id == order_ref)
        .expect("No copy in the admin document");
    let in_customer =
        customer.orders.into_iter().find(|o| o.id == order_ref).expect("No copy in the customer document");
    (in_shop, in_admin, in_customer)
}

/// How many of the three seeded owning documents still hold a copy of the order.
pub async fn remaining_copies(db: &SqliteStore, order_ref: i64) -> usize {
    let shop = db.fetch_shop(&ShopId::from(SHOP_ID)).await.unwrap().unwrap();
    let admin = db.fetch_admin(ADMIN_ID).await.unwrap().unwrap();
    let customer = db.fetch_customer(CUSTOMER_ID).await.unwrap().unwrap();
    let mut count = shop.orders.iter().filter(|o| o.id == order_ref).count();
    count += admin.shop.map(|s| s.orders.iter().filter(|o| o.id == order_ref).count()).unwrap_or_default();
    count += customer.orders.iter().filter(|o| o.id == order_ref).count();
    count
}
