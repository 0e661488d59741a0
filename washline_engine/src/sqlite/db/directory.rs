//! Access to the shop, admin and customer tables.

use sqlx::SqliteConnection;

use crate::{
    db_types::{Admin, Customer, NewAdmin, NewCustomer, NewShop, Shop, ShopId},
    traits::StoreError,
};

pub async fn insert_shop(shop: NewShop, conn: &mut SqliteConnection) -> Result<Shop, StoreError> {
    let inserted = sqlx::query_as::<_, Shop>(
        "INSERT INTO shops (shop_id, name, address, orders) VALUES ($1, $2, $3, '[]') RETURNING *",
    )
    .bind(&shop.shop_id)
    .bind(&shop.name)
    .bind(&shop.address)
    .fetch_one(&mut *conn)
    .await?;
    Ok(inserted)
}

/// Inserts an admin with the current document of the shop they own embedded wholesale.
pub async fn insert_admin(admin: NewAdmin, conn: &mut SqliteConnection) -> Result<Admin, StoreError> {
    let shop =
        fetch_shop(&admin.shop_id, conn).await?.ok_or_else(|| StoreError::ShopNotFound(admin.shop_id.clone()))?;
    let doc = serde_json::to_string(&shop)?;
    let inserted =
        sqlx::query_as::<_, Admin>("INSERT INTO admins (admin_id, name, shop) VALUES ($1, $2, $3) RETURNING *")
            .bind(&admin.admin_id)
            .bind(&admin.name)
            .bind(doc)
            .fetch_one(&mut *conn)
            .await?;
    Ok(inserted)
}

pub async fn insert_customer(customer: NewCustomer, conn: &mut SqliteConnection) -> Result<Customer, StoreError> {
    let inserted = sqlx::query_as::<_, Customer>(
        "INSERT INTO customers (customer_id, name, orders) VALUES ($1, $2, '[]') RETURNING *",
    )
    .bind(&customer.customer_id)
    .bind(&customer.name)
    .fetch_one(&mut *conn)
    .await?;
    Ok(inserted)
}

pub async fn fetch_shop(shop_id: &ShopId, conn: &mut SqliteConnection) -> Result<Option<Shop>, StoreError> {
    let shop = sqlx::query_as::<_, Shop>("SELECT * FROM shops WHERE shop_id = $1")
        .bind(shop_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(shop)
}

pub async fn fetch_shop_by_record_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Shop>, StoreError> {
    let shop =
        sqlx::query_as::<_, Shop>("SELECT * FROM shops WHERE id = $1").bind(id).fetch_optional(&mut *conn).await?;
    Ok(shop)
}

pub async fn fetch_admin(admin_id: &str, conn: &mut SqliteConnection) -> Result<Option<Admin>, StoreError> {
    let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE admin_id = $1")
        .bind(admin_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(admin)
}

/// The admin whose embedded shop carries the given public shop id. Ordered by record id so the answer
/// is stable if the directory ever holds more than one claimant.
pub async fn fetch_admin_for_shop(shop_id: &ShopId, conn: &mut SqliteConnection) -> Result<Option<Admin>, StoreError> {
    let admin = sqlx::query_as::<_, Admin>(
        "SELECT * FROM admins WHERE json_extract(shop, '$.shop_id') = $1 ORDER BY id LIMIT 1",
    )
    .bind(shop_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(admin)
}

/// The admin whose embedded shop already holds a copy of the order with record id `order_ref`.
pub async fn fetch_admin_with_order(order_ref: i64, conn: &mut SqliteConnection) -> Result<Option<Admin>, StoreError> {
    let admin = sqlx::query_as::<_, Admin>(
        r#"SELECT * FROM admins WHERE shop IS NOT NULL AND EXISTS (
            SELECT 1 FROM json_each(admins.shop, '$.orders') WHERE json_extract(json_each.value, '$.id') = $1
        ) ORDER BY id LIMIT 1"#,
    )
    .bind(order_ref)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(admin)
}

pub async fn fetch_customer(customer_id: &str, conn: &mut SqliteConnection) -> Result<Option<Customer>, StoreError> {
    let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE customer_id = $1")
        .bind(customer_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(customer)
}
