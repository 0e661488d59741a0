//! Row decoding for the document-carrying tables.
//!
//! Scalar order fields live in real columns; the order's list fields and the aggregates' embedded
//! copies live in JSON `TEXT` columns and are decoded here, so the rest of the crate only ever sees the
//! typed structs.

use serde::de::DeserializeOwned;
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::db_types::{Admin, Customer, Order, Shop};

fn json_column<T: DeserializeOwned>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    serde_json::from_str(&raw)
        .map_err(|e| sqlx::Error::ColumnDecode { index: column.to_string(), source: Box::new(e) })
}

fn optional_json_column<T: DeserializeOwned>(row: &SqliteRow, column: &str) -> Result<Option<T>, sqlx::Error> {
    let raw: Option<String> = row.try_get(column)?;
    raw.as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(|e| sqlx::Error::ColumnDecode { index: column.to_string(), source: Box::new(e) })
}

impl<'r> FromRow<'r, SqliteRow> for Order {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Order {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            customer_id: row.try_get("customer_id")?,
            shop_id: row.try_get("shop_id")?,
            legacy_shop: row.try_get("legacy_shop")?,
            order_type: row.try_get("order_type")?,
            order_status: row.try_get("order_status")?,
            payment_status: row.try_get("payment_status")?,
            total_weight: row.try_get("total_weight")?,
            total_price: row.try_get("total_price")?,
            notes: row.try_get("notes")?,
            services: json_column(row, "services")?,
            clothes: json_column(row, "clothes")?,
            feedbacks: json_column(row, "feedbacks")?,
            proof_of_payment: optional_json_column(row, "proof_of_payment")?,
            proof_history: json_column(row, "proof_history")?,
            pickup_date: row.try_get("pickup_date")?,
            date_placed: row.try_get("date_placed")?,
            date_completed: row.try_get("date_completed")?,
            updated_at: row.try_get("updated_at")?,
            version: row.try_get("version")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for Shop {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Shop {
            id: row.try_get("id")?,
            shop_id: row.try_get("shop_id")?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            orders: json_column(row, "orders")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for Admin {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Admin {
            id: row.try_get("id")?,
            admin_id: row.try_get("admin_id")?,
            name: row.try_get("name")?,
            shop: optional_json_column(row, "shop")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for Customer {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Customer {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            name: row.try_get("name")?,
            orders: json_column(row, "orders")?,
        })
    }
}
