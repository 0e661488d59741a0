use chrono::NaiveDate;
use rand::{thread_rng, Rng};

use crate::db_types::OrderId;

/// Draws a random order id of the form `WL-YYYYMMDD-XXXXXX`.
///
/// The suffix is random rather than sequential, so ids do not leak order volumes. Uniqueness is not
/// guaranteed here; the orders table enforces it, and callers draw again on a collision.
pub fn generate_order_id(date: NaiveDate) -> OrderId {
    let suffix: u32 = thread_rng().gen_range(0..1_000_000);
    OrderId::from(format!("WL-{}-{suffix:06}", date.format("%Y%m%d")))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_ids_have_the_documented_shape() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        for _ in 0..50 {
            let id = generate_order_id(date);
            let id = id.as_str();
            assert_eq!(id.len(), "WL-20260825-000000".len());
            assert!(id.starts_with("WL-20260825-"));
            assert!(id["WL-20260825-".len()..].chars().all(|c| c.is_ascii_digit()));
        }
    }
}
