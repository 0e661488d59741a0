//! Pickup reminders, decided purely by calendar date.
//!
//! Whether a pickup counts as "today" or "tomorrow" depends on whole dates in the caller's timezone,
//! never on the hour. A pickup 26 hours away can still be "tomorrow", and one 2 hours away on the same
//! date is "today".

use std::fmt::Display;

use chrono::NaiveDate;

use crate::db_types::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderDay {
    Today,
    Tomorrow,
}

impl Display for ReminderDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReminderDay::Today => write!(f, "today"),
            ReminderDay::Tomorrow => write!(f, "tomorrow"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupReminder {
    pub day: ReminderDay,
    pub message: String,
}

/// Returns the reminder to send for `order`, if its pickup date is `today` or the day after. Orders
/// without a pickup date, or with one in the past or further out, get none.
pub fn pickup_reminder(order: &Order, today: NaiveDate) -> Option<PickupReminder> {
    let pickup = order.pickup_date?;
    match (pickup - today).num_days() {
        0 => Some(PickupReminder {
            day: ReminderDay::Today,
            message: format!("Laundry day! Your order {} is scheduled for pickup today.", order.order_id),
        }),
        1 => Some(PickupReminder {
            day: ReminderDay::Tomorrow,
            message: format!("Heads up: your order {} is scheduled for pickup tomorrow.", order.order_id),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::db_types::{NewOrder, Order, OrderId};

    fn order_with_pickup(pickup: Option<NaiveDate>) -> Order {
        let mut input = NewOrder::new("c1", "s1");
        input.pickup_date = pickup;
        Order::place(input, OrderId::from("WL-20260810-000001"), Utc::now())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn pickup_today_reminds_today() {
        let order = order_with_pickup(Some(date(2026, 8, 10)));
        let reminder = pickup_reminder(&order, date(2026, 8, 10)).unwrap();
        assert_eq!(reminder.day, ReminderDay::Today);
        assert!(reminder.message.contains("pickup today"));
        assert!(reminder.message.contains("WL-20260810-000001"));
    }

    #[test]
    fn pickup_tomorrow_reminds_tomorrow() {
        let order = order_with_pickup(Some(date(2026, 8, 11)));
        let reminder = pickup_reminder(&order, date(2026, 8, 10)).unwrap();
        assert_eq!(reminder.day, ReminderDay::Tomorrow);
        assert!(reminder.message.contains("pickup tomorrow"));
    }

    #[test]
    fn whole_dates_matter_not_hours() {
        // Crossing a month boundary is still "tomorrow".
        let order = order_with_pickup(Some(date(2026, 9, 1)));
        let reminder = pickup_reminder(&order, date(2026, 8, 31)).unwrap();
        assert_eq!(reminder.day, ReminderDay::Tomorrow);
    }

    #[test]
    fn past_and_distant_pickups_stay_quiet() {
        let yesterday = order_with_pickup(Some(date(2026, 8, 9)));
        assert!(pickup_reminder(&yesterday, date(2026, 8, 10)).is_none());
        let next_week = order_with_pickup(Some(date(2026, 8, 17)));
        assert!(pickup_reminder(&next_week, date(2026, 8, 10)).is_none());
        let unscheduled = order_with_pickup(None);
        assert!(pickup_reminder(&unscheduled, date(2026, 8, 10)).is_none());
    }
}
