//! The wire names of channels and events.
//!
//! These strings are a contract with deployed subscribers. Renaming any of them silently disconnects
//! every client that binds to the old name, so changes here are breaking changes.

use crate::db_types::Recipient;

pub const NEW_NOTIFICATION: &str = "new-notification";
pub const UPDATE_ORDER_STATUS: &str = "update-order-status";
pub const UPDATE_ORDER_PRICE: &str = "update-order-price";
pub const NEW_FEEDBACK: &str = "new-feedback";
pub const UPDATE_FEEDBACK: &str = "update-feedback";
pub const DELETE_FEEDBACK: &str = "delete-feedback";
pub const UPDATE_PAYMENT_STATUS_PROOF: &str = "update-payment-status-proof";
pub const UPDATE_PAYMENT_STATUS: &str = "update-payment-status";

/// The private channel a recipient listens on.
///
/// Customer channels carry the historical `client` token rather than `customer`. Subscribers in the
/// field bind to `private-client-{id}`, so the asymmetry with `private-admin-{id}` is load-bearing.
pub fn channel_for(recipient: &Recipient) -> String {
    match recipient {
        Recipient::Admin(id) => format!("private-admin-{id}"),
        Recipient::Customer(id) => format!("private-client-{id}"),
    }
}
