//! The engine's public faces: the order flow API and the notification API.

pub mod errors;
pub mod order_objects;

mod notification_api;
mod order_flow_api;

pub use notification_api::NotificationApi;
pub use order_flow_api::OrderFlowApi;
