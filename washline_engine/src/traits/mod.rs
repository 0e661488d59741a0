//! The traits that database backends and event transports must implement for the engine to drive them.
//!
//! [`EntityStore`] covers canonical orders and the embedded copies, [`DirectoryManagement`] covers the
//! shop/admin/customer directory, [`NotificationManagement`] covers the notification log, and
//! [`EventPublisher`] hands real-time events to whatever transport the host application wires in.

mod data_objects;
mod directory_management;
mod entity_store;
mod event_publisher;
mod notification_management;

pub use data_objects::AggregateKind;
pub use directory_management::DirectoryManagement;
pub use entity_store::{EntityStore, StoreError};
pub use event_publisher::{EventPublisher, PublishError};
pub use notification_management::NotificationManagement;
