//! Washline Engine
//!
//! The Washline Engine is the state synchronization and notification core of the Washline laundry
//! platform. Orders are stored denormalized: one canonical record, plus copies embedded in the shop,
//! admin and customer documents that own them, so each side of the marketplace can read its world in
//! one query. This library owns the discipline that layout demands.
//!
//! The library is divided into two main sections:
//! 1. Storage management and control ([`mod@sqlite`] and the [`mod@traits`] it implements). SQLite is
//!    the supported backend. You should never need to access the database directly; use the public API
//!    instead. The exception is the data types used in the database, which are defined in the
//!    [`db_types`] module and are public.
//! 2. The engine's public API ([`OrderFlowApi`] and [`NotificationApi`]). Every order mutation flows
//!    through here: the canonical record is written first, the same patch is replayed onto every
//!    embedded copy, and the right people are told over persistent notifications and real-time events.
//!
//! The engine also publishes real-time events on per-recipient private channels (see
//! [`events::naming`]). An in-process relay ([`events::EventRelay`]) hands them to whatever transport
//! the host application wires in.

pub mod config;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod reminders;
pub mod resolver;

mod api;
mod sync;
mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

pub use api::{
    errors::{DispatchError, OrderFlowError, ResolveError, SyncError},
    order_objects,
    NotificationApi,
    OrderFlowApi,
};
pub use sync::{CopyFailure, FieldChange, OrderMutation, OrderPatch, SyncOutcome, Synchronizer, ValidationError};
pub use traits::{
    AggregateKind,
    DirectoryManagement,
    EntityStore,
    EventPublisher,
    NotificationManagement,
    PublishError,
    StoreError,
};
