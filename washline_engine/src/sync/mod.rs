//! Keeps the denormalized order copies in step with the canonical record.
//!
//! A mutation is first validated and turned into an [`OrderPatch`] against the canonical order, then
//! the identical patch is replayed onto every embedded copy. Because both sides apply the same
//! [`FieldChange`], a copy that received the patch is field-for-field equal to the canonical record.

mod mutation;
mod synchronizer;

pub use mutation::{FieldChange, OrderMutation, OrderPatch, ValidationError};
pub use synchronizer::{CopyFailure, SyncOutcome, Synchronizer};
