use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The aggregates that carry embedded order copies. The synchronizer fans every canonical mutation out
/// to all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    Shops,
    Admins,
    Customers,
}

impl AggregateKind {
    pub const ALL: [AggregateKind; 3] = [AggregateKind::Shops, AggregateKind::Admins, AggregateKind::Customers];
}

impl Display for AggregateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateKind::Shops => write!(f, "shops"),
            AggregateKind::Admins => write!(f, "admins"),
            AggregateKind::Customers => write!(f, "customers"),
        }
    }
}
