use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::MoneyValue;

/// A single dated movement of money.
///
/// A transaction should be associated with at most one item at a time. The
/// record carries no back-reference to its item; exclusivity is tracked by
/// the [`ItemBook`](crate::book::ItemBook) owner index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub value: MoneyValue,
    /// Whether the transaction is part of a repeating pattern. Only recurring
    /// transactions participate in interval and base-value derivation.
    pub recurring: bool,
}

impl Transaction {
    pub fn new(occurred_at: DateTime<Utc>, value: MoneyValue, recurring: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_at,
            value,
            recurring,
        }
    }
}
