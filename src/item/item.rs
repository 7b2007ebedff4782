use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::MoneyValue;

use super::adjustment::ItemAdjustment;
use super::transaction::Transaction;

/// Selects how an item's recurrence interval is produced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RecurrenceMode {
    /// Derive the interval from the recurring transaction history.
    Automatic,
    /// Fixed interval in days; takes precedence over any derivation.
    Manual { interval_days: i64 },
}

/// A recurring budget category aggregating transactions and adjustments.
///
/// Both collections are keyed by record id and behave as unordered sets:
/// re-adding an id replaces the stored record without growing the set, and
/// removing an absent id is a silent no-op.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: Uuid,
    pub description: String,
    /// Informational flag marking the item as inflation-sensitive; not
    /// consumed by any derivation here.
    pub inflation: bool,
    pub recurrence: RecurrenceMode,
    #[serde(default)]
    transactions: HashMap<Uuid, Transaction>,
    #[serde(default)]
    adjustments: HashMap<Uuid, ItemAdjustment>,
}

impl Item {
    /// Creates a new item with empty transaction and adjustment sets.
    pub fn new(
        description: impl Into<String>,
        inflation: bool,
        recurrence: RecurrenceMode,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            inflation,
            recurrence,
            transactions: HashMap::new(),
            adjustments: HashMap::new(),
        }
    }

    /// Adds a transaction to this item.
    ///
    /// This does not check that the transaction has been detached from other
    /// items. A transaction should belong to at most one item; callers using
    /// bare items must remove it elsewhere first, or go through
    /// [`ItemBook`](crate::book::ItemBook), which enforces exclusivity.
    pub fn add_transaction(&mut self, transaction: Transaction) {
        self.transactions.insert(transaction.id, transaction);
    }

    /// Adds several transactions at once. Same ownership caveat as
    /// [`Item::add_transaction`].
    pub fn add_transactions(&mut self, transactions: Vec<Transaction>) {
        for transaction in transactions {
            self.transactions.insert(transaction.id, transaction);
        }
    }

    /// Removes a transaction if present, returning it.
    pub fn remove_transaction(&mut self, id: Uuid) -> Option<Transaction> {
        self.transactions.remove(&id)
    }

    /// Removes each of the given transactions if present.
    pub fn remove_transactions(&mut self, ids: &[Uuid]) {
        for id in ids {
            self.transactions.remove(id);
        }
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.get(&id)
    }

    pub fn contains_transaction(&self, id: Uuid) -> bool {
        self.transactions.contains_key(&id)
    }

    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.values()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn add_adjustment(&mut self, adjustment: ItemAdjustment) {
        self.adjustments.insert(adjustment.id, adjustment);
    }

    pub fn remove_adjustment(&mut self, id: Uuid) -> Option<ItemAdjustment> {
        self.adjustments.remove(&id)
    }

    pub fn adjustments(&self) -> impl Iterator<Item = &ItemAdjustment> {
        self.adjustments.values()
    }

    pub fn adjustment_count(&self) -> usize {
        self.adjustments.len()
    }

    /// Average number of days between recurring transactions.
    ///
    /// Manual mode returns the stored interval regardless of history. In
    /// automatic mode the interval is the whole-day span between the earliest
    /// and latest recurring timestamps divided by the recurring count,
    /// truncating toward zero. Returns 0 whenever no interval can be derived:
    /// fewer than two transactions overall, or none of them recurring.
    pub fn base_recurrence_interval(&self) -> i64 {
        if let RecurrenceMode::Manual { interval_days } = self.recurrence {
            return interval_days;
        }

        if self.transactions.len() <= 1 {
            return 0;
        }

        let mut first: Option<DateTime<Utc>> = None;
        let mut last: Option<DateTime<Utc>> = None;
        let mut recurring_count = 0i64;

        for transaction in self.transactions.values() {
            if !transaction.recurring {
                continue;
            }
            recurring_count += 1;
            let at = transaction.occurred_at;
            first = Some(first.map_or(at, |earliest| earliest.min(at)));
            last = Some(last.map_or(at, |latest| latest.max(at)));
        }

        match (first, last) {
            (Some(first), Some(last)) => (last - first).num_days() / recurring_count,
            _ => 0,
        }
    }

    /// Predicted value of the next transaction: the mean of all recurring
    /// transaction amounts, truncating toward zero.
    ///
    /// Every recurring transaction contributes exactly once. Returns zero
    /// when the item has no recurring history to average.
    pub fn base_value(&self) -> MoneyValue {
        let mut total = MoneyValue::zero();
        let mut recurring_count = 0i64;

        for transaction in self.transactions.values() {
            if !transaction.recurring {
                continue;
            }
            total.accumulate(transaction.value);
            recurring_count += 1;
        }

        if recurring_count == 0 {
            return MoneyValue::zero();
        }

        MoneyValue::new(total.amount / recurring_count)
    }

    /// Combined derivation output for downstream consumers.
    pub fn forecast(&self) -> ItemForecast {
        ItemForecast {
            item_id: self.id,
            description: self.description.clone(),
            recurrence_interval_days: self.base_recurrence_interval(),
            next_value: self.base_value(),
        }
    }
}

/// Snapshot of an item's derived recurrence interval and predicted value.
///
/// An interval or value of 0 means "insufficient data" when the underlying
/// set has fewer than two (interval) or zero (value) qualifying transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemForecast {
    pub item_id: Uuid,
    pub description: String,
    pub recurrence_interval_days: i64,
    pub next_value: MoneyValue,
}
