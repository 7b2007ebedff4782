//! Fixed-point money representation shared by items and transactions.

use serde::{Deserialize, Serialize};

/// Signed monetary amount in fixed-point minor units.
///
/// Single-currency by contract: values are combined without any conversion
/// or currency check, so callers must only mix amounts of the same currency.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct MoneyValue {
    pub amount: i64,
}

impl MoneyValue {
    pub fn new(amount: i64) -> Self {
        Self { amount }
    }

    pub fn zero() -> Self {
        Self { amount: 0 }
    }

    /// Replaces the stored amount.
    pub fn set_amount(&mut self, amount: i64) {
        self.amount = amount;
    }

    /// Adds `add`'s amount onto this value in place, leaving `add` untouched.
    ///
    /// Repeated accumulation is plain summation, so the final amount does not
    /// depend on the order of the calls.
    pub fn accumulate(&mut self, add: MoneyValue) {
        self.amount += add.amount;
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}
