//! Budget item domain models and derivation helpers.

pub mod adjustment;
#[allow(clippy::module_inception)]
pub mod item;
pub mod transaction;

pub use adjustment::ItemAdjustment;
pub use item::{Item, ItemForecast, RecurrenceMode};
pub use transaction::Transaction;
