#![doc(test(attr(deny(warnings))))]

//! Item Core offers budget item primitives that aggregate transaction
//! history into recurrence intervals and next-value predictions for
//! recurring financial activity.

pub mod book;
pub mod errors;
pub mod item;
pub mod money;
pub mod utils;

pub use book::ItemBook;
pub use errors::ItemError;
pub use item::{Item, ItemAdjustment, ItemForecast, RecurrenceMode, Transaction};
pub use money::MoneyValue;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Item Core tracing initialized.");
    });
}
