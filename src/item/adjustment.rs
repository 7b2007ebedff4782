use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::MoneyValue;

/// Manual correction attached to an item outside its transaction history.
///
/// Adjustments are stored and handed back untouched; neither the recurrence
/// interval nor the base value reads them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemAdjustment {
    pub id: Uuid,
    pub value: MoneyValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ItemAdjustment {
    pub fn new(value: MoneyValue) -> Self {
        Self {
            id: Uuid::new_v4(),
            value,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
