use thiserror::Error;
use uuid::Uuid;

/// Error type that captures item-book failures.
///
/// Derivations themselves never fail: degenerate histories produce a zero
/// interval or value instead of an error.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Item not found: {0}")]
    ItemNotFound(Uuid),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Transaction {transaction} is already attached to item {item}")]
    TransactionOwned { transaction: Uuid, item: Uuid },
}
