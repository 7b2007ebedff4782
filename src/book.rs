//! Owning registry for items enforcing transaction exclusivity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::ItemError;
use crate::item::{Item, ItemForecast, Transaction};

/// Registry of items that keeps every transaction attached to at most one
/// item.
///
/// A bare [`Item`] documents exclusivity as a caller responsibility; the book
/// turns it into an enforced invariant by indexing owners by transaction id
/// and routing every ownership change through that index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemBook {
    #[serde(default)]
    items: HashMap<Uuid, Item>,
    #[serde(default)]
    owners: HashMap<Uuid, Uuid>,
}

impl ItemBook {
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            owners: HashMap::new(),
        }
    }

    /// Registers an item, claiming any transactions it already carries.
    ///
    /// Fails without registering when one of those transactions is claimed by
    /// another registered item. Re-registering an existing item id replaces
    /// the stored item and releases claims the new copy no longer carries.
    pub fn add_item(&mut self, item: Item) -> Result<Uuid, ItemError> {
        for transaction in item.transactions() {
            if let Some(owner) = self.owners.get(&transaction.id) {
                if *owner != item.id {
                    return Err(ItemError::TransactionOwned {
                        transaction: transaction.id,
                        item: *owner,
                    });
                }
            }
        }

        if self.items.contains_key(&item.id) {
            self.remove_item(item.id);
        }
        let id = item.id;
        for transaction in item.transactions() {
            self.owners.insert(transaction.id, id);
        }
        self.items.insert(id, item);
        Ok(id)
    }

    /// Unregisters an item, releasing all of its transactions.
    pub fn remove_item(&mut self, id: Uuid) -> Option<Item> {
        let item = self.items.remove(&id)?;
        for transaction in item.transactions() {
            self.owners.remove(&transaction.id);
        }
        Some(item)
    }

    pub fn item(&self, id: Uuid) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the id of the item currently owning the transaction.
    pub fn owner_of(&self, transaction_id: Uuid) -> Option<Uuid> {
        self.owners.get(&transaction_id).copied()
    }

    /// Attaches a transaction to an item, claiming ownership of it.
    ///
    /// Re-attaching a transaction to the item that already owns it refreshes
    /// the stored record without growing the set. A transaction owned by a
    /// different item is rejected; detach or transfer it explicitly instead.
    pub fn attach(&mut self, item_id: Uuid, transaction: Transaction) -> Result<(), ItemError> {
        let item = self
            .items
            .get_mut(&item_id)
            .ok_or(ItemError::ItemNotFound(item_id))?;
        if let Some(owner) = self.owners.get(&transaction.id) {
            if *owner != item_id {
                return Err(ItemError::TransactionOwned {
                    transaction: transaction.id,
                    item: *owner,
                });
            }
        }

        let transaction_id = transaction.id;
        item.add_transaction(transaction);
        self.owners.insert(transaction_id, item_id);
        Ok(())
    }

    /// Attaches several transactions to an item, validating every one before
    /// inserting any.
    pub fn attach_many(
        &mut self,
        item_id: Uuid,
        transactions: Vec<Transaction>,
    ) -> Result<(), ItemError> {
        let item = self
            .items
            .get_mut(&item_id)
            .ok_or(ItemError::ItemNotFound(item_id))?;
        for transaction in &transactions {
            if let Some(owner) = self.owners.get(&transaction.id) {
                if *owner != item_id {
                    return Err(ItemError::TransactionOwned {
                        transaction: transaction.id,
                        item: *owner,
                    });
                }
            }
        }

        for transaction in transactions {
            self.owners.insert(transaction.id, item_id);
            item.add_transaction(transaction);
        }
        Ok(())
    }

    /// Detaches a transaction from whichever item owns it, returning the
    /// removed record. Unowned ids are silently ignored.
    pub fn detach(&mut self, transaction_id: Uuid) -> Option<Transaction> {
        let owner = self.owners.remove(&transaction_id)?;
        self.items
            .get_mut(&owner)
            .and_then(|item| item.remove_transaction(transaction_id))
    }

    /// Detaches each of the given transactions if owned, returning the
    /// removed records.
    pub fn detach_many(&mut self, transaction_ids: &[Uuid]) -> Vec<Transaction> {
        transaction_ids
            .iter()
            .filter_map(|id| self.detach(*id))
            .collect()
    }

    /// Moves a transaction to `to_item` as an explicit detach-then-attach.
    pub fn transfer(&mut self, transaction_id: Uuid, to_item: Uuid) -> Result<(), ItemError> {
        let from_item = self
            .owners
            .get(&transaction_id)
            .copied()
            .ok_or(ItemError::TransactionNotFound(transaction_id))?;
        if !self.items.contains_key(&to_item) {
            return Err(ItemError::ItemNotFound(to_item));
        }

        let transaction = match self.detach(transaction_id) {
            Some(transaction) => transaction,
            None => return Err(ItemError::TransactionNotFound(transaction_id)),
        };
        self.attach(to_item, transaction)?;
        debug!(
            "transaction {} transferred from item {} to item {}",
            transaction_id, from_item, to_item
        );
        Ok(())
    }

    /// Forecasts for every registered item, sorted by description then id so
    /// consumers see stable output.
    pub fn forecasts(&self) -> Vec<ItemForecast> {
        let mut forecasts: Vec<ItemForecast> =
            self.items.values().map(|item| item.forecast()).collect();
        forecasts.sort_by(|a, b| {
            a.description
                .cmp(&b.description)
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        forecasts
    }
}

impl Default for ItemBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::RecurrenceMode;
    use crate::money::MoneyValue;
    use chrono::{TimeZone, Utc};

    fn sample_transaction(amount: i64) -> Transaction {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        Transaction::new(at, MoneyValue::new(amount), true)
    }

    fn book_with_two_items() -> (ItemBook, Uuid, Uuid) {
        let mut book = ItemBook::new();
        let rent = book
            .add_item(Item::new("Rent", false, RecurrenceMode::Automatic))
            .unwrap();
        let groceries = book
            .add_item(Item::new("Groceries", true, RecurrenceMode::Automatic))
            .unwrap();
        (book, rent, groceries)
    }

    #[test]
    fn attach_claims_ownership() {
        let (mut book, rent, _) = book_with_two_items();
        let txn = sample_transaction(1_200_00);
        let txn_id = txn.id;

        book.attach(rent, txn).unwrap();
        assert_eq!(book.owner_of(txn_id), Some(rent));
        assert!(book.item(rent).unwrap().contains_transaction(txn_id));
    }

    #[test]
    fn attach_rejects_transaction_owned_elsewhere() {
        let (mut book, rent, groceries) = book_with_two_items();
        let txn = sample_transaction(42_00);
        let txn_id = txn.id;
        book.attach(rent, txn.clone()).unwrap();

        let err = book
            .attach(groceries, txn)
            .expect_err("attach must reject owned transaction");
        assert!(matches!(
            err,
            ItemError::TransactionOwned { transaction, item }
                if transaction == txn_id && item == rent
        ));
        assert_eq!(book.owner_of(txn_id), Some(rent));
    }

    #[test]
    fn attach_to_missing_item_fails() {
        let mut book = ItemBook::new();
        let err = book
            .attach(Uuid::new_v4(), sample_transaction(10))
            .expect_err("attach must fail for unknown item");
        assert!(matches!(err, ItemError::ItemNotFound(_)));
    }

    #[test]
    fn transfer_moves_ownership() {
        let (mut book, rent, groceries) = book_with_two_items();
        let txn = sample_transaction(42_00);
        let txn_id = txn.id;
        book.attach(rent, txn).unwrap();

        book.transfer(txn_id, groceries).unwrap();
        assert_eq!(book.owner_of(txn_id), Some(groceries));
        assert!(!book.item(rent).unwrap().contains_transaction(txn_id));
        assert!(book.item(groceries).unwrap().contains_transaction(txn_id));
    }

    #[test]
    fn transfer_of_unowned_transaction_fails() {
        let (mut book, _, groceries) = book_with_two_items();
        let err = book
            .transfer(Uuid::new_v4(), groceries)
            .expect_err("transfer must fail for unowned transaction");
        assert!(matches!(err, ItemError::TransactionNotFound(_)));
    }

    #[test]
    fn detach_releases_ownership() {
        let (mut book, rent, groceries) = book_with_two_items();
        let txn = sample_transaction(42_00);
        let txn_id = txn.id;
        book.attach(rent, txn).unwrap();

        let removed = book.detach(txn_id).expect("detach returns the record");
        assert_eq!(removed.id, txn_id);
        assert_eq!(book.owner_of(txn_id), None);

        // Released transactions can be attached elsewhere.
        book.attach(groceries, removed).unwrap();
        assert_eq!(book.owner_of(txn_id), Some(groceries));
    }

    #[test]
    fn detach_of_unowned_transaction_is_noop() {
        let (mut book, _, _) = book_with_two_items();
        assert!(book.detach(Uuid::new_v4()).is_none());
    }

    #[test]
    fn removing_item_releases_its_transactions() {
        let (mut book, rent, groceries) = book_with_two_items();
        let txn = sample_transaction(42_00);
        let txn_id = txn.id;
        book.attach(rent, txn.clone()).unwrap();

        let removed = book.remove_item(rent).expect("item was registered");
        assert_eq!(removed.transaction_count(), 1);
        assert_eq!(book.owner_of(txn_id), None);
        assert!(book.items().all(|item| item.id != rent));

        book.attach(groceries, txn).unwrap();
        assert_eq!(book.owner_of(txn_id), Some(groceries));
    }

    #[test]
    fn add_item_rejects_preattached_conflicts() {
        let (mut book, rent, _) = book_with_two_items();
        let txn = sample_transaction(42_00);
        book.attach(rent, txn.clone()).unwrap();

        let mut poacher = Item::new("Poacher", false, RecurrenceMode::Automatic);
        poacher.add_transaction(txn);
        let err = book
            .add_item(poacher)
            .expect_err("add_item must reject claimed transactions");
        assert!(matches!(err, ItemError::TransactionOwned { .. }));
        assert_eq!(book.item_count(), 2);
    }

    #[test]
    fn add_item_claims_carried_transactions() {
        let mut book = ItemBook::new();
        let txn = sample_transaction(1_200_00);
        let txn_id = txn.id;
        let mut rent = Item::new("Rent", false, RecurrenceMode::Automatic);
        rent.add_transaction(txn.clone());

        let rent_id = book.add_item(rent).unwrap();
        assert_eq!(book.owner_of(txn_id), Some(rent_id));

        let groceries = book
            .add_item(Item::new("Groceries", true, RecurrenceMode::Automatic))
            .unwrap();
        let err = book
            .attach(groceries, txn)
            .expect_err("carried transaction must be claimed at registration");
        assert!(matches!(
            err,
            ItemError::TransactionOwned { transaction, item }
                if transaction == txn_id && item == rent_id
        ));
    }

    #[test]
    fn reregistering_item_releases_stale_claims() {
        let mut book = ItemBook::new();
        let old_txn = sample_transaction(88_00);
        let old_id = old_txn.id;
        let mut item = Item::new("Utilities", false, RecurrenceMode::Automatic);
        item.add_transaction(old_txn);

        let item_id = book.add_item(item.clone()).unwrap();
        assert_eq!(book.owner_of(old_id), Some(item_id));

        // Same id comes back carrying a different transaction.
        let new_txn = sample_transaction(92_00);
        let new_id = new_txn.id;
        item.remove_transaction(old_id);
        item.add_transaction(new_txn);
        assert_eq!(book.add_item(item).unwrap(), item_id);

        assert_eq!(book.item_count(), 1);
        assert_eq!(book.owner_of(old_id), None);
        assert_eq!(book.owner_of(new_id), Some(item_id));
    }

    #[test]
    fn attach_many_is_all_or_nothing() {
        let (mut book, rent, groceries) = book_with_two_items();
        let owned = sample_transaction(10_00);
        book.attach(rent, owned.clone()).unwrap();

        let fresh = sample_transaction(20_00);
        let fresh_id = fresh.id;
        let err = book
            .attach_many(groceries, vec![fresh, owned])
            .expect_err("bulk attach must reject claimed transactions");
        assert!(matches!(err, ItemError::TransactionOwned { .. }));
        assert!(!book.item(groceries).unwrap().contains_transaction(fresh_id));
        assert_eq!(book.owner_of(fresh_id), None);
    }

    #[test]
    fn forecasts_are_sorted_by_description() {
        let (book, _, _) = book_with_two_items();
        let forecasts = book.forecasts();
        assert_eq!(forecasts.len(), 2);
        assert_eq!(forecasts[0].description, "Groceries");
        assert_eq!(forecasts[1].description, "Rent");
    }
}
