//! The shared store of earnings ledgers

use std::sync::Arc;

use alloy_primitives::Address;
use dashmap::DashMap;

use super::{
    error::LedgerError,
    ledger::{EarningsLedger, LedgerUpdate},
};

/// Identifies one holder's position in one asset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LedgerKey {
    /// The chain the asset lives on
    pub chain_id: u64,
    /// The holder
    pub holder: Address,
    /// The asset
    pub asset: Address,
}

/// The result of committing an update
#[derive(Clone, Debug)]
pub struct CommitOutcome {
    /// The ledger after the commit attempt
    pub ledger: EarningsLedger,
    /// Whether the update was applied
    pub committed: bool,
}

/// A concurrent map of ledgers. Clones share state
#[derive(Clone, Default)]
pub struct LedgerStore {
    /// The ledgers by key
    ledgers: Arc<DashMap<LedgerKey, EarningsLedger>>,
}

impl LedgerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of the ledger for a key, empty if untracked
    pub fn get(&self, key: &LedgerKey) -> EarningsLedger {
        self.ledgers.get(key).map(|l| l.value().clone()).unwrap_or_default()
    }

    /// Every tracked key
    pub fn keys(&self) -> Vec<LedgerKey> {
        self.ledgers.iter().map(|entry| *entry.key()).collect()
    }

    /// Apply an update fetched from the snapshot synced through
    /// `expected_last`
    ///
    /// The update is dropped if another sync has since committed, or if the
    /// ledger is already synced through the update's block, so overlapping
    /// syncs never duplicate history
    pub fn commit(
        &self,
        key: LedgerKey,
        expected_last: Option<u64>,
        update: LedgerUpdate,
    ) -> Result<CommitOutcome, LedgerError> {
        let mut entry = self.ledgers.entry(key).or_default();
        let current = entry.last_synced_block();
        let superseded = current != expected_last;
        let already_synced = current.is_some_and(|block| block >= update.synced_to);
        if superseded || already_synced {
            return Ok(CommitOutcome { ledger: entry.clone(), committed: false });
        }

        let mut next = entry.clone();
        next.extend(update)?;
        *entry = next.clone();
        Ok(CommitOutcome { ledger: next, committed: true })
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;

    use super::*;
    use crate::yield_accounting::ledger::{TransferDirection, TransferEvent};

    /// A key for a random holder
    fn key() -> LedgerKey {
        LedgerKey { chain_id: 1, holder: Address::random(), asset: Address::random() }
    }

    /// An update with a single deposit
    fn deposit(block: u64, synced_to: u64) -> LedgerUpdate {
        LedgerUpdate {
            events: vec![TransferEvent {
                block_number: block,
                direction: TransferDirection::In,
                amount: BigDecimal::from(10),
            }],
            rates: vec![BigDecimal::from(1), BigDecimal::from(2)],
            synced_to,
        }
    }

    /// The first sync of a ledger commits
    #[test]
    fn test_commit_fresh() {
        let store = LedgerStore::new();
        let key = key();

        let outcome = store.commit(key, None, deposit(5, 10)).unwrap();
        assert!(outcome.committed);
        assert_eq!(store.get(&key).last_synced_block(), Some(10));
        assert_eq!(store.keys(), vec![key]);
    }

    /// Two syncs from the same snapshot only apply once
    #[test]
    fn test_concurrent_commit_dropped() {
        let store = LedgerStore::new();
        let key = key();

        assert!(store.commit(key, None, deposit(5, 10)).unwrap().committed);
        let outcome = store.commit(key, None, deposit(5, 10)).unwrap();
        assert!(!outcome.committed);
        assert_eq!(outcome.ledger.transfer_events().len(), 1);
        assert!(outcome.ledger.is_aligned());
    }

    /// An update that does not advance the ledger is dropped
    #[test]
    fn test_stale_commit_dropped() {
        let store = LedgerStore::new();
        let key = key();

        store.commit(key, None, deposit(5, 10)).unwrap();
        let stale =
            LedgerUpdate { rates: vec![BigDecimal::from(3)], synced_to: 10, ..Default::default() };
        let outcome = store.commit(key, Some(10), stale).unwrap();
        assert!(!outcome.committed);
        assert_eq!(store.get(&key).exchange_rate_samples().len(), 2);
    }

    /// A rejected update leaves the stored ledger untouched
    #[test]
    fn test_invalid_update_preserves_ledger() {
        let store = LedgerStore::new();
        let key = key();

        store.commit(key, None, deposit(5, 10)).unwrap();
        let misaligned = LedgerUpdate { synced_to: 20, ..Default::default() };
        assert!(store.commit(key, Some(10), misaligned).is_err());
        assert_eq!(store.get(&key).last_synced_block(), Some(10));
    }
}
