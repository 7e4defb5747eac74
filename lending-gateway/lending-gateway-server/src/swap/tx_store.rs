//! Transaction store for submitted deposits and withdrawals.
//!
//! Shared between the request handlers and the confirmation watchers.

use std::sync::Arc;

use alloy_primitives::Address;
use dashmap::DashMap;
use lending_gateway_api::TxStatus;
use uuid::Uuid;

/// What a tracked transaction does
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxKind {
    /// A deposit of ETH through a gateway route
    Deposit {
        /// The target asset
        asset: Address,
        /// The route the deposit was submitted through
        route_index: usize,
    },
    /// A withdrawal from a yield-bearing asset
    Withdraw {
        /// The asset being redeemed
        asset: Address,
    },
}

/// A tracked transaction
#[derive(Clone, Debug)]
pub struct TxContext {
    /// The ID of the transaction
    pub id: Uuid,
    /// What the transaction does
    pub kind: TxKind,
    /// The current status
    pub status: TxStatus,
}

/// A thread-safe store of tracked transactions
#[derive(Clone, Default)]
pub struct TxStore {
    /// The transactions by ID
    by_id: Arc<DashMap<Uuid, TxContext>>,
}

impl TxStore {
    /// Creates a new `TxStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new transaction in the `Idle` state
    pub fn insert(&self, kind: TxKind) -> TxContext {
        let tx = TxContext { id: Uuid::new_v4(), kind, status: TxStatus::Idle };
        self.by_id.insert(tx.id, tx.clone());
        tx
    }

    /// Update a transaction's status, returning the updated context
    ///
    /// Terminal statuses are never overwritten
    pub fn set_status(&self, id: &Uuid, status: TxStatus) -> Option<TxContext> {
        let mut entry = self.by_id.get_mut(id)?;
        if !entry.status.is_final() {
            entry.status = status;
        }
        Some(entry.value().clone())
    }

    /// Fetch a transaction
    pub fn get(&self, id: &Uuid) -> Option<TxContext> {
        self.by_id.get(id).map(|entry| entry.value().clone())
    }
}
