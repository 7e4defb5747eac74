//! The per-holder, per-asset earnings ledger and the interest replay over it

use bigdecimal::BigDecimal;

use super::error::LedgerError;

/// Whether a transfer credited or debited the holder
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferDirection {
    /// The holder received tokens
    In,
    /// The holder sent tokens
    Out,
}

/// A transfer of the asset to or from the holder
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferEvent {
    /// The block the transfer was emitted in
    pub block_number: u64,
    /// The direction relative to the holder
    pub direction: TransferDirection,
    /// The amount, in whole tokens
    pub amount: BigDecimal,
}

impl TransferEvent {
    /// The amount signed by direction
    pub fn signed_amount(&self) -> BigDecimal {
        match self.direction {
            TransferDirection::In => self.amount.clone(),
            TransferDirection::Out => -self.amount.clone(),
        }
    }
}

/// Newly observed history to append to a ledger
#[derive(Clone, Debug, Default)]
pub struct LedgerUpdate {
    /// Transfers after the ledger's synced block, in chain order
    pub events: Vec<TransferEvent>,
    /// The exchange rate at each new transfer's block, followed by the rate
    /// at `synced_to`
    pub rates: Vec<BigDecimal>,
    /// The block the update was fetched through
    pub synced_to: u64,
}

/// The replay state of one holder's position in one asset
///
/// Once synced, `exchange_rate_samples` holds one sample per transfer plus a
/// trailing sample at the synced block
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EarningsLedger {
    /// Every transfer to or from the holder, in chain order
    transfer_events: Vec<TransferEvent>,
    /// The exchange rate at each transfer, then at the synced block
    exchange_rate_samples: Vec<BigDecimal>,
    /// The block the ledger is synced through
    last_synced_block: Option<u64>,
}

impl EarningsLedger {
    /// Create an empty, unsynced ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// The block the ledger is synced through
    pub fn last_synced_block(&self) -> Option<u64> {
        self.last_synced_block
    }

    /// The recorded transfers
    pub fn transfer_events(&self) -> &[TransferEvent] {
        &self.transfer_events
    }

    /// The recorded exchange rate samples
    pub fn exchange_rate_samples(&self) -> &[BigDecimal] {
        &self.exchange_rate_samples
    }

    /// Whether there is one rate sample per transfer plus the current one
    pub fn is_aligned(&self) -> bool {
        self.exchange_rate_samples.len() == self.transfer_events.len() + 1
    }

    /// Append newly observed history
    ///
    /// The trailing current-rate sample is replaced by the update's samples;
    /// nothing else is discarded
    pub fn extend(&mut self, update: LedgerUpdate) -> Result<(), LedgerError> {
        let LedgerUpdate { events, mut rates, synced_to } = update;
        if rates.len() != events.len() + 1 {
            return Err(LedgerError::Misaligned {
                expected: events.len() + 1,
                actual: rates.len(),
            });
        }
        let last_block = self.transfer_events.last().map(|e| e.block_number);
        if let (Some(last), Some(first)) = (last_block, events.first()) {
            if first.block_number < last {
                return Err(LedgerError::OutOfOrder(first.block_number));
            }
        }

        self.exchange_rate_samples.pop();
        self.exchange_rate_samples.append(&mut rates);
        self.transfer_events.extend(events);
        self.last_synced_block = Some(synced_to);
        Ok(())
    }

    /// The running balance after each transfer
    pub fn balance_history(&self) -> Vec<BigDecimal> {
        let mut balance = BigDecimal::from(0);
        self.transfer_events
            .iter()
            .map(|event| {
                balance += event.signed_amount();
                balance.clone()
            })
            .collect()
    }

    /// The change in exchange rate between consecutive samples
    pub fn rate_deltas(&self) -> Vec<BigDecimal> {
        self.exchange_rate_samples.windows(2).map(|pair| &pair[1] - &pair[0]).collect()
    }

    /// The interest accrued over every holding period, in underlying units
    ///
    /// `None` when the holder has no transfer history
    pub fn accrued_interest(&self) -> Option<BigDecimal> {
        if self.transfer_events.is_empty() {
            return None;
        }

        let interest = self
            .balance_history()
            .iter()
            .zip(self.rate_deltas())
            .fold(BigDecimal::from(0), |acc, (balance, delta)| acc + balance * delta);
        Some(interest)
    }

    /// The change in exchange rate over the most recent sync, `None` with
    /// fewer than two samples
    pub fn latest_rate_delta(&self) -> Option<BigDecimal> {
        match self.exchange_rate_samples.as_slice() {
            [.., prev, last] => Some(last - prev),
            _ => None,
        }
    }
}
