//! Yield accounting: replays a holder's transfer history against historical
//! exchange rates to compute the interest accrued on a lending position

use std::sync::Arc;

use alloy_primitives::Address;
use bigdecimal::BigDecimal;
use futures::future::try_join_all;
use tracing::{debug, instrument, warn};

use crate::{
    abis::{transfer_signature, TransferLog},
    chain_client::{ChainClient, DynChainClient, LogQuery},
    registry::{
        assets::{Asset, Platform},
        Registry,
    },
};

use self::{
    error::LedgerError,
    ledger::{EarningsLedger, LedgerUpdate, TransferDirection, TransferEvent},
    rates::{PlatformContracts, RateReader},
    store::{LedgerKey, LedgerStore},
};

pub mod error;
pub mod ledger;
pub mod rates;
pub mod store;
pub mod worker;

/// An earnings figure and the block it was computed at
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Earnings {
    /// The amount in whole units of underlying, `None` when it cannot be
    /// computed
    pub value: Option<BigDecimal>,
    /// The block the figure reflects
    pub block_number: u64,
}

/// A holder's balance in an asset and its underlying value
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Balance {
    /// The balance in whole units of the asset, `None` when unreadable
    pub tokens: Option<BigDecimal>,
    /// The balance in whole units of underlying, `None` when the balance or
    /// the exchange rate is unreadable
    pub underlying_value: Option<BigDecimal>,
    /// The block the balance was read at
    pub block_number: u64,
}

/// A holder's balance and accrued interest in one asset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// The asset
    pub asset: Address,
    /// The holder's balance
    pub balance: Balance,
    /// The holder's accrued interest
    pub earnings: Earnings,
}

/// Computes earnings, profit and rates for lending positions
#[derive(Clone)]
pub struct YieldEngine {
    /// The chain client
    client: DynChainClient,
    /// The asset registry
    registry: Arc<Registry>,
    /// The chain positions live on
    chain_id: u64,
    /// Reads rates and balances
    reader: RateReader,
    /// The synced ledgers
    store: LedgerStore,
}

impl YieldEngine {
    /// Create a new engine with an empty ledger store
    pub fn new(
        client: DynChainClient,
        registry: Arc<Registry>,
        chain_id: u64,
        contracts: PlatformContracts,
    ) -> Self {
        let reader = RateReader::new(client.clone(), contracts);
        Self { client, registry, chain_id, reader, store: LedgerStore::new() }
    }

    /// The ledger store
    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Resolve an asset on the engine's chain
    fn asset(&self, address: Address) -> Result<&Asset, LedgerError> {
        Ok(self.registry.asset_or_err(self.chain_id, address)?)
    }

    // -----------
    // | Syncing |
    // -----------

    /// Bring a holder's ledger up to the current block
    ///
    /// Fetches the transfers since the last synced block along with the
    /// exchange rate at each of them and at the current block, then commits
    /// them unless a concurrent sync got there first. On failure the stored
    /// ledger is left untouched
    #[instrument(skip_all, fields(holder = %holder, asset = %asset))]
    pub async fn sync(
        &self,
        holder: Address,
        asset: Address,
    ) -> Result<EarningsLedger, LedgerError> {
        let asset = self.asset(asset)?;
        let key = LedgerKey { chain_id: self.chain_id, holder, asset: asset.address };
        let snapshot = self.store.get(&key);
        let expected_last = snapshot.last_synced_block();

        let target = self.client.block_number().await?;
        if expected_last.is_some_and(|block| block >= target) {
            return Ok(snapshot);
        }

        let from = expected_last.map_or(asset.creation_block, |block| block + 1);
        let events = if from <= target {
            self.fetch_transfers(asset, holder, from, target).await?
        } else {
            Vec::new()
        };

        let sample_blocks = events.iter().map(|e| e.block_number).chain([target]);
        let rates = try_join_all(
            sample_blocks.map(|block| self.reader.exchange_rate(asset, Some(block))),
        )
        .await?;

        let n_events = events.len();
        let update = LedgerUpdate { events, rates, synced_to: target };
        let outcome = self.store.commit(key, expected_last, update)?;
        if outcome.committed {
            debug!("synced {n_events} transfers through block {target}");
        } else {
            debug!("dropped sync through block {target}, ledger already advanced");
        }
        Ok(outcome.ledger)
    }

    /// Fetch the holder's transfers in `[from, to]`, incoming before outgoing
    /// within a block
    async fn fetch_transfers(
        &self,
        asset: &Asset,
        holder: Address,
        from: u64,
        to: u64,
    ) -> Result<Vec<TransferEvent>, LedgerError> {
        let query = |topic1, topic2| LogQuery {
            address: asset.address,
            event_signature: transfer_signature(),
            topic1,
            topic2,
            from_block: from,
            to_block: to,
        };
        let holder_topic = holder.into_word();
        let (incoming, outgoing) = futures::try_join!(
            self.client.get_logs(query(None, Some(holder_topic))),
            self.client.get_logs(query(Some(holder_topic), None)),
        )?;

        let directed = incoming
            .iter()
            .map(|log| (log, TransferDirection::In))
            .chain(outgoing.iter().map(|log| (log, TransferDirection::Out)));
        let mut events = Vec::with_capacity(incoming.len() + outgoing.len());
        for (log, direction) in directed {
            let transfer = TransferLog::try_from(log)?;
            events.push(TransferEvent {
                block_number: transfer.block_number,
                direction,
                amount: RateReader::to_tokens(asset, transfer.value),
            });
        }

        events.sort_by_key(|event| event.block_number);
        Ok(events)
    }

    // ------------
    // | Earnings |
    // ------------

    /// The interest a holder has accrued in an asset, in whole units of
    /// underlying
    ///
    /// `None` when the holder has no transfer history or the chain could not
    /// be read
    pub async fn earned(&self, holder: Address, asset: Address) -> Result<Earnings, LedgerError> {
        let asset = self.asset(asset)?;
        if asset.platform == Platform::Aave {
            return Ok(self.aave_earned(asset, holder).await);
        }

        let earnings = match self.sync(holder, asset.address).await {
            Ok(ledger) => Earnings {
                value: ledger.accrued_interest(),
                block_number: ledger.last_synced_block().unwrap_or_default(),
            },
            Err(e) => {
                warn!("failed to sync {} ledger of {holder:#x}: {e}", asset.symbol);
                self.unavailable(holder, asset)
            },
        };
        Ok(earnings)
    }

    /// The holder's profit over the latest sync period, in whole units of
    /// underlying
    ///
    /// This is the current balance valued at the most recent change in
    /// exchange rate. For AAVE it equals the accrued interest
    pub async fn profit(&self, holder: Address, asset: Address) -> Result<Earnings, LedgerError> {
        let asset = self.asset(asset)?;
        if asset.platform == Platform::Aave {
            return Ok(self.aave_earned(asset, holder).await);
        }

        Ok(self.latest_profit(asset, holder).await.unwrap_or_else(|e| {
            warn!("failed to compute {} profit of {holder:#x}: {e}", asset.symbol);
            self.unavailable(holder, asset)
        }))
    }

    /// Value the current balance at the latest change in exchange rate
    async fn latest_profit(&self, asset: &Asset, holder: Address) -> Result<Earnings, LedgerError> {
        let ledger = self.sync(holder, asset.address).await?;
        let block_number = ledger.last_synced_block().unwrap_or_default();
        let Some(delta) = ledger.latest_rate_delta() else {
            return Ok(Earnings { value: None, block_number });
        };

        let balance = self.reader.token_balance(asset, holder, Some(block_number)).await?;
        let value = Some(RateReader::to_tokens(asset, balance) * delta);
        Ok(Earnings { value, block_number })
    }

    /// AAVE positions rebase, so their interest is the balance in excess of
    /// the principal
    async fn aave_earned(&self, asset: &Asset, holder: Address) -> Earnings {
        self.read_aave_earned(asset, holder).await.unwrap_or_else(|e| {
            warn!("failed to read {} balances of {holder:#x}: {e}", asset.symbol);
            Earnings::default()
        })
    }

    /// Read the AAVE balance and principal at the same block
    async fn read_aave_earned(
        &self,
        asset: &Asset,
        holder: Address,
    ) -> Result<Earnings, LedgerError> {
        let block_number = self.client.block_number().await?;
        let (balance, principal) = futures::try_join!(
            self.reader.token_balance(asset, holder, Some(block_number)),
            self.reader.principal_balance(asset, holder, Some(block_number)),
        )?;

        let earned =
            RateReader::to_tokens(asset, balance) - RateReader::to_tokens(asset, principal);
        Ok(Earnings { value: Some(earned), block_number })
    }

    /// A null figure at the stored ledger's block
    fn unavailable(&self, holder: Address, asset: &Asset) -> Earnings {
        let key = LedgerKey { chain_id: self.chain_id, holder, asset: asset.address };
        let block_number = self.store.get(&key).last_synced_block().unwrap_or_default();
        Earnings { value: None, block_number }
    }

    // ------------
    // | Balances |
    // ------------

    /// The holder's balance in an asset, valued in underlying at the same
    /// block
    pub async fn balance(&self, holder: Address, asset: Address) -> Result<Balance, LedgerError> {
        let asset = self.asset(asset)?;
        Ok(self.read_balance(asset, holder).await.unwrap_or_else(|e| {
            warn!("failed to read {} balance of {holder:#x}: {e}", asset.symbol);
            Balance::default()
        }))
    }

    /// Read the balance, then the exchange rate at the balance's block
    async fn read_balance(&self, asset: &Asset, holder: Address) -> Result<Balance, LedgerError> {
        let block_number = self.client.block_number().await?;
        let raw = self.reader.token_balance(asset, holder, Some(block_number)).await?;
        let tokens = RateReader::to_tokens(asset, raw);

        let underlying_value = match self.reader.exchange_rate(asset, Some(block_number)).await {
            Ok(rate) => Some(&tokens * rate),
            Err(e) => {
                warn!("failed to read {} exchange rate: {e}", asset.symbol);
                None
            },
        };
        Ok(Balance { tokens: Some(tokens), underlying_value, block_number })
    }

    /// The holder's balance and accrued interest in every asset on the
    /// engine's chain, ordered by symbol
    pub async fn positions(&self, holder: Address) -> Result<Vec<Position>, LedgerError> {
        let mut assets: Vec<&Asset> = self.registry.assets(self.chain_id).collect();
        assets.sort_by_key(|asset| asset.symbol);

        try_join_all(assets.into_iter().map(|asset| async move {
            let (balance, earnings) = futures::try_join!(
                self.balance(holder, asset.address),
                self.earned(holder, asset.address),
            )?;
            Ok::<_, LedgerError>(Position { asset: asset.address, balance, earnings })
        }))
        .await
    }

    // ---------
    // | Rates |
    // ---------

    /// The asset's current supply APR as a fraction, `None` if unreadable
    pub async fn apr(&self, asset: Address) -> Result<Option<BigDecimal>, LedgerError> {
        let asset = self.asset(asset)?;
        match self.reader.apr(asset).await {
            Ok(apr) => Ok(Some(apr)),
            Err(e) => {
                warn!("failed to read {} APR: {e}", asset.symbol);
                Ok(None)
            },
        }
    }

    /// The asset's current exchange rate, `None` if unreadable
    pub async fn exchange_rate(&self, asset: Address) -> Result<Option<BigDecimal>, LedgerError> {
        let asset = self.asset(asset)?;
        match self.reader.exchange_rate(asset, None).await {
            Ok(rate) => Ok(Some(rate)),
            Err(e) => {
                warn!("failed to read {} exchange rate: {e}", asset.symbol);
                Ok(None)
            },
        }
    }
}
