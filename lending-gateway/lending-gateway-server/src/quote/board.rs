//! Tracks the newest quote per client session, discarding results of
//! superseded requests and marking quotes stale as the chain advances

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use alloy_primitives::{Address, U256};
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::Quote;

/// The input a quote was computed for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuoteInput {
    /// The target asset
    pub asset: Address,
    /// The deposit amount, in wei
    pub amount: U256,
    /// The referral beneficiary, if any
    pub referral: Option<Address>,
}

/// A handle on an in-flight quote request
#[derive(Clone, Debug)]
pub struct QuoteTicket {
    /// The session the request belongs to
    session: String,
    /// The generation of the request within its session
    generation: u64,
    /// The input of the request
    input: QuoteInput,
}

/// A published quote
#[derive(Clone, Debug)]
pub struct StoredQuote {
    /// The input the quote was computed for
    pub input: QuoteInput,
    /// The quote
    pub quote: Quote,
    /// The block the routes were simulated at
    pub block_number: u64,
    /// Whether the chain has advanced since the quote was computed
    pub stale: bool,
}

/// The state of a single session
#[derive(Debug)]
struct SessionEntry {
    /// The generation of the newest request
    generation: u64,
    /// The newest published quote, cleared when a new request begins
    quote: Option<StoredQuote>,
}

/// The newest quote of every session
#[derive(Clone, Default)]
pub struct QuoteBoard {
    /// Session state by session id
    sessions: Arc<DashMap<String, SessionEntry>>,
    /// The newest block quotes have been expired against
    head: Arc<AtomicU64>,
}

impl QuoteBoard {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a quote request, superseding any in-flight or published quote
    /// of the session
    pub fn begin(&self, session: &str, input: QuoteInput) -> QuoteTicket {
        let mut entry = self
            .sessions
            .entry(session.to_string())
            .or_insert_with(|| SessionEntry { generation: 0, quote: None });
        entry.generation += 1;
        entry.quote = None;

        QuoteTicket { session: session.to_string(), generation: entry.generation, input }
    }

    /// Publish the result of a request
    ///
    /// Returns `false`, discarding the result, if a newer request has begun
    /// for the session since the ticket was issued. A quote computed before
    /// the newest expired block is stored already stale
    pub fn publish(&self, ticket: &QuoteTicket, quote: Option<Quote>, block_number: u64) -> bool {
        let Some(mut entry) = self.sessions.get_mut(&ticket.session) else {
            return false;
        };
        if entry.generation != ticket.generation {
            debug!(session = %ticket.session, "discarding superseded quote");
            return false;
        }

        let stale = block_number < self.head.load(Ordering::Acquire);
        entry.quote = quote.map(|quote| StoredQuote {
            input: ticket.input.clone(),
            quote,
            block_number,
            stale,
        });
        true
    }

    /// The newest published quote of a session
    pub fn current(&self, session: &str) -> Option<StoredQuote> {
        self.sessions.get(session).and_then(|entry| entry.quote.clone())
    }

    /// Mark every quote computed before the given block as stale, returning
    /// the number newly marked
    pub fn mark_stale_before(&self, block_number: u64) -> usize {
        self.head.fetch_max(block_number, Ordering::AcqRel);
        let mut marked = 0;
        for mut entry in self.sessions.iter_mut() {
            if let Some(stored) = entry.quote.as_mut() {
                if !stored.stale && stored.block_number < block_number {
                    stored.stale = true;
                    marked += 1;
                }
            }
        }
        marked
    }

    /// Spawn a task marking quotes stale as new blocks arrive
    pub fn spawn_expiry(&self, mut blocks: watch::Receiver<u64>) {
        let board = self.clone();
        tokio::spawn(async move {
            while blocks.changed().await.is_ok() {
                let block = *blocks.borrow_and_update();
                let marked = board.mark_stale_before(block);
                if marked > 0 {
                    debug!("marked {marked} quotes stale at block {block}");
                }
            }
            warn!("block stream ended, quotes will no longer expire");
        });
    }
}
