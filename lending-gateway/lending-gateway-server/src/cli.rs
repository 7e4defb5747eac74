//! The CLI for the lending gateway server

use std::{path::PathBuf, time::Duration};

use alloy_primitives::Address;
use clap::Parser;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Lending gateway server
#[rustfmt::skip]
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    // --- Chain Config --- //

    /// The RPC URL of the chain node
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: String,
    /// The chain to serve
    #[arg(long, env = "CHAIN_ID", default_value_t = 1)]
    pub chain_id: u64,
    /// The private key to sign transactions with
    ///
    /// When omitted, transactions are sent through the node from
    /// `--from-address`
    #[arg(long, env = "PRIVATE_KEY")]
    pub private_key: Option<String>,
    /// The node-managed account to send transactions from when no private key
    /// is configured
    #[arg(long, env = "FROM_ADDRESS")]
    pub from_address: Option<Address>,
    /// The bound on each RPC request, in milliseconds
    #[arg(long, env = "RPC_TIMEOUT_MS", default_value_t = 10_000)]
    pub rpc_timeout_ms: u64,

    // --- Engine Config --- //

    /// An ethgasstation-style gas price endpoint, the node's gas price is used
    /// when omitted or unreachable
    #[arg(long, env = "GAS_PRICE_URL")]
    pub gas_price_url: Option<String>,
    /// A JSON file mapping referral codes to beneficiary addresses
    #[arg(long, env = "REFERRAL_LIST_FILE")]
    pub referral_list_file: Option<PathBuf>,
    /// The interval at which to poll for new blocks, in milliseconds
    #[arg(long, env = "BLOCK_POLLING_INTERVAL_MS", default_value_t = 8_000)]
    pub block_polling_interval_ms: u64,
    /// The interval at which to poll for transaction receipts, in milliseconds
    #[arg(long, env = "RECEIPT_POLL_INTERVAL_MS", default_value_t = 2_000)]
    pub receipt_poll_interval_ms: u64,
    /// How long to wait for a transaction to be mined, in milliseconds
    #[arg(long, env = "CONFIRMATION_TIMEOUT_MS", default_value_t = 600_000)]
    pub confirmation_timeout_ms: u64,

    // --- Server --- //

    /// Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    // --- Telemetry --- //

    /// The log filter, in `RUST_LOG` syntax
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,
    /// Whether to emit JSON-formatted logs
    #[arg(long, env = "JSON_LOGS")]
    pub json_logs: bool,
}

impl Cli {
    /// Configure the logging subscriber from the CLI
    pub fn configure_telemetry(&self) {
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .parse_lossy(&self.log_filter);

        let registry = tracing_subscriber::registry().with(filter);
        if self.json_logs {
            registry
                .with(
                    fmt::layer().with_file(true).with_line_number(true).json().flatten_event(true),
                )
                .init();
        } else {
            registry.with(fmt::layer()).init();
        }
    }

    /// The RPC request timeout
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    /// The block polling interval
    pub fn block_polling_interval(&self) -> Duration {
        Duration::from_millis(self.block_polling_interval_ms)
    }

    /// The receipt polling interval
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    /// The confirmation timeout
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }
}
