//! Routes ETH deposits through the lending gateway paying the most of a
//! target yield-bearing asset, and accounts for the yield a holder has
//! accrued in those assets
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(unsafe_code)]
#![deny(clippy::needless_pass_by_value)]

pub mod abis;
pub mod block_watcher;
pub mod chain_client;
pub mod cli;
pub mod error;
pub mod gas;
pub mod handlers;
pub mod helpers;
pub mod middleware;
pub mod quote;
pub mod registry;
pub mod server;
pub mod swap;
pub mod yield_accounting;
