//! API types for the lending gateway

pub mod earnings;
pub mod quote;
pub mod swap;

pub use earnings::*;
pub use quote::*;
pub use swap::*;

/// The ping route
pub const PING_ROUTE: &str = "ping";
