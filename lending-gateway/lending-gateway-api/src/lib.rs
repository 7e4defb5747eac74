//! The API for the lending gateway server
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

mod serialization;
mod types;
pub use types::*;
