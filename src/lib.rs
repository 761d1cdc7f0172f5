//! wealthflow keeps track of accounts held in several currencies and assets, converts their
//! balances into one base unit through user-defined exchange rates, and rolls them up into
//! portfolio totals. All state lives in one local JSON document.

pub mod args;
mod backup;
pub mod commands;
mod config;
mod error;
pub mod fx;
pub mod model;
pub mod portfolio;
pub mod store;
mod utils;

#[cfg(test)]
mod test;

pub use config::Config;
pub use error::Error;
pub use error::Result;
