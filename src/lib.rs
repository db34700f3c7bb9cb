pub mod api;
pub mod audit;
pub mod config;
pub mod database;
pub mod error;
pub mod events;
pub mod verification;

pub use error::LedgerError;
