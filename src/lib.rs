pub mod account;
pub mod audit;
pub mod auth;
pub mod console;
pub mod error;
pub mod ledger;
pub mod translog;
pub mod wallet;

pub use error::Error;
pub use wallet::Wallet;
