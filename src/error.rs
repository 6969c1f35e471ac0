use rust_decimal::Decimal;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Account {0} already exists")]
    AccountExists(String),

    #[error("Account {0} not found")]
    AccountNotFound(String),

    #[error("Invalid amount {0}: deposits and withdrawals must be positive")]
    InvalidAmount(Decimal),

    #[error("Invalid request id {0:?}")]
    InvalidRequestId(String),

    #[error("Insufficient funds for {player}: available {available}, requested {requested}")]
    InsufficientFunds {
        player: String,
        available: Decimal,
        requested: Decimal,
    },
}
