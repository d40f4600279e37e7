//! Typed failures of buy/sell requests. None of them mutate state.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransactionError {
    #[error("invalid amount {0}: must be a positive number")]
    InvalidAmount(f64),

    #[error("not enough cash: requested ${requested:.2}, available ${available:.2}")]
    InsufficientFunds { requested: f64, available: f64 },

    #[error("not enough shares of {symbol}: requested {requested:.4}, holding {held:.4}")]
    InsufficientShares {
        symbol: String,
        requested: f64,
        held: f64,
    },

    #[error("{0} is not in the portfolio")]
    NotFound(String),

    #[error("{0} is not listed on the market")]
    UnknownSymbol(String),

    #[error("{symbol} has no tradable price ({price})")]
    InvalidPrice { symbol: String, price: f64 },

    #[error("the game is over; restart to trade again")]
    GameOver,
}
