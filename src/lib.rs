//! Single-player stock market game core: a market of synthetic stocks with
//! tiered random price moves, a cash-and-holdings portfolio, and a day-based
//! session. Presentation layers poll the session and render its read models.

pub mod catalog;
pub mod config;
pub mod error;
pub mod portfolio;
pub mod random;
pub mod session;
pub mod stock;
pub mod types;

pub use catalog::{MarketSettings, StockCatalog};
pub use error::TransactionError;
pub use portfolio::Portfolio;
pub use random::{RandomSource, RngSource};
pub use session::{GameSession, GameSettings, TerminationPolicy};
pub use stock::Stock;
pub use types::{
    HoldingView, MarketQuote, RiskTier, SessionSnapshot, SessionState, Side, TradeRecord,
};
