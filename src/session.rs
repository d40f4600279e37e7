//! Game session: day counter, termination, snapshots and trade history.
//!
//! The session owns the market, the portfolio and the random source. A
//! presentation layer drives it through [`GameSession::buy`],
//! [`GameSession::sell`], [`GameSession::advance_day`] and
//! [`GameSession::restart`], and polls the read models for rendering.

use chrono::Local;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use tracing::{info, warn};

use crate::catalog::{MarketSettings, StockCatalog};
use crate::error::TransactionError;
use crate::portfolio::{Fill, Portfolio, CASH_EPSILON};
use crate::random::{RandomSource, RngSource};
use crate::types::{HoldingView, MarketQuote, SessionSnapshot, SessionState, TradeRecord};

/// When a game ends. Exactly one policy is active per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum TerminationPolicy {
    /// Over once the day counter reaches `last_day`.
    DayLimit {
        #[serde(default = "default_last_day")]
        last_day: u32,
    },
    /// Over once cash is spent and nothing is held.
    Bankrupt,
}

fn default_last_day() -> u32 {
    20
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        TerminationPolicy::DayLimit {
            last_day: default_last_day(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameSettings {
    pub starting_cash: f64,
    pub termination: TerminationPolicy,
    pub market: MarketSettings,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            starting_cash: 1000.0,
            termination: TerminationPolicy::default(),
            market: MarketSettings::default(),
        }
    }
}

pub struct GameSession<R = RngSource<ChaCha8Rng>> {
    settings: GameSettings,
    rng: R,
    catalog: StockCatalog,
    portfolio: Portfolio,
    day_number: u32,
    state: SessionState,
    previous_cash: f64,
    previous_portfolio_value: f64,
    history: Vec<TradeRecord>,
}

impl GameSession {
    pub fn seeded(settings: GameSettings, seed: u64) -> Self {
        Self::new(settings, RngSource::seeded(seed))
    }

    pub fn from_entropy(settings: GameSettings) -> Self {
        Self::new(settings, RngSource::from_entropy())
    }
}

impl<R: RandomSource> GameSession<R> {
    /// Starts day 1 with a freshly generated market.
    pub fn new(settings: GameSettings, mut rng: R) -> Self {
        let catalog = StockCatalog::generate(&settings.market, &mut rng);
        let portfolio = Portfolio::new(settings.starting_cash);
        let previous_cash = settings.starting_cash;
        Self {
            settings,
            rng,
            catalog,
            portfolio,
            day_number: 1,
            state: SessionState::Active,
            previous_cash,
            previous_portfolio_value: 0.0,
            history: Vec::new(),
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn day_number(&self) -> u32 {
        self.day_number
    }

    pub fn catalog(&self) -> &StockCatalog {
        &self.catalog
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn history(&self) -> &[TradeRecord] {
        &self.history
    }

    pub fn list_market_stocks(&self) -> Vec<MarketQuote> {
        self.catalog.quotes()
    }

    pub fn list_holdings(&self) -> Vec<HoldingView> {
        self.portfolio.holdings()
    }

    pub fn portfolio_value(&self) -> f64 {
        self.portfolio.current_value(&self.catalog)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let portfolio_value = self.portfolio_value();
        SessionSnapshot {
            day_number: self.day_number,
            available_cash: self.portfolio.cash(),
            portfolio_value,
            previous_cash: self.previous_cash,
            previous_portfolio_value: self.previous_portfolio_value,
            state: self.state,
            net_worth: self.portfolio.cash() + portfolio_value,
            realized_pl: self.history.iter().map(|t| t.realized_pl).sum(),
        }
    }

    fn ensure_active(&self) -> Result<(), TransactionError> {
        if self.state == SessionState::GameOver {
            warn!("Trade rejected: game over on day {}", self.day_number);
            return Err(TransactionError::GameOver);
        }
        Ok(())
    }

    fn record(&mut self, fill: Fill) -> TradeRecord {
        let rec = TradeRecord {
            day: self.day_number,
            side: fill.side,
            symbol: fill.symbol,
            tier: fill.tier,
            cash_amount: fill.cash_amount,
            shares: fill.shares,
            price: fill.price,
            realized_pl: fill.realized_pl,
            executed_at: Local::now(),
        };
        self.history.push(rec.clone());
        rec
    }

    /// Spends `cash_amount` on the listed stock `symbol` at its market price.
    pub fn buy(
        &mut self,
        symbol: &str,
        cash_amount: f64,
    ) -> Result<TradeRecord, TransactionError> {
        self.ensure_active()?;
        let stock = self
            .catalog
            .find_by_symbol(symbol)
            .ok_or_else(|| TransactionError::UnknownSymbol(symbol.to_string()))?;
        let fill = self.portfolio.buy(stock, cash_amount)?;
        Ok(self.record(fill))
    }

    /// Sells `cash_amount` worth of a held stock.
    pub fn sell(
        &mut self,
        symbol: &str,
        cash_amount: f64,
    ) -> Result<TradeRecord, TransactionError> {
        self.ensure_active()?;
        let fill = self.portfolio.sell(symbol, cash_amount)?;
        Ok(self.record(fill))
    }

    pub fn sell_all(&mut self, symbol: &str) -> Result<TradeRecord, TransactionError> {
        self.ensure_active()?;
        let fill = self.portfolio.sell_all(symbol)?;
        Ok(self.record(fill))
    }

    /// Moves the market one day and re-prices held positions.
    /// A finished game stays finished until [`restart`](Self::restart).
    pub fn advance_day(&mut self) -> SessionState {
        if self.state == SessionState::GameOver {
            return self.state;
        }

        self.previous_cash = self.portfolio.cash();
        self.previous_portfolio_value = self.portfolio_value();

        self.catalog.advance_day(&mut self.rng);
        self.portfolio.sync_prices(&self.catalog);
        self.day_number += 1;

        if self.is_terminal() {
            self.state = SessionState::GameOver;
        }
        info!(
            "Day {}: cash ${:.2}, portfolio ${:.2}, state {:?}",
            self.day_number,
            self.portfolio.cash(),
            self.portfolio_value(),
            self.state
        );
        self.state
    }

    fn is_terminal(&self) -> bool {
        match self.settings.termination {
            TerminationPolicy::DayLimit { last_day } => self.day_number >= last_day,
            TerminationPolicy::Bankrupt => {
                self.portfolio.cash() <= CASH_EPSILON && self.portfolio.is_empty()
            }
        }
    }

    /// Back to day 1 with starting cash, an empty portfolio and a new market.
    pub fn restart(&mut self) {
        self.catalog.regenerate(&self.settings.market, &mut self.rng);
        self.portfolio = Portfolio::new(self.settings.starting_cash);
        self.day_number = 1;
        self.state = SessionState::Active;
        self.previous_cash = self.settings.starting_cash;
        self.previous_portfolio_value = 0.0;
        self.history.clear();
        info!("Game restarted");
    }
}
