//! The market universe: generation, daily moves and symbol lookup.

use std::collections::HashSet;
use tracing::{info, warn};

use crate::random::RandomSource;
use crate::stock::Stock;
use crate::types::{MarketQuote, RiskTier};

const MAX_SYMBOL_LEN: u32 = 5;
const SYMBOL_RETRIES: usize = 64;

/// How a fresh market is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSettings {
    pub stocks_per_tier: usize,
    /// Initial prices are uniform in `[0, max_initial_price)`.
    pub max_initial_price: f64,
    pub unique_symbols: bool,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            stocks_per_tier: 33,
            max_initial_price: 1000.0,
            unique_symbols: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StockCatalog {
    stocks: Vec<Stock>,
}

impl StockCatalog {
    pub fn generate<R: RandomSource + ?Sized>(settings: &MarketSettings, rng: &mut R) -> Self {
        let mut me = Self::default();
        me.regenerate(settings, rng);
        me
    }

    /// Replaces the market with `stocks_per_tier` stocks of each tier,
    /// interleaved Low, Medium, High. Each stock draws its symbol, then its price.
    pub fn regenerate<R: RandomSource + ?Sized>(&mut self, settings: &MarketSettings, rng: &mut R) {
        self.stocks.clear();
        let mut seen = HashSet::new();
        for _ in 0..settings.stocks_per_tier {
            for tier in RiskTier::ALL {
                let symbol = if settings.unique_symbols {
                    unique_symbol(rng, &seen)
                } else {
                    random_symbol(rng)
                };
                seen.insert(symbol.clone());
                let price = rng.next_unit() * settings.max_initial_price;
                self.stocks.push(Stock::new(symbol, price, 0.0, tier));
            }
        }
        info!("Market regenerated with {} stocks", self.stocks.len());
    }

    /// Moves every price by one day, in listing order.
    pub fn advance_day<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        for stock in self.stocks.iter_mut() {
            stock.update_price(rng);
        }
    }

    /// First stock listed under `symbol`. Matching is case-insensitive.
    pub fn find_by_symbol(&self, symbol: &str) -> Option<&Stock> {
        self.stocks
            .iter()
            .find(|s| s.symbol().eq_ignore_ascii_case(symbol))
    }

    pub fn price_of(&self, symbol: &str) -> Option<f64> {
        self.find_by_symbol(symbol).map(Stock::price)
    }

    pub fn stocks(&self) -> &[Stock] {
        &self.stocks
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    pub fn quotes(&self) -> Vec<MarketQuote> {
        self.stocks
            .iter()
            .map(|s| MarketQuote {
                symbol: s.symbol().to_string(),
                tier: s.tier(),
                price: s.price(),
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn from_stocks(stocks: Vec<Stock>) -> Self {
        Self { stocks }
    }

    #[cfg(test)]
    pub(crate) fn set_price(&mut self, symbol: &str, price: f64) {
        if let Some(s) = self
            .stocks
            .iter_mut()
            .find(|s| s.symbol().eq_ignore_ascii_case(symbol))
        {
            s.set_price(price);
        }
    }
}

/// 1 to 5 uppercase letters, length and letters uniform.
pub fn random_symbol<R: RandomSource + ?Sized>(rng: &mut R) -> String {
    let len = rng.next_below(MAX_SYMBOL_LEN) + 1;
    (0..len)
        .map(|_| char::from(b'A' + rng.next_below(26) as u8))
        .collect()
}

fn unique_symbol<R: RandomSource + ?Sized>(rng: &mut R, seen: &HashSet<String>) -> String {
    let mut symbol = random_symbol(rng);
    for _ in 0..SYMBOL_RETRIES {
        if !seen.contains(&symbol) {
            return symbol;
        }
        symbol = random_symbol(rng);
    }
    warn!("Giving up on a unique symbol, keeping duplicate {}", symbol);
    symbol
}
