//! Core domain types: risk tiers, trade sides, read models for the presentation layer.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

/// Parameters of the daily price-update rule. Percentages are in percent units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierParams {
    pub min_fluctuation: f64,
    pub max_fluctuation: f64,
    pub growth_bias: f64,
    pub price_floor: f64,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Medium, RiskTier::High];

    pub const fn params(self) -> TierParams {
        match self {
            RiskTier::Low => TierParams {
                min_fluctuation: 1.0,
                max_fluctuation: 20.0,
                growth_bias: 1.0,
                price_floor: 0.1,
            },
            RiskTier::Medium => TierParams {
                min_fluctuation: 25.0,
                max_fluctuation: 50.0,
                growth_bias: 0.05,
                price_floor: 0.1,
            },
            RiskTier::High => TierParams {
                min_fluctuation: 75.0,
                max_fluctuation: 150.0,
                growth_bias: 0.0,
                price_floor: 0.0,
            },
        }
    }

    pub const fn price_floor(self) -> f64 {
        self.params().price_floor
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    GameOver,
}

/// One row of the market listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MarketQuote {
    pub symbol: String,
    pub tier: RiskTier,
    pub price: f64,
}

/// One row of the holdings listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HoldingView {
    pub symbol: String,
    pub tier: RiskTier,
    pub total_value: f64,
    pub quantity_owned: f64,
    pub price: f64,
    /// Weighted-average purchase price per share.
    pub avg_cost: f64,
    pub unrealized_pl: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionSnapshot {
    pub day_number: u32,
    pub available_cash: f64,
    pub portfolio_value: f64,
    pub previous_cash: f64,
    pub previous_portfolio_value: f64,
    pub state: SessionState,
    pub net_worth: f64,
    pub realized_pl: f64,
}

/// A completed transaction. `realized_pl` is zero for buys.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TradeRecord {
    pub day: u32,
    pub side: Side,
    pub symbol: String,
    pub tier: RiskTier,
    pub cash_amount: f64,
    pub shares: f64,
    pub price: f64,
    pub realized_pl: f64,
    pub executed_at: DateTime<Local>,
}
