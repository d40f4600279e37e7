//! A tradable stock and its tier-driven daily price move.

use tracing::debug;

use crate::random::RandomSource;
use crate::types::RiskTier;

#[derive(Debug, Clone, PartialEq)]
pub struct Stock {
    symbol: String,
    price: f64,
    quantity_owned: f64,
    tier: RiskTier,
}

impl Stock {
    pub fn new(symbol: impl Into<String>, price: f64, quantity_owned: f64, tier: RiskTier) -> Self {
        Self {
            symbol: symbol.into(),
            price: price.max(0.0),
            quantity_owned: quantity_owned.max(0.0),
            tier,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn quantity_owned(&self) -> f64 {
        self.quantity_owned
    }

    pub fn tier(&self) -> RiskTier {
        self.tier
    }

    /// Market value of the owned quantity at the current price.
    pub fn holding_value(&self) -> f64 {
        self.quantity_owned * self.price
    }

    pub(crate) fn set_price(&mut self, price: f64) {
        self.price = price.max(0.0);
    }

    pub(crate) fn set_quantity_owned(&mut self, quantity: f64) {
        self.quantity_owned = quantity.max(0.0);
    }

    /// Applies one day's move. Draws the fluctuation first, then the direction;
    /// the floor clamp is the last step.
    pub fn update_price<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        let p = self.tier.params();
        let spread = p.max_fluctuation - p.min_fluctuation;
        let fluctuation = p.min_fluctuation + spread * rng.next_unit();
        let goes_up = rng.next_bool();
        let sign = if goes_up { 1.0 } else { -1.0 };
        let adjusted = sign * fluctuation + p.growth_bias;

        let new_price = (self.price * (1.0 + adjusted / 100.0)).max(p.price_floor);
        debug!(
            "{} [{}] {:.4} -> {:.4} ({:+.2}%)",
            self.symbol, self.tier, self.price, new_price, adjusted
        );
        self.price = new_price;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{RngSource, ScriptedSource};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn low_tier_up_move_adds_bias() {
        // U = 0.5 -> 1 + 19 * 0.5 = 10.5%, up, +1% bias -> +11.5%
        let mut s = Stock::new("ABC", 100.0, 0.0, RiskTier::Low);
        let mut rng = ScriptedSource::new(vec![0.5], vec![true], vec![]);
        s.update_price(&mut rng);
        assert!(approx(s.price(), 111.5));
    }

    #[test]
    fn medium_tier_down_move() {
        // U = 0.0 -> 25%, down, +0.05% -> -24.95%
        let mut s = Stock::new("MID", 200.0, 0.0, RiskTier::Medium);
        let mut rng = ScriptedSource::new(vec![0.0], vec![false], vec![]);
        s.update_price(&mut rng);
        assert!(approx(s.price(), 150.1));
    }

    #[test]
    fn high_tier_crash_clamps_to_zero() {
        // U = 0.9 -> 142.5%, down -> price would go negative
        let mut s = Stock::new("HI", 50.0, 0.0, RiskTier::High);
        let mut rng = ScriptedSource::new(vec![0.9], vec![false], vec![]);
        s.update_price(&mut rng);
        assert_eq!(s.price(), 0.0);
    }

    #[test]
    fn low_tier_floor_applies_last() {
        let mut s = Stock::new("TINY", 0.1, 0.0, RiskTier::Low);
        let mut rng = ScriptedSource::new(vec![0.99], vec![false], vec![]);
        s.update_price(&mut rng);
        assert_eq!(s.price(), 0.1);
    }

    #[test]
    fn price_never_below_floor_for_any_draw() {
        let mut rng = RngSource::seeded(2024);
        for tier in RiskTier::ALL {
            let mut s = Stock::new("X", 500.0, 0.0, tier);
            for _ in 0..2_000 {
                s.update_price(&mut rng);
                assert!(s.price() >= tier.price_floor(), "{tier} fell to {}", s.price());
            }
        }
    }

    #[test]
    fn constructor_rejects_negative_values() {
        let s = Stock::new("NEG", -5.0, -1.0, RiskTier::High);
        assert_eq!(s.price(), 0.0);
        assert_eq!(s.quantity_owned(), 0.0);
    }
}
