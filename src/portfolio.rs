//! Player holdings and cash. Positions keep a weighted-average cost for P/L.

use tracing::{info, warn};

use crate::catalog::StockCatalog;
use crate::error::TransactionError;
use crate::stock::Stock;
use crate::types::{HoldingView, RiskTier, Side};

/// Quantities at or below this are treated as zero.
pub const SHARE_EPSILON: f64 = 1e-9;
/// Cash at or below this counts as spent.
pub const CASH_EPSILON: f64 = 1e-9;
/// Share slack relative to the position size. Large positions at tiny
/// prices accumulate rounding well above [`SHARE_EPSILON`].
const SHARE_RELATIVE_SLACK: f64 = 1e-9;

/// Slack for comparing share quantities against a holding of `held`.
fn share_tolerance(held: f64) -> f64 {
    (held * SHARE_RELATIVE_SLACK).max(SHARE_EPSILON)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub stock: Stock,
    /// Weighted-average purchase price per share.
    pub avg_cost: f64,
}

impl Position {
    pub fn unrealized_pl(&self) -> f64 {
        (self.stock.price() - self.avg_cost) * self.stock.quantity_owned()
    }
}

/// Outcome of a successful transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub side: Side,
    pub symbol: String,
    pub tier: RiskTier,
    pub cash_amount: f64,
    pub shares: f64,
    pub price: f64,
    pub realized_pl: f64,
    /// The position is gone after this fill.
    pub closed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Portfolio {
    positions: Vec<Position>,
    cash: f64,
}

fn check_amount(cash_amount: f64) -> Result<(), TransactionError> {
    if !cash_amount.is_finite() || cash_amount <= 0.0 {
        return Err(TransactionError::InvalidAmount(cash_amount));
    }
    Ok(())
}

impl Portfolio {
    pub fn new(cash: f64) -> Self {
        Self {
            positions: Vec::new(),
            cash: cash.max(0.0),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions
            .iter()
            .find(|p| p.stock.symbol().eq_ignore_ascii_case(symbol))
    }

    fn index_of(&self, symbol: &str) -> Option<usize> {
        self.positions
            .iter()
            .position(|p| p.stock.symbol().eq_ignore_ascii_case(symbol))
    }

    /// Spends `cash_amount` on `stock` at its current price.
    pub fn buy(&mut self, stock: &Stock, cash_amount: f64) -> Result<Fill, TransactionError> {
        check_amount(cash_amount)?;
        if cash_amount > self.cash {
            return Err(TransactionError::InsufficientFunds {
                requested: cash_amount,
                available: self.cash,
            });
        }
        let price = stock.price();
        if price <= 0.0 {
            return Err(TransactionError::InvalidPrice {
                symbol: stock.symbol().to_string(),
                price,
            });
        }

        let shares = cash_amount / price;
        self.cash -= cash_amount;

        match self.index_of(stock.symbol()) {
            Some(i) => {
                let pos = &mut self.positions[i];
                let held = pos.stock.quantity_owned();
                let total_cost = pos.avg_cost * held + cash_amount;
                let quantity = held + shares;
                pos.stock.set_quantity_owned(quantity);
                pos.avg_cost = total_cost / quantity;
            }
            None => self.positions.push(Position {
                stock: Stock::new(stock.symbol(), price, shares, stock.tier()),
                avg_cost: price,
            }),
        }

        info!("BUY {} {:.4} sh @ {:.2} for ${:.2}", stock.symbol(), shares, price, cash_amount);
        Ok(Fill {
            side: Side::Buy,
            symbol: stock.symbol().to_string(),
            tier: stock.tier(),
            cash_amount,
            shares,
            price,
            realized_pl: 0.0,
            closed: false,
        })
    }

    /// Sells `cash_amount` worth of `symbol` at the held (market-synced) price.
    /// All or nothing: there is no partial fallback.
    pub fn sell(&mut self, symbol: &str, cash_amount: f64) -> Result<Fill, TransactionError> {
        check_amount(cash_amount)?;
        let i = self
            .index_of(symbol)
            .ok_or_else(|| TransactionError::NotFound(symbol.to_string()))?;
        let pos = &self.positions[i];
        let price = pos.stock.price();
        if price <= 0.0 {
            return Err(TransactionError::InvalidPrice {
                symbol: pos.stock.symbol().to_string(),
                price,
            });
        }

        let shares = cash_amount / price;
        let held = pos.stock.quantity_owned();
        let tolerance = share_tolerance(held);
        if shares > held + tolerance {
            warn!("Rejected sell of {:.4} {} (holding {:.4})", shares, symbol, held);
            return Err(TransactionError::InsufficientShares {
                symbol: pos.stock.symbol().to_string(),
                requested: shares,
                held,
            });
        }

        // Selling everything but rounding dust closes the position.
        let shares = if held - shares <= tolerance { held } else { shares };
        Ok(self.close_out(i, shares, cash_amount))
    }

    /// Sells the whole position at the current price. Never fails for a held symbol.
    pub fn sell_all(&mut self, symbol: &str) -> Result<Fill, TransactionError> {
        let i = self
            .index_of(symbol)
            .ok_or_else(|| TransactionError::NotFound(symbol.to_string()))?;
        let held = self.positions[i].stock.quantity_owned();
        let proceeds = self.positions[i].stock.holding_value();
        Ok(self.close_out(i, held, proceeds))
    }

    fn close_out(&mut self, i: usize, shares: f64, proceeds: f64) -> Fill {
        let pos = &mut self.positions[i];
        let price = pos.stock.price();
        let realized_pl = (price - pos.avg_cost) * shares;
        let held = pos.stock.quantity_owned();
        let remaining = held - shares;
        pos.stock.set_quantity_owned(remaining);

        let fill = Fill {
            side: Side::Sell,
            symbol: pos.stock.symbol().to_string(),
            tier: pos.stock.tier(),
            cash_amount: proceeds,
            shares,
            price,
            realized_pl,
            closed: remaining <= share_tolerance(held),
        };

        self.cash += proceeds;
        if fill.closed {
            self.positions.remove(i);
        }
        info!(
            "SELL {} {:.4} sh @ {:.2} for ${:.2} (P/L {:+.2})",
            fill.symbol, shares, price, proceeds, realized_pl
        );
        fill
    }

    /// Σ quantity × market price; the stored price stands in for unlisted symbols.
    pub fn current_value(&self, catalog: &StockCatalog) -> f64 {
        self.positions
            .iter()
            .map(|p| {
                let price = catalog
                    .price_of(p.stock.symbol())
                    .unwrap_or_else(|| p.stock.price());
                p.stock.quantity_owned() * price
            })
            .sum()
    }

    /// Copies each listed market price onto the matching position.
    pub fn sync_prices(&mut self, catalog: &StockCatalog) {
        for pos in self.positions.iter_mut() {
            match catalog.price_of(pos.stock.symbol()) {
                Some(price) => pos.stock.set_price(price),
                None => warn!("{} missing from market, keeping stored price", pos.stock.symbol()),
            }
        }
    }

    pub fn holdings(&self) -> Vec<HoldingView> {
        self.positions
            .iter()
            .map(|p| HoldingView {
                symbol: p.stock.symbol().to_string(),
                tier: p.stock.tier(),
                total_value: p.stock.holding_value(),
                quantity_owned: p.stock.quantity_owned(),
                price: p.stock.price(),
                avg_cost: p.avg_cost,
                unrealized_pl: p.unrealized_pl(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn low(symbol: &str, price: f64) -> Stock {
        Stock::new(symbol, price, 0.0, RiskTier::Low)
    }

    #[test]
    fn buy_then_partial_sells_scenario() {
        let stock = low("ABC", 50.0);
        let mut pf = Portfolio::new(1000.0);

        pf.buy(&stock, 200.0).unwrap();
        assert!(approx(pf.position("ABC").unwrap().stock.quantity_owned(), 4.0));
        assert!(approx(pf.cash(), 800.0));

        pf.sell("ABC", 100.0).unwrap();
        assert!(approx(pf.position("ABC").unwrap().stock.quantity_owned(), 2.0));
        assert!(approx(pf.cash(), 900.0));

        let fill = pf.sell("ABC", 100.0).unwrap();
        assert!(fill.closed);
        assert!(pf.position("ABC").is_none());
        assert!(approx(pf.cash(), 1000.0));
    }

    #[test]
    fn buy_copies_market_price_and_tier() {
        let stock = Stock::new("HOT", 25.0, 0.0, RiskTier::High);
        let mut pf = Portfolio::new(100.0);
        pf.buy(&stock, 50.0).unwrap();
        let pos = pf.position("hot").unwrap();
        assert_eq!(pos.stock.tier(), RiskTier::High);
        assert_eq!(pos.stock.price(), 25.0);
        assert_eq!(stock.quantity_owned(), 0.0);
    }

    #[test]
    fn repeat_buys_accumulate_and_average_cost() {
        let mut pf = Portfolio::new(1000.0);
        pf.buy(&low("AVG", 10.0), 100.0).unwrap(); // 10 sh
        pf.buy(&low("AVG", 20.0), 100.0).unwrap(); // 5 sh
        assert_eq!(pf.positions().len(), 1);
        let pos = pf.position("AVG").unwrap();
        assert!(approx(pos.stock.quantity_owned(), 15.0));
        assert!(approx(pos.avg_cost, 200.0 / 15.0));
    }

    #[test]
    fn insufficient_funds_leaves_state_unchanged() {
        let mut pf = Portfolio::new(100.0);
        let err = pf.buy(&low("ABC", 10.0), 100.01).unwrap_err();
        assert!(matches!(err, TransactionError::InsufficientFunds { .. }));
        assert_eq!(pf.cash(), 100.0);
        assert!(pf.is_empty());
    }

    #[test]
    fn non_positive_amounts_rejected() {
        let mut pf = Portfolio::new(100.0);
        let s = low("ABC", 10.0);
        assert_eq!(pf.buy(&s, 0.0), Err(TransactionError::InvalidAmount(0.0)));
        assert_eq!(pf.buy(&s, -5.0), Err(TransactionError::InvalidAmount(-5.0)));
        assert!(matches!(pf.buy(&s, f64::NAN), Err(TransactionError::InvalidAmount(_))));
        pf.buy(&s, 50.0).unwrap();
        assert_eq!(pf.sell("ABC", 0.0), Err(TransactionError::InvalidAmount(0.0)));
    }

    #[test]
    fn zero_price_cannot_be_bought() {
        let mut pf = Portfolio::new(100.0);
        let err = pf.buy(&Stock::new("ZERO", 0.0, 0.0, RiskTier::High), 10.0).unwrap_err();
        assert!(matches!(err, TransactionError::InvalidPrice { .. }));
        assert_eq!(pf.cash(), 100.0);
    }

    #[test]
    fn selling_more_than_held_fails_without_mutation() {
        let mut pf = Portfolio::new(100.0);
        pf.buy(&low("ABC", 10.0), 50.0).unwrap();
        let before = pf.positions().to_vec();
        let err = pf.sell("ABC", 60.0).unwrap_err();
        assert!(matches!(err, TransactionError::InsufficientShares { .. }));
        assert_eq!(pf.positions(), &before[..]);
        assert!(approx(pf.cash(), 50.0));
    }

    #[test]
    fn selling_unknown_symbol_is_not_found() {
        let mut pf = Portfolio::new(100.0);
        assert_eq!(
            pf.sell("NOPE", 1.0),
            Err(TransactionError::NotFound("NOPE".into()))
        );
        assert_eq!(pf.sell_all("NOPE"), Err(TransactionError::NotFound("NOPE".into())));
    }

    #[test]
    fn buy_then_sell_all_restores_cash() {
        let mut pf = Portfolio::new(1000.0);
        pf.buy(&low("ODD", 3.0), 200.0).unwrap();
        let fill = pf.sell_all("ODD").unwrap();
        assert!(fill.closed);
        assert!(pf.is_empty());
        assert!(approx(pf.cash(), 1000.0));
    }

    #[test]
    fn sell_all_at_zero_price_still_removes() {
        let mut pf = Portfolio::new(100.0);
        pf.buy(&Stock::new("DUD", 10.0, 0.0, RiskTier::High), 100.0).unwrap();
        let mut cat =
            StockCatalog::from_stocks(vec![Stock::new("DUD", 10.0, 0.0, RiskTier::High)]);
        cat.set_price("DUD", 0.0);
        pf.sync_prices(&cat);

        assert!(matches!(pf.sell("DUD", 1.0), Err(TransactionError::InvalidPrice { .. })));
        let fill = pf.sell_all("DUD").unwrap();
        assert_eq!(fill.cash_amount, 0.0);
        assert!(approx(fill.realized_pl, -100.0));
        assert!(pf.is_empty());
    }

    #[test]
    fn realized_pl_on_sell() {
        let mut pf = Portfolio::new(100.0);
        pf.buy(&low("UP", 10.0), 100.0).unwrap();
        let mut cat = StockCatalog::from_stocks(vec![low("UP", 10.0)]);
        cat.set_price("UP", 20.0);
        pf.sync_prices(&cat);
        let fill = pf.sell("UP", 100.0).unwrap(); // 5 sh
        assert!(approx(fill.shares, 5.0));
        assert!(approx(fill.realized_pl, 50.0));
        assert!(!fill.closed);
    }

    #[test]
    fn valuation_follows_market_prices() {
        let mut pf = Portfolio::new(1000.0);
        pf.buy(&low("AAA", 10.0), 100.0).unwrap();
        pf.buy(&low("BBB", 50.0), 100.0).unwrap();
        let mut cat = StockCatalog::from_stocks(vec![low("AAA", 10.0), low("BBB", 50.0)]);
        cat.set_price("AAA", 12.0);
        cat.set_price("BBB", 40.0);

        assert!(approx(pf.current_value(&cat), 10.0 * 12.0 + 2.0 * 40.0));
        pf.sync_prices(&cat);
        let total: f64 = pf.holdings().iter().map(|h| h.total_value).sum();
        assert!(approx(total, pf.current_value(&cat)));
    }

    #[test]
    fn unlisted_symbol_keeps_stored_price() {
        let mut pf = Portfolio::new(100.0);
        pf.buy(&low("GONE", 10.0), 50.0).unwrap();
        let cat = StockCatalog::default();
        pf.sync_prices(&cat);
        assert_eq!(pf.position("GONE").unwrap().stock.price(), 10.0);
        assert!(approx(pf.current_value(&cat), 50.0));
    }

    #[test]
    fn thirds_of_a_huge_position_close_it() {
        // Sub-cent prices give positions of hundreds of millions of shares.
        for k in 1..=5000 {
            let price = 1.37e-6 * k as f64;
            let mut pf = Portfolio::new(1000.0);
            pf.buy(&Stock::new("PENNY", price, 0.0, RiskTier::High), 1000.0).unwrap();
            for amount in [333.33, 333.33, 333.34] {
                pf.sell("PENNY", amount)
                    .unwrap_or_else(|e| panic!("price {price}: {e}"));
            }
            assert!(pf.is_empty(), "price {price}: left {:?}", pf.positions());
            assert!(approx(pf.cash(), 1000.0));
        }
    }

    #[test]
    fn partial_sell_of_large_position_stays_open() {
        let mut pf = Portfolio::new(1000.0);
        pf.buy(&Stock::new("PENNY", 1e-5, 0.0, RiskTier::High), 1000.0).unwrap();
        let fill = pf.sell("PENNY", 999.0).unwrap();
        assert!(!fill.closed);
        let left = pf.position("PENNY").unwrap().stock.quantity_owned();
        assert!((left - 1e5).abs() < 1e-3, "{left}");
    }
}
