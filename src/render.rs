//! Plain-text views of the session for the terminal.

use std::fmt::Write;

use stock_market_game::{
    HoldingView, MarketQuote, SessionSnapshot, SessionState, Side, TradeRecord,
};

pub const HELP: &str = "\
Commands:
  buy SYM AMOUNT     spend AMOUNT dollars on SYM
  sell SYM AMOUNT    sell AMOUNT dollars worth of SYM
  sell SYM all       sell the whole SYM position (also: sellall SYM)
  next | n           advance to the next day
  market | m         list the market
  portfolio | p      list your holdings
  status [json]      day, cash and portfolio value
  history | h        trades so far
  restart            start a new game
  help | ?           this text
  quit | q           leave";

pub fn instructions(starting_cash: f64, last_day: Option<u32>) -> String {
    let goal = match last_day {
        Some(d) => {
            format!("The goal of the game is to get as much money as possible in {d} days.")
        }
        None => "The game ends when you run out of cash and stocks.".to_string(),
    };
    format!(
        "You have ${starting_cash:.0} to buy any stocks you would like. \
         Stocks have 3 different risk levels which reflect by how much the stock \
         falls down or goes up. {goal}\nType `help` for commands."
    )
}

fn arrow(now: f64, before: f64) -> &'static str {
    if now > before {
        "↑"
    } else {
        "↓"
    }
}

pub fn market(quotes: &[MarketQuote]) -> String {
    let mut out = format!("{:<8} {:<8} {:>12}\n", "Name", "Risk", "Price");
    for q in quotes {
        let _ = writeln!(
            out,
            "{:<8} {:<8} {:>12}",
            q.symbol,
            q.tier.to_string(),
            format!("${:.2}", q.price)
        );
    }
    out
}

pub fn holdings(rows: &[HoldingView], snap: &SessionSnapshot) -> String {
    let mut out = format!(
        "Portfolio value: ${:.2} {}    Day {}\n",
        snap.portfolio_value,
        arrow(snap.portfolio_value, snap.previous_portfolio_value),
        snap.day_number
    );
    if rows.is_empty() {
        out.push_str("(no holdings)\n");
        return out;
    }
    let _ = writeln!(
        out,
        "{:<8} {:<8} {:>12} {:>12} {:>10} {:>11}",
        "Name", "Risk", "Total", "Owned", "Avg cost", "P/L"
    );
    for h in rows {
        let _ = writeln!(
            out,
            "{:<8} {:<8} {:>12} {:>12.4} {:>10.2} {:>+11.2}",
            h.symbol,
            h.tier.to_string(),
            format!("${:.2}", h.total_value),
            h.quantity_owned,
            h.avg_cost,
            h.unrealized_pl
        );
    }
    out
}

pub fn status(snap: &SessionSnapshot) -> String {
    let mut out = format!(
        "Day {} | Cash ${:.2} {} | Portfolio ${:.2} {} | Net worth ${:.2} | Realized P/L {:+.2}",
        snap.day_number,
        snap.available_cash,
        arrow(snap.available_cash, snap.previous_cash),
        snap.portfolio_value,
        arrow(snap.portfolio_value, snap.previous_portfolio_value),
        snap.net_worth,
        snap.realized_pl
    );
    if snap.state == SessionState::GameOver {
        out.push_str("\n*** Game Over *** Final net worth: ");
        let _ = write!(out, "${:.2}. Type `restart` or `quit`.", snap.net_worth);
    }
    out
}

pub fn trade(rec: &TradeRecord) -> String {
    match rec.side {
        Side::Buy => format!(
            "Bought {:.4} {} @ ${:.2} for ${:.2}",
            rec.shares, rec.symbol, rec.price, rec.cash_amount
        ),
        Side::Sell => format!(
            "Sold {:.4} {} @ ${:.2} for ${:.2} (P/L {:+.2})",
            rec.shares, rec.symbol, rec.price, rec.cash_amount, rec.realized_pl
        ),
    }
}

pub fn history(records: &[TradeRecord]) -> String {
    if records.is_empty() {
        return "(no trades yet)\n".to_string();
    }
    let mut out = String::new();
    for r in records {
        let _ = writeln!(
            out,
            "day {:>2} {}  {}",
            r.day,
            r.executed_at.format("%H:%M:%S"),
            trade(r)
        );
    }
    out
}
