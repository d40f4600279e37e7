//! Parse player commands typed at the prompt.
//! Supported: buy / sell / sell all / next / market / portfolio / status / history /
//! restart / help / quit.

use regex::Regex;
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Buy { symbol: String, amount: f64 },
    Sell { symbol: String, amount: f64 },
    SellAll { symbol: String },
    NextDay,
    Market,
    Portfolio,
    Status { json: bool },
    History,
    Restart,
    Help,
    Quit,
}

// "buy ABC 200", "sell abc $50.25", "sell ABC all", "s ABC all", "sellall ABC"
static RE_TRADE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(buy|sell|b|s)\s+([A-Z]{1,5})\s+\$?([+-]?\d+(?:\.\d*)?|[+-]?\.\d+)$")
        .expect("trade pattern")
});
static RE_SELL_ALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?:sell|s)\s+([A-Z]{1,5})\s+all|sellall\s+([A-Z]{1,5}))$")
        .expect("sell-all pattern")
});

pub fn parse_command(text: &str) -> Option<Command> {
    let t = text.trim();

    if let Some(c) = RE_SELL_ALL.captures(t) {
        let symbol = c.get(1).or_else(|| c.get(2))?.as_str().to_ascii_uppercase();
        return Some(Command::SellAll { symbol });
    }

    if let Some(c) = RE_TRADE.captures(t) {
        let symbol = c[2].to_ascii_uppercase();
        let amount: f64 = c[3].parse().ok()?;
        return match &c[1].to_ascii_lowercase()[..] {
            "buy" | "b" => Some(Command::Buy { symbol, amount }),
            _ => Some(Command::Sell { symbol, amount }),
        };
    }

    let words: Vec<String> = t.split_whitespace().map(str::to_ascii_lowercase).collect();
    let words: Vec<&str> = words.iter().map(String::as_str).collect();
    let cmd = match words.as_slice() {
        ["next"] | ["n"] => Command::NextDay,
        ["market"] | ["m"] => Command::Market,
        ["portfolio"] | ["p"] => Command::Portfolio,
        ["status"] | ["s"] => Command::Status { json: false },
        ["status", "json"] => Command::Status { json: true },
        ["history"] | ["h"] => Command::History,
        ["restart"] => Command::Restart,
        ["help"] | ["?"] => Command::Help,
        ["quit"] | ["exit"] | ["q"] => Command::Quit,
        _ => return None,
    };
    Some(cmd)
}
