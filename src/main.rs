//! Entry point. Wires stdin -> Parser -> GameSession -> terminal views.

mod parser;
mod render;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use parser::{parse_command, Command};
use stock_market_game::config::AppConfig;
use stock_market_game::{GameSession, SessionState, TerminationPolicy};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let (cfg, cfg_path) = AppConfig::discover()?;
    let level: Level = cfg
        .log
        .level
        .parse()
        .with_context(|| format!("log.level {:?}", cfg.log.level))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    match &cfg_path {
        Some(p) => info!("Config loaded from {}", p.display()),
        None => info!("No config file found, using defaults"),
    }

    let settings = cfg.game_settings();
    let mut session = match cfg.rng.seed {
        Some(seed) => {
            info!("Seeded game: {}", seed);
            GameSession::seeded(settings, seed)
        }
        None => GameSession::from_entropy(settings),
    };

    let last_day = match session.settings().termination {
        TerminationPolicy::DayLimit { last_day } => Some(last_day),
        TerminationPolicy::Bankrupt => None,
    };
    let mut out = tokio::io::stdout();
    let intro = format!(
        "{}\n\n{}\n{}\n",
        render::instructions(session.settings().starting_cash, last_day),
        render::status(&session.snapshot()),
        render::market(&session.list_market_stocks())
    );
    out.write_all(intro.as_bytes()).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        out.write_all(b"> ").await?;
        out.flush().await?;

        let Some(line) = lines.next_line().await? else { break };
        if line.trim().is_empty() {
            continue;
        }
        let Some(cmd) = parse_command(&line) else {
            warn!("Unrecognized command: {}", line.trim());
            out.write_all(b"Unrecognized command. Type `help` for the list.\n").await?;
            continue;
        };
        if cmd == Command::Quit {
            break;
        }

        let reply = handle(&mut session, cmd)?;
        out.write_all(reply.as_bytes()).await?;
        if !reply.ends_with('\n') {
            out.write_all(b"\n").await?;
        }
    }

    let snap = session.snapshot();
    out.write_all(format!("Goodbye. Net worth ${:.2}\n", snap.net_worth).as_bytes())
        .await?;
    out.flush().await?;
    Ok(())
}

fn handle(session: &mut GameSession, cmd: Command) -> anyhow::Result<String> {
    let reply = match cmd {
        Command::Buy { symbol, amount } => match session.buy(&symbol, amount) {
            Ok(rec) => render::trade(&rec),
            Err(e) => format!("Buy rejected: {e}"),
        },
        Command::Sell { symbol, amount } => match session.sell(&symbol, amount) {
            Ok(rec) => render::trade(&rec),
            Err(e) => format!("Sell rejected: {e}"),
        },
        Command::SellAll { symbol } => match session.sell_all(&symbol) {
            Ok(rec) => render::trade(&rec),
            Err(e) => format!("Sell rejected: {e}"),
        },
        Command::NextDay => {
            let state = session.advance_day();
            let mut s = render::status(&session.snapshot());
            if state == SessionState::Active {
                s.push('\n');
                s.push_str(&render::market(&session.list_market_stocks()));
            }
            s
        }
        Command::Market => render::market(&session.list_market_stocks()),
        Command::Portfolio => render::holdings(&session.list_holdings(), &session.snapshot()),
        Command::Status { json: false } => render::status(&session.snapshot()),
        Command::Status { json: true } => serde_json::to_string_pretty(&session.snapshot())?,
        Command::History => render::history(session.history()),
        Command::Restart => {
            session.restart();
            format!(
                "New game.\n{}\n{}",
                render::status(&session.snapshot()),
                render::market(&session.list_market_stocks())
            )
        }
        Command::Help => render::HELP.to_string(),
        Command::Quit => String::new(),
    };
    Ok(reply)
}
