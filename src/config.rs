//! Load and validate runtime configuration.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::catalog::MarketSettings;
use crate::session::{GameSettings, TerminationPolicy};

pub const CONFIG_ENV: &str = "STOCK_GAME_CONFIG";
pub const SEED_ENV: &str = "STOCK_GAME_SEED";
const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameCfg {
    pub starting_cash: f64,
    pub termination: TerminationPolicy,
}

impl Default for GameCfg {
    fn default() -> Self {
        Self {
            starting_cash: 1000.0,
            termination: TerminationPolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MarketCfg {
    pub stocks_per_tier: usize,
    pub max_initial_price: f64,
    pub unique_symbols: bool,
}

impl Default for MarketCfg {
    fn default() -> Self {
        let m = MarketSettings::default();
        Self {
            stocks_per_tier: m.stocks_per_tier,
            max_initial_price: m.max_initial_price,
            unique_symbols: m.unique_symbols,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct RngCfg {
    /// Fixed seed for a reproducible game; random when absent.
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogCfg {
    pub level: String, // "error" | "warn" | "info" | "debug" | "trace"
}

impl Default for LogCfg {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameCfg,
    pub market: MarketCfg,
    pub rng: RngCfg,
    pub log: LogCfg,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_yaml(&s).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_yaml(s: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Explicit env path, then `./config.yaml`, then the platform config dir.
    /// Falls back to built-in defaults when no file exists.
    pub fn discover() -> anyhow::Result<(Self, Option<PathBuf>)> {
        Self::resolve(
            std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            std::env::var(SEED_ENV).ok(),
            &candidate_paths(),
        )
    }

    /// Path resolution and seed override, with the environment passed in.
    fn resolve(
        explicit: Option<PathBuf>,
        seed: Option<String>,
        candidates: &[PathBuf],
    ) -> anyhow::Result<(Self, Option<PathBuf>)> {
        let path = explicit.or_else(|| candidates.iter().find(|p| p.exists()).cloned());
        let mut cfg = match &path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        if let Some(raw) = seed {
            let seed = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{SEED_ENV} must be an unsigned integer, got {raw:?}"))?;
            cfg.rng.seed = Some(seed);
        }
        Ok((cfg, path))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.game.starting_cash.is_finite() || self.game.starting_cash <= 0.0 {
            bail!("game.starting_cash must be positive, got {}", self.game.starting_cash);
        }
        if let TerminationPolicy::DayLimit { last_day } = self.game.termination {
            if last_day < 2 {
                bail!("game.termination.last_day must be at least 2, got {last_day}");
            }
        }
        if self.market.stocks_per_tier == 0 {
            bail!("market.stocks_per_tier must be at least 1");
        }
        if !self.market.max_initial_price.is_finite() || self.market.max_initial_price <= 0.0 {
            bail!(
                "market.max_initial_price must be positive, got {}",
                self.market.max_initial_price
            );
        }
        if self.log.level.parse::<tracing::Level>().is_err() {
            bail!("log.level {:?} is not a tracing level", self.log.level);
        }
        Ok(())
    }

    pub fn game_settings(&self) -> GameSettings {
        GameSettings {
            starting_cash: self.game.starting_cash,
            termination: self.game.termination,
            market: MarketSettings {
                stocks_per_tier: self.market.stocks_per_tier,
                max_initial_price: self.market.max_initial_price,
                unique_symbols: self.market.unique_symbols,
            },
        }
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut out = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dirs) = directories::ProjectDirs::from("", "", "stock-market-game") {
        out.push(dirs.config_dir().join(CONFIG_FILE));
    }
    out
}
