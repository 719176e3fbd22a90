//! Layered configuration for the `holdem` binary.
//!
//! Values are resolved in order, later layers winning:
//! built-in defaults, the TOML file named by `HOLDEM_CONFIG`, `HOLDEM_*`
//! environment variables, then command-line flags. The layer each value
//! came from is kept in [`ConfigSources`] so `holdem cfg` can show it.

use holdem_ai::DecisionConfig;
use holdem_engine::engine::TableConfig;
use holdem_engine::player::{Personality, STARTING_STACK};
use holdem_engine::pot::UnclaimedPotPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::str::FromStr;

/// Seats a simulated table may hold.
pub const MAX_SEATS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub seed: Option<u64>,
    pub starting_stack: u32,
    pub small_blind: u32,
    pub big_blind: u32,
    pub unclaimed_pot_policy: UnclaimedPotPolicy,
    pub cache_capacity: usize,
    /// One AI seat per entry, in seat order
    pub personalities: Vec<Personality>,
}

impl Default for Config {
    fn default() -> Self {
        let table = TableConfig::default();
        Self {
            seed: None,
            starting_stack: STARTING_STACK,
            small_blind: table.small_blind,
            big_blind: table.big_blind,
            unclaimed_pot_policy: table.unclaimed_pot_policy,
            cache_capacity: DecisionConfig::default().cache_capacity,
            personalities: Personality::ALL.to_vec(),
        }
    }
}

impl Config {
    pub fn table_config(&self) -> TableConfig {
        TableConfig {
            starting_stack: self.starting_stack,
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            unclaimed_pot_policy: self.unclaimed_pot_policy,
        }
    }

    pub fn decision_config(&self) -> DecisionConfig {
        DecisionConfig {
            cache_capacity: self.cache_capacity,
            ..DecisionConfig::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
    Cli,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub seed: ValueSource,
    pub starting_stack: ValueSource,
    pub small_blind: ValueSource,
    pub big_blind: ValueSource,
    pub unclaimed_pot_policy: ValueSource,
    pub cache_capacity: ValueSource,
    pub personalities: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            seed: ValueSource::Default,
            starting_stack: ValueSource::Default,
            small_blind: ValueSource::Default,
            big_blind: ValueSource::Default,
            unclaimed_pot_policy: ValueSource::Default,
            cache_capacity: ValueSource::Default,
            personalities: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

/// Values given on the command line; `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub seed: Option<u64>,
    pub starting_stack: Option<u32>,
    pub small_blind: Option<u32>,
    pub big_blind: Option<u32>,
    pub unclaimed_pot_policy: Option<UnclaimedPotPolicy>,
    pub personalities: Option<Vec<Personality>>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Resolves every layer, applies `overrides` on top and validates the result.
pub fn resolve(overrides: &Overrides) -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var("HOLDEM_CONFIG")
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.starting_stack {
            cfg.starting_stack = v;
            sources.starting_stack = ValueSource::File;
        }
        if let Some(v) = f.small_blind {
            cfg.small_blind = v;
            sources.small_blind = ValueSource::File;
        }
        if let Some(v) = f.big_blind {
            cfg.big_blind = v;
            sources.big_blind = ValueSource::File;
        }
        if let Some(v) = f.unclaimed_pot_policy {
            cfg.unclaimed_pot_policy = v;
            sources.unclaimed_pot_policy = ValueSource::File;
        }
        if let Some(v) = f.cache_capacity {
            cfg.cache_capacity = v;
            sources.cache_capacity = ValueSource::File;
        }
        if let Some(v) = f.personalities {
            cfg.personalities = v;
            sources.personalities = ValueSource::File;
        }
    }

    if let Some(v) = env_value("HOLDEM_SEED")? {
        cfg.seed = Some(v);
        sources.seed = ValueSource::Env;
    }
    if let Some(v) = env_value("HOLDEM_STARTING_STACK")? {
        cfg.starting_stack = v;
        sources.starting_stack = ValueSource::Env;
    }
    if let Some(v) = env_value("HOLDEM_SMALL_BLIND")? {
        cfg.small_blind = v;
        sources.small_blind = ValueSource::Env;
    }
    if let Some(v) = env_value("HOLDEM_BIG_BLIND")? {
        cfg.big_blind = v;
        sources.big_blind = ValueSource::Env;
    }
    if let Some(v) = env_value("HOLDEM_CACHE_CAPACITY")? {
        cfg.cache_capacity = v;
        sources.cache_capacity = ValueSource::Env;
    }
    if let Ok(list) = std::env::var("HOLDEM_PERSONALITIES")
        && !list.is_empty()
    {
        cfg.personalities = parse_personalities(&list)?;
        sources.personalities = ValueSource::Env;
    }

    if let Some(v) = overrides.seed {
        cfg.seed = Some(v);
        sources.seed = ValueSource::Cli;
    }
    if let Some(v) = overrides.starting_stack {
        cfg.starting_stack = v;
        sources.starting_stack = ValueSource::Cli;
    }
    if let Some(v) = overrides.small_blind {
        cfg.small_blind = v;
        sources.small_blind = ValueSource::Cli;
    }
    if let Some(v) = overrides.big_blind {
        cfg.big_blind = v;
        sources.big_blind = ValueSource::Cli;
    }
    if let Some(v) = overrides.unclaimed_pot_policy {
        cfg.unclaimed_pot_policy = v;
        sources.unclaimed_pot_policy = ValueSource::Cli;
    }
    if let Some(v) = &overrides.personalities {
        cfg.personalities = v.clone();
        sources.personalities = ValueSource::Cli;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    starting_stack: Option<u32>,
    #[serde(default)]
    small_blind: Option<u32>,
    #[serde(default)]
    big_blind: Option<u32>,
    #[serde(default)]
    unclaimed_pot_policy: Option<UnclaimedPotPolicy>,
    #[serde(default)]
    cache_capacity: Option<usize>,
    #[serde(default)]
    personalities: Option<Vec<Personality>>,
}

fn env_value<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) if !raw.is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("Invalid {}: {}", key, raw))),
        _ => Ok(None),
    }
}

/// Parses a comma separated personality list such as `"aggressive,mathematician"`.
pub fn parse_personalities(list: &str) -> Result<Vec<Personality>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Personality>().map_err(ConfigError::Invalid))
        .collect()
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    cfg.table_config()
        .validate_for(cfg.personalities.len())
        .map_err(|e| ConfigError::Invalid(format!("Invalid configuration: {}", e)))?;
    if cfg.cache_capacity == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: cache_capacity must be >0".into(),
        ));
    }
    if !(2..=MAX_SEATS).contains(&cfg.personalities.len()) {
        return Err(ConfigError::Invalid(format!(
            "Invalid configuration: between 2 and {} personalities required, got {}",
            MAX_SEATS,
            cfg.personalities.len()
        )));
    }
    Ok(())
}
