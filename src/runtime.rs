use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AxConfig;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `level` when set. Fails if a subscriber is already
/// installed.
pub fn init_logging(level: &str, debug: bool, json: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Install logging as described by a loaded configuration.
pub fn init_logging_from(config: &AxConfig) -> Result<()> {
    init_logging(&config.logging.level, config.debug, config.logging.json)
}

pub struct LoadedConfig {
    pub config: AxConfig,
    pub path: PathBuf,
}

/// Locate, parse and validate the configuration, then apply `AXKIT_*`
/// environment overrides.
pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    let mut config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .await
            .context("Failed to read config file")?;
        let config: AxConfig =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;
        info!("Loaded configuration from: {}", config_path.display());
        config
    } else {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        AxConfig::default()
    };

    config.apply_env_overrides();
    config.validate().context("Invalid configuration")?;

    Ok(LoadedConfig {
        config,
        path: config_path,
    })
}

// Priority: ./config/axkit.yaml > <config dir>/axkit/config.yaml
fn default_config_path() -> Result<PathBuf> {
    let local_config = PathBuf::from("config/axkit.yaml");
    if local_config.exists() {
        return Ok(local_config);
    }
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push("axkit");
    path.push("config.yaml");
    Ok(path)
}
