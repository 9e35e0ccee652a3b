//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{PlanError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with APP__, e.g. `APP__CACHE__TTL_SECONDS`)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| PlanError::Configuration(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| PlanError::Configuration(e.to_string()))
}

/// Load configuration from the flat deployment variables only
///
/// Reads `OPENAI_*`, `CRUNCHBASE_*`, `STATISTA_*` and `LOG_LEVEL`; anything
/// unset keeps its default.
pub fn load_from_env() -> Result<AppConfig> {
    // Try to load from .env file
    dotenvy::dotenv().ok();
    Ok(from_lookup(|name| std::env::var(name).ok()))
}

/// Load the file and `APP__` layers, then apply the flat deployment variables
///
/// Priority (highest to lowest):
/// 1. Flat variables (`OPENAI_API_URL`, `CRUNCHBASE_API_KEY`, ...), for the fields they name
/// 2. Environment variables prefixed with APP__
/// 3. Configuration file
/// 4. Default values
pub fn load_layered(config_path: Option<&str>) -> Result<AppConfig> {
    dotenvy::dotenv().ok();
    let config = load_config(config_path)?;
    Ok(apply_flat_vars(config, |name| std::env::var(name).ok()))
}

fn from_lookup(var: impl Fn(&str) -> Option<String>) -> AppConfig {
    apply_flat_vars(AppConfig::default(), var)
}

fn apply_flat_vars(mut config: AppConfig, var: impl Fn(&str) -> Option<String>) -> AppConfig {
    fn set<T>(slot: &mut T, value: Option<T>) {
        if let Some(value) = value {
            *slot = value;
        }
    }

    set(&mut config.openai.api_key, var("OPENAI_API_KEY").map(Some));
    set(&mut config.openai.api_url, var("OPENAI_API_URL"));
    set(&mut config.openai.model, var("OPENAI_MODEL"));

    for (prefix, provider) in [
        ("CRUNCHBASE", &mut config.crunchbase),
        ("STATISTA", &mut config.statista),
    ] {
        set(&mut provider.url, var(&format!("{}_API_URL", prefix)));
        set(&mut provider.api_key, var(&format!("{}_API_KEY", prefix)).map(Some));
    }

    set(&mut config.settings.log_level, var("LOG_LEVEL"));
    config
}
