//! Configuration module

pub mod loader;
pub mod types;

pub use loader::{load_config, load_from_env, load_layered};
pub use types::{AppConfig, AppSettings, CacheConfig, FetchConfig, OpenAiConfig, ProviderConfig};
