//! Market data module - provider clients and the cache-aside pipeline
//!
//! ```text
//! fetch(category)
//!   │
//!   ├─ cache hit ───────────────────────────────► snapshot
//!   │
//!   ├─ in-flight for key ─── await shared ──────► snapshot | error
//!   │
//!   └─ register flight
//!        ├─ crunchbase.search ┐
//!        ├─ statista.search   ┴─ both required
//!        ├─ normalize
//!        ├─ cache.set(ttl)
//!        └─ release slot (always)
//! ```

pub mod normalize;
pub mod pipeline;
pub mod providers;

pub use normalize::normalize_industry_stats;
pub use pipeline::{
    cache_key, normalize_category, MarketCache, MarketDataPipeline, MarketFlights,
    DEFAULT_CACHE_TTL, KEY_PREFIX,
};
pub use providers::{ProviderClient, CRUNCHBASE, STATISTA};
