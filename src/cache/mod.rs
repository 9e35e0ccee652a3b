//! Cache-aside building blocks: a lazy-expiry TTL cache and a single-flight registry

pub mod single_flight;
pub mod ttl;

pub use single_flight::{Claim, Flight, SingleFlight};
pub use ttl::{CacheEntry, TtlCache};
