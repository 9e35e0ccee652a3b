//! In-flight request deduplication keyed by cache key

use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::common::errors::{PlanError, Result, Source};

/// A pending outcome that any number of callers can await
pub type Flight<V> = Shared<BoxFuture<'static, Result<V>>>;

type FlightMap<V> = Arc<Mutex<HashMap<String, Flight<V>>>>;

/// How a caller got hold of a value for a key
pub enum Claim<V> {
    /// The guard produced a value, no flight was needed
    Resolved(V),
    /// Another caller's flight was already running
    Joined(Flight<V>),
    /// This call registered a new flight
    Started(Flight<V>),
}

impl<V: Clone> Claim<V> {
    /// Wait for the value or error behind this claim
    pub async fn outcome(self) -> Result<V> {
        match self {
            Claim::Resolved(value) => Ok(value),
            Claim::Joined(flight) | Claim::Started(flight) => flight.await,
        }
    }

    pub fn is_started(&self) -> bool {
        matches!(self, Claim::Started(_))
    }
}

/// Registry guaranteeing at most one in-flight computation per key
///
/// Work runs on a spawned task, so it completes and releases its key even
/// when every waiter has given up. Must be used from within a Tokio runtime.
pub struct SingleFlight<V> {
    flights: FlightMap<V>,
}

/// Removes the registry entry when the flight's task ends, however it ends
struct Release<V> {
    flights: FlightMap<V>,
    key: String,
}

impl<V> Drop for Release<V> {
    fn drop(&mut self) {
        let mut flights = self.flights.lock().unwrap_or_else(PoisonError::into_inner);
        flights.remove(&self.key);
        debug!(key = %self.key, "in-flight slot released");
    }
}

impl<V> SingleFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            flights: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Join the flight for `key`, or start one with `factory`
    ///
    /// `factory` runs at most once per registration, never once per caller.
    pub fn get_or_create<F, Fut>(&self, key: &str, factory: F) -> Claim<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        self.get_or_create_guarded(key, || None, factory)
    }

    /// Like [`get_or_create`](Self::get_or_create), but first consults `guard`
    ///
    /// `guard`, the registry lookup and the registration all happen under one
    /// lock, so no caller can observe a miss between another caller's
    /// settle-and-release and its own registration.
    pub fn get_or_create_guarded<G, F, Fut>(&self, key: &str, guard: G, factory: F) -> Claim<V>
    where
        G: FnOnce() -> Option<V>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let mut flights = self.lock();

        if let Some(value) = guard() {
            return Claim::Resolved(value);
        }

        if let Some(existing) = flights.get(key) {
            debug!(key = %key, "joining in-flight request");
            return Claim::Joined(existing.clone());
        }

        // `factory` runs before the guard exists: unwinding here must not re-lock `flights`
        let work = factory();
        let release = Release {
            flights: Arc::clone(&self.flights),
            key: key.to_string(),
        };
        let handle = tokio::spawn(async move {
            let _release = release;
            work.await
        });

        let flight = async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(error = %e, "in-flight task did not complete");
                    Err(PlanError::upstream(
                        Source::Registry,
                        format!("in-flight task did not complete: {}", e),
                    ))
                }
            }
        }
        .boxed()
        .shared();

        flights.insert(key.to_string(), flight.clone());
        debug!(key = %key, "registered in-flight request");
        Claim::Started(flight)
    }

    /// Whether a flight is currently registered for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Number of registered flights
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Flight<V>>> {
        self.flights.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V> Default for SingleFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
