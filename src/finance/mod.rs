//! Financial computation engine
//!
//! Synchronous and free of I/O: validated inputs in, projections out.

mod engine;

pub use engine::{compute, MAX_PROJECTION_YEARS};
