//! Types, traits and errors shared by every module

pub mod errors;
pub mod traits;
pub mod types;
