//! Plan module - idea validation and the three-task orchestrator

pub mod orchestrator;
pub mod validation;

pub use orchestrator::{PlanOrchestrator, TracingObserver};
pub use validation::{validate_ai_sections, validate_idea};
