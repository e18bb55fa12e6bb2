//! Business logic on top of the store: availability resolution, timetable
//! validation, generation orchestration, and request lifecycle management.

pub mod availability;
pub mod constraints;
pub mod generation;
pub mod generation_tracker;
pub mod lifecycle;

pub use availability::resolve_availability;
pub use constraints::{validate_timetable, ConstraintViolation, ValidationReport};
pub use generation::{generate_draft, GenerationError};
pub use generation_tracker::{GenerationTracker, JobStatus, LogLevel};
pub use lifecycle::{Decision, LifecycleError};
