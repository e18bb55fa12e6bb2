//! Application state for the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use crate::generator::TimetableGenerator;
use crate::services::GenerationTracker;
use crate::store::FullStore;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Store instance backing all catalog and timetable state.
    pub store: Arc<dyn FullStore>,
    /// Generation boundary used by background generation runs.
    pub generator: Arc<dyn TimetableGenerator>,
    /// Tracker for in-flight and finished generation runs.
    pub tracker: GenerationTracker,
    /// Upper bound on a single generation run.
    pub generation_deadline: Duration,
}

impl AppState {
    pub fn new(
        store: Arc<dyn FullStore>,
        generator: Arc<dyn TimetableGenerator>,
        generation_deadline: Duration,
    ) -> Self {
        Self {
            store,
            generator,
            tracker: GenerationTracker::new(),
            generation_deadline,
        }
    }
}
