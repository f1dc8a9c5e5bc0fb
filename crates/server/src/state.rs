//! Application state for the API server

use std::sync::Arc;
use std::time::Instant;

use stemtutor_core::AppResult;
use stemtutor_knowledge::TutorBot;

use crate::page;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// The tutor, initialized once at startup
    pub bot: Arc<TutorBot>,
    /// Chat page, rendered once
    pub page: Arc<str>,
    /// Server start time for uptime calculation
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state, rendering the chat page.
    pub fn new(bot: Arc<TutorBot>) -> AppResult<Self> {
        let page = page::render_index(&page::PageContext::default())?;
        Ok(Self {
            bot,
            page: Arc::from(page),
            start_time: Instant::now(),
        })
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
