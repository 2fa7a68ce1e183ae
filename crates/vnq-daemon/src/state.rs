//! Shared runtime state for vnq-daemon.
//!
//! Built once at startup and never mutated. Handlers receive
//! `State<Arc<AppState>>` from Axum.

use std::sync::Arc;

use chrono::NaiveDate;
use vnq_md::QuoteSource;

/// Source of "today" for the quote window. Injectable so tests can pin the date.
pub type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Static build metadata.
#[derive(Clone, Debug)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Static build metadata.
    pub build: BuildInfo,
    /// The one upstream provider every quote request goes to.
    pub source: Arc<dyn QuoteSource>,
    /// Calendar date the request window ends on.
    pub today: Today,
}

impl AppState {
    /// State backed by `source`, with the host's local date as "today".
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self {
            build: BuildInfo {
                service: "vnq-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            source,
            today: Arc::new(|| chrono::Local::now().date_naive()),
        }
    }

    /// Replace the clock (tests).
    pub fn with_today(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Arc::new(today);
        self
    }
}
