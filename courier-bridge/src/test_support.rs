//! Test doubles for driving a bridge session without a real surface.

use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::session::Clock;
use crate::surface::Surface;

/// [`Surface`] that records every load request and script.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    loads: Vec<String>,
    scripts: Vec<String>,
}

impl RecordingSurface {
    /// Resource URLs requested so far, in order.
    #[must_use]
    pub fn loads(&self) -> &[String] {
        &self.loads
    }

    /// Scripts evaluated so far, in order.
    #[must_use]
    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    /// Entry point called by each evaluated script, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<&str> {
        const ENTRY_POINTS: [&str; 4] =
            ["addNumberedMarker", "clearAllMarkers", "drawPolyline", "moveTo"];
        self.scripts
            .iter()
            .map(|script| {
                ENTRY_POINTS
                    .into_iter()
                    .find(|name| script.contains(&format!("{name}(")))
                    .unwrap_or("?")
            })
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.loads.clear();
        self.scripts.clear();
    }
}

impl Surface for RecordingSurface {
    fn load(&mut self, resource_url: &str) {
        self.loads.push(resource_url.to_owned());
    }

    fn evaluate(&mut self, script: &str) {
        self.scripts.push(script.to_owned());
    }
}

/// [`Clock`] that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// A clock frozen at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
