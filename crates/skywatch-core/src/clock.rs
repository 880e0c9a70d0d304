//! Time sources for stamping measurements.
//!
//! Stations read the wall clock through [`Clock`]. Production code uses
//! [`Clock::System`]; tests use [`Clock::Lab`] with a [`LabClock`] whose time
//! only moves when advanced, so `observed_at` values are reproducible.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use web_time::{Duration, SystemTime, UNIX_EPOCH};

/// Where a station gets "now" from.
#[derive(Debug, Clone, Default)]
pub enum Clock {
    /// Real wall-clock time.
    #[default]
    System,
    /// Deterministic lab clock for testing.
    Lab(LabClock),
}

impl Clock {
    #[must_use]
    pub fn now(&self) -> SystemTime {
        match self {
            Self::System => SystemTime::now(),
            Self::Lab(lab) => lab.now(),
        }
    }
}

impl From<LabClock> for Clock {
    fn from(lab: LabClock) -> Self {
        Self::Lab(lab)
    }
}

/// A manually-advanceable clock.
///
/// Clones share the same offset, so a test can keep one handle and give
/// another to the station.
#[derive(Debug, Clone)]
pub struct LabClock {
    epoch: SystemTime,
    offset_us: Arc<AtomicU64>,
}

impl LabClock {
    /// A lab clock starting at the Unix epoch.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(UNIX_EPOCH)
    }

    #[must_use]
    pub fn starting_at(epoch: SystemTime) -> Self {
        Self {
            epoch,
            offset_us: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, delta: Duration) {
        let us = delta.as_micros().min(u64::MAX as u128) as u64;
        self.offset_us.fetch_add(us, Ordering::Release);
    }

    #[must_use]
    pub fn now(&self) -> SystemTime {
        let offset = Duration::from_micros(self.offset_us.load(Ordering::Acquire));
        self.epoch + offset
    }
}

impl Default for LabClock {
    fn default() -> Self {
        Self::new()
    }
}
