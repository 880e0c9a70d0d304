#![forbid(unsafe_code)]

//! Running temperature statistics.
//!
//! State is updated incrementally in O(1) per reading; no history is kept.
//! After every reading `min`, `max`, and `average` equal what a full scan of
//! all readings so far would produce.

use std::fmt;

use skywatch_core::{Measurement, Result, StationError};

use crate::dependent::{Dependent, StationView};

const VIEW: &str = "statistics";

#[derive(Debug, Clone, Default)]
pub struct StatisticsDisplay {
    min: f64,
    max: f64,
    running_sum: f64,
    /// Zero means "no data"; `min`/`max` are meaningless until then.
    count: u64,
}

impl StatisticsDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one temperature reading into the statistics.
    pub fn record(&mut self, temperature: f64) {
        self.count += 1;
        self.running_sum += temperature;
        if self.count == 1 {
            self.min = temperature;
            self.max = temperature;
        } else {
            self.min = self.min.min(temperature);
            self.max = self.max.max(temperature);
        }
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    #[must_use]
    pub fn running_sum(&self) -> f64 {
        self.running_sum
    }

    pub fn min(&self) -> Result<f64> {
        self.guard().map(|()| self.min)
    }

    pub fn max(&self) -> Result<f64> {
        self.guard().map(|()| self.max)
    }

    pub fn average(&self) -> Result<f64> {
        self.guard().map(|()| self.running_sum / self.count as f64)
    }

    fn guard(&self) -> Result<()> {
        if self.count == 0 {
            Err(StationError::no_data(VIEW))
        } else {
            Ok(())
        }
    }
}

impl Dependent for StatisticsDisplay {
    fn update(&mut self, station: &dyn StationView, measurement: &Measurement) {
        // Pull from the pass view, which is pinned to this pass's reading.
        // The pushed value covers views that have nothing stored.
        let temperature = station
            .temperature()
            .unwrap_or_else(|| measurement.temperature());
        self.record(temperature);
    }

    fn name(&self) -> &'static str {
        VIEW
    }
}

impl fmt::Display for StatisticsDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.average() {
            Ok(avg) => write!(
                f,
                "Temperature Statistics: Avg/Max/Min = {avg:.1}°F/{}°F/{}°F",
                self.max, self.min
            ),
            Err(_) => f.write_str("No temperature readings recorded yet"),
        }
    }
}
