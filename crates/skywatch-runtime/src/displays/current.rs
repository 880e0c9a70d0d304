#![forbid(unsafe_code)]

use std::fmt;

use skywatch_core::Measurement;

use crate::dependent::{Dependent, StationView};

/// Holds the most recent measurement verbatim.
#[derive(Debug, Clone, Default)]
pub struct CurrentConditionsDisplay {
    latest: Option<Measurement>,
}

impl CurrentConditionsDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn latest(&self) -> Option<Measurement> {
        self.latest
    }

    #[must_use]
    pub fn temperature(&self) -> Option<f64> {
        self.latest.map(|m| m.temperature())
    }

    #[must_use]
    pub fn humidity(&self) -> Option<f64> {
        self.latest.map(|m| m.humidity())
    }
}

impl Dependent for CurrentConditionsDisplay {
    fn update(&mut self, _station: &dyn StationView, measurement: &Measurement) {
        self.latest = Some(*measurement);
    }

    fn name(&self) -> &'static str {
        "current_conditions"
    }
}

impl fmt::Display for CurrentConditionsDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.latest {
            Some(m) => write!(
                f,
                "Current conditions: {}°F and {}% humidity",
                m.temperature(),
                m.humidity()
            ),
            None => f.write_str("Current conditions: no data yet"),
        }
    }
}
