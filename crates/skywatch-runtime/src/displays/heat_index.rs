#![forbid(unsafe_code)]

use std::fmt;

use skywatch_core::{Measurement, Result, StationError};

use crate::dependent::{Dependent, StationView};

const VIEW: &str = "heat_index";

/// Heat index (°F) from temperature (°F) and relative humidity (%).
///
/// Extended sixteen-term polynomial approximation, rounded to one decimal
/// place. Pure and deterministic.
#[must_use]
pub fn heat_index(t: f64, rh: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let rh2 = rh * rh;
    let rh3 = rh2 * rh;
    let index = 16.923 + (0.185212 * t) + (5.37941 * rh) - (0.100254 * t * rh)
        + (0.00941695 * t2)
        + (0.00728898 * rh2)
        + (0.000345372 * t2 * rh)
        - (0.000814971 * t * rh2)
        + (0.0000102102 * t2 * rh2)
        - (0.000038646 * t3)
        + (0.0000291583 * rh3)
        + (0.00000142721 * t3 * rh)
        + (0.000000197483 * t * rh3)
        - (0.0000000218429 * t3 * rh2)
        + (0.000000000843296 * t2 * rh3)
        - (0.0000000000481975 * t3 * rh3);
    (index * 10.0).round() / 10.0
}

/// Recomputes the heat index from each pushed measurement.
#[derive(Debug, Clone, Default)]
pub struct HeatIndexDisplay {
    last: Option<f64>,
}

impl HeatIndexDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heat_index(&self) -> Result<f64> {
        self.last.ok_or_else(|| StationError::no_data(VIEW))
    }
}

impl Dependent for HeatIndexDisplay {
    fn update(&mut self, _station: &dyn StationView, measurement: &Measurement) {
        self.last = Some(heat_index(measurement.temperature(), measurement.humidity()));
    }

    fn name(&self) -> &'static str {
        VIEW
    }
}

impl fmt::Display for HeatIndexDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last {
            Some(value) => write!(f, "Heat Index is {value:.1}°F"),
            None => f.write_str("Heat Index: no data yet"),
        }
    }
}
