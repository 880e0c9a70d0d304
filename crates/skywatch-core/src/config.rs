//! Station configuration.
//!
//! [`StationConfig`] bundles the validation bounds applied to incoming
//! measurements and the pressure thresholds used for forecasting. All
//! types are plain data; enable the `serde` feature to load them from a
//! file.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, StationError};

/// Pressure rise (inHg) above which the forecast reads "improving".
pub const DEFAULT_RISE_THRESHOLD: f64 = 0.05;

/// Pressure fall (inHg) beyond which the forecast reads "worsening".
pub const DEFAULT_FALL_THRESHOLD: f64 = 0.05;

/// Inclusive domain accepted for each measured quantity.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MeasurementBounds {
    /// Degrees Fahrenheit.
    pub min_temperature: f64,
    pub max_temperature: f64,
    /// Relative humidity, percent.
    pub min_humidity: f64,
    pub max_humidity: f64,
    /// Inches of mercury.
    pub min_pressure: f64,
    pub max_pressure: f64,
}

impl Default for MeasurementBounds {
    fn default() -> Self {
        Self {
            min_temperature: -130.0,
            max_temperature: 140.0,
            min_humidity: 0.0,
            max_humidity: 100.0,
            min_pressure: 20.0,
            max_pressure: 35.0,
        }
    }
}

impl MeasurementBounds {
    #[must_use]
    pub fn with_temperature(mut self, min: f64, max: f64) -> Self {
        self.min_temperature = min;
        self.max_temperature = max;
        self
    }

    #[must_use]
    pub fn with_pressure(mut self, min: f64, max: f64) -> Self {
        self.min_pressure = min;
        self.max_pressure = max;
        self
    }

    pub fn validate(&self) -> Result<()> {
        range("temperature", self.min_temperature, self.max_temperature)?;
        range("humidity", self.min_humidity, self.max_humidity)?;
        if self.min_humidity < 0.0 || self.max_humidity > 100.0 {
            return Err(StationError::invalid_config(
                "humidity bounds must lie within [0, 100]",
            ));
        }
        range("pressure", self.min_pressure, self.max_pressure)
    }
}

fn range(name: &str, min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(StationError::invalid_config(format!(
            "{name} bounds must be finite"
        )));
    }
    if min > max {
        return Err(StationError::invalid_config(format!(
            "{name} minimum {min} exceeds maximum {max}"
        )));
    }
    Ok(())
}

/// Pressure-delta thresholds separating improving, stable, and worsening.
///
/// A delta strictly greater than `rise` is improving; strictly less than
/// `-fall` is worsening; anything in between (inclusive) is stable.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ForecastThresholds {
    pub rise: f64,
    pub fall: f64,
}

impl Default for ForecastThresholds {
    fn default() -> Self {
        Self {
            rise: DEFAULT_RISE_THRESHOLD,
            fall: DEFAULT_FALL_THRESHOLD,
        }
    }
}

impl ForecastThresholds {
    #[must_use]
    pub const fn new(rise: f64, fall: f64) -> Self {
        Self { rise, fall }
    }

    /// Same threshold in both directions.
    #[must_use]
    pub const fn symmetric(threshold: f64) -> Self {
        Self::new(threshold, threshold)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("rise", self.rise), ("fall", self.fall)] {
            if !value.is_finite() || value < 0.0 {
                return Err(StationError::invalid_config(format!(
                    "forecast {name} threshold must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Everything a station needs besides its clock.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StationConfig {
    pub bounds: MeasurementBounds,
    pub forecast: ForecastThresholds,
}

impl StationConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: MeasurementBounds) -> Self {
        self.bounds = bounds;
        self
    }

    #[must_use]
    pub fn with_forecast(mut self, forecast: ForecastThresholds) -> Self {
        self.forecast = forecast;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.bounds.validate()?;
        self.forecast.validate()
    }
}
