//! Immutable weather measurement snapshots.
//!
//! A [`Measurement`] is a value type: once built it never changes. The
//! station replaces its stored measurement wholesale on every update.
//!
//! Units follow the station's conventions: temperature in degrees
//! Fahrenheit, relative humidity in percent, barometric pressure in inches
//! of mercury.

use std::fmt;

use web_time::SystemTime;

use crate::config::MeasurementBounds;
use crate::error::{Result, StationError};

/// Names one of the observed quantities, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementField {
    Temperature,
    Humidity,
    Pressure,
}

impl MeasurementField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Pressure => "pressure",
        }
    }
}

impl fmt::Display for MeasurementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation of temperature, humidity, and pressure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    temperature: f64,
    humidity: f64,
    pressure: f64,
    observed_at: SystemTime,
}

impl Measurement {
    /// Build a measurement without validating it.
    ///
    /// Use [`validate`](Self::validate) (or let the station do it) before
    /// handing the value to derived computations.
    #[must_use]
    pub const fn new(
        temperature: f64,
        humidity: f64,
        pressure: f64,
        observed_at: SystemTime,
    ) -> Self {
        Self {
            temperature,
            humidity,
            pressure,
            observed_at,
        }
    }

    #[must_use]
    pub const fn temperature(&self) -> f64 {
        self.temperature
    }

    #[must_use]
    pub const fn humidity(&self) -> f64 {
        self.humidity
    }

    #[must_use]
    pub const fn pressure(&self) -> f64 {
        self.pressure
    }

    #[must_use]
    pub const fn observed_at(&self) -> SystemTime {
        self.observed_at
    }

    /// Check every field against `bounds`.
    ///
    /// Fields are checked in order temperature, humidity, pressure; the
    /// first violation is reported.
    pub fn validate(&self, bounds: &MeasurementBounds) -> Result<()> {
        check(
            MeasurementField::Temperature,
            self.temperature,
            bounds.min_temperature,
            bounds.max_temperature,
        )?;
        check(
            MeasurementField::Humidity,
            self.humidity,
            bounds.min_humidity,
            bounds.max_humidity,
        )?;
        check(
            MeasurementField::Pressure,
            self.pressure,
            bounds.min_pressure,
            bounds.max_pressure,
        )
    }
}

fn check(field: MeasurementField, value: f64, min: f64, max: f64) -> Result<()> {
    let reason = if !value.is_finite() {
        "not a finite number"
    } else if value < min {
        "below minimum"
    } else if value > max {
        "above maximum"
    } else {
        return Ok(());
    };
    Err(StationError::InvalidMeasurement {
        field,
        value,
        reason,
    })
}
