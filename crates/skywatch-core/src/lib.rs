#![forbid(unsafe_code)]

//! Core: measurements, validation bounds, station configuration, clocks,
//! and the error taxonomy shared by every skywatch crate.

pub mod clock;
pub mod config;
pub mod error;
pub mod measurement;

pub use clock::{Clock, LabClock};
pub use config::{
    DEFAULT_FALL_THRESHOLD, DEFAULT_RISE_THRESHOLD, ForecastThresholds, MeasurementBounds,
    StationConfig,
};
pub use error::{Result, StationError};
pub use measurement::{Measurement, MeasurementField};
