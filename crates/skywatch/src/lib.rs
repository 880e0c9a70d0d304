#![forbid(unsafe_code)]

//! skywatch public facade crate.
//!
//! Re-exports the station, the built-in displays, and the core measurement
//! and configuration types behind a single `prelude` import.

pub mod prelude {
    pub use skywatch_core as core;
    pub use skywatch_runtime as runtime;

    pub use skywatch_core::{
        Clock, ForecastThresholds, LabClock, Measurement, MeasurementBounds, Result,
        StationConfig, StationError,
    };
    pub use skywatch_runtime::displays::{
        CurrentConditionsDisplay, ForecastDisplay, HeatIndexDisplay, StatisticsDisplay, Trend,
    };
    pub use skywatch_runtime::{
        Dependent, DependentId, SharedWeatherStation, StationView, WeakStation, WeatherStation,
    };
}
