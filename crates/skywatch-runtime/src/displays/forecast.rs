#![forbid(unsafe_code)]

//! Pressure-trend forecasting.
//!
//! The trend is classified from the delta between the two most recent
//! pressures:
//!
//! | condition | trend |
//! |---|---|
//! | fewer than two readings | [`Trend::Unknown`] |
//! | `delta > rise` | [`Trend::Improving`] |
//! | `delta < -fall` | [`Trend::Worsening`] |
//! | otherwise | [`Trend::Stable`] |
//!
//! `rise` and `fall` default to [`DEFAULT_RISE_THRESHOLD`] and
//! [`DEFAULT_FALL_THRESHOLD`] (0.05 inHg each).
//!
//! [`DEFAULT_RISE_THRESHOLD`]: skywatch_core::DEFAULT_RISE_THRESHOLD
//! [`DEFAULT_FALL_THRESHOLD`]: skywatch_core::DEFAULT_FALL_THRESHOLD

use std::fmt;

use skywatch_core::{ForecastThresholds, Measurement};
use tracing::trace;

use crate::dependent::{Dependent, StationView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Trend {
    /// No previous pressure to compare against.
    #[default]
    Unknown,
    Improving,
    Stable,
    Worsening,
}

impl Trend {
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Unknown => "Not enough data for forecast",
            Self::Improving => "Improving weather on the way!",
            Self::Stable => "More of the same",
            Self::Worsening => "Watch out for cooler, rainy weather",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Classify the move from `previous` to `current`.
#[must_use]
pub fn classify(previous: Option<f64>, current: f64, thresholds: ForecastThresholds) -> Trend {
    let Some(previous) = previous else {
        return Trend::Unknown;
    };
    let delta = current - previous;
    if delta > thresholds.rise {
        Trend::Improving
    } else if delta < -thresholds.fall {
        Trend::Worsening
    } else {
        Trend::Stable
    }
}

#[derive(Debug, Clone, Default)]
pub struct ForecastDisplay {
    thresholds: ForecastThresholds,
    previous_pressure: Option<f64>,
    last_pressure: Option<f64>,
}

impl ForecastDisplay {
    /// Forecast with the default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_thresholds(thresholds: ForecastThresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    /// Forecast using whatever thresholds `station` is configured with.
    #[must_use]
    pub fn for_station(station: &dyn StationView) -> Self {
        Self::with_thresholds(station.config().forecast)
    }

    #[must_use]
    pub fn thresholds(&self) -> ForecastThresholds {
        self.thresholds
    }

    #[must_use]
    pub fn last_pressure(&self) -> Option<f64> {
        self.last_pressure
    }

    #[must_use]
    pub fn trend(&self) -> Trend {
        match self.last_pressure {
            Some(current) => classify(self.previous_pressure, current, self.thresholds),
            None => Trend::Unknown,
        }
    }
}

impl Dependent for ForecastDisplay {
    fn update(&mut self, _station: &dyn StationView, measurement: &Measurement) {
        self.previous_pressure = self.last_pressure;
        self.last_pressure = Some(measurement.pressure());
        trace!(
            previous = ?self.previous_pressure,
            current = measurement.pressure(),
            trend = ?self.trend(),
            "forecast.update"
        );
    }

    fn name(&self) -> &'static str {
        "forecast"
    }
}

impl fmt::Display for ForecastDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Forecast: {}", self.trend())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::WeatherStation;
    use skywatch_core::StationConfig;

    fn run(pressures: &[f64]) -> Trend {
        let station = WeatherStation::new();
        let forecast = station.attach_new(ForecastDisplay::new());
        for p in pressures {
            station.set_measurements(70.0, 60.0, *p).unwrap();
        }
        forecast.borrow().trend()
    }

    #[test]
    fn unknown_before_and_after_first_reading() {
        assert_eq!(ForecastDisplay::new().trend(), Trend::Unknown);
        assert_eq!(run(&[30.4]), Trend::Unknown);
    }

    #[test]
    fn rising_pressure_improves() {
        assert_eq!(run(&[30.4, 30.9]), Trend::Improving);
        assert_eq!(run(&[30.0, 30.5]), Trend::Improving);
    }

    #[test]
    fn falling_pressure_worsens() {
        assert_eq!(run(&[30.0, 29.5]), Trend::Worsening);
        assert_eq!(run(&[30.4, 29.2]), Trend::Worsening);
    }

    #[test]
    fn equal_pressure_is_stable() {
        assert_eq!(run(&[29.2, 29.2]), Trend::Stable);
    }

    #[test]
    fn small_moves_inside_thresholds_are_stable() {
        assert_eq!(run(&[30.0, 30.04]), Trend::Stable);
        assert_eq!(run(&[30.0, 29.96]), Trend::Stable);
    }

    #[test]
    fn only_latest_delta_counts() {
        assert_eq!(run(&[29.0, 30.0, 29.0]), Trend::Worsening);
    }

    #[test]
    fn classify_boundaries_are_exclusive() {
        let t = ForecastThresholds::symmetric(0.5);
        assert_eq!(classify(None, 30.0, t), Trend::Unknown);
        assert_eq!(classify(Some(1.0), 1.5, t), Trend::Stable);
        assert_eq!(classify(Some(1.0), 0.5, t), Trend::Stable);
        assert_eq!(classify(Some(1.0), 1.75, t), Trend::Improving);
        assert_eq!(classify(Some(1.0), 0.25, t), Trend::Worsening);
    }

    #[test]
    fn asymmetric_thresholds() {
        let t = ForecastThresholds::new(1.0, 0.0);
        assert_eq!(classify(Some(30.0), 30.5, t), Trend::Stable);
        assert_eq!(classify(Some(30.0), 29.99, t), Trend::Worsening);
    }

    #[test]
    fn for_station_uses_configured_thresholds() {
        let config = StationConfig::new().with_forecast(ForecastThresholds::symmetric(1.0));
        let station = WeatherStation::with_config(config).unwrap();
        let forecast = station.attach_new(ForecastDisplay::for_station(&station));
        station.set_measurements(70.0, 60.0, 30.4).unwrap();
        station.set_measurements(70.0, 60.0, 30.9).unwrap();
        assert_eq!(forecast.borrow().thresholds(), config.forecast);
        assert_eq!(forecast.borrow().trend(), Trend::Stable);
    }

    #[test]
    fn display_messages() {
        let mut forecast = ForecastDisplay::new();
        assert_eq!(forecast.to_string(), "Forecast: Not enough data for forecast");

        let station = WeatherStation::new();
        let m1 = station.set_measurements(70.0, 60.0, 30.0).unwrap();
        let m2 = station.set_measurements(70.0, 60.0, 30.5).unwrap();
        forecast.update(&station, &m1);
        forecast.update(&station, &m2);
        assert_eq!(forecast.to_string(), "Forecast: Improving weather on the way!");
        assert_eq!(forecast.last_pressure(), Some(30.5));
    }
}
