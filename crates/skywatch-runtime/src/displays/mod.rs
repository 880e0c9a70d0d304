#![forbid(unsafe_code)]

//! Concrete dependents.
//!
//! | display | style | derived state |
//! |---|---|---|
//! | [`CurrentConditionsDisplay`] | push | latest measurement |
//! | [`StatisticsDisplay`] | pull | running min/max/sum/count |
//! | [`ForecastDisplay`] | push | previous and latest pressure |
//! | [`HeatIndexDisplay`] | push | last heat index |
//!
//! Each display renders a one-line human-readable view through
//! [`std::fmt::Display`].

pub mod current;
pub mod forecast;
pub mod heat_index;
pub mod statistics;

pub use current::CurrentConditionsDisplay;
pub use forecast::{ForecastDisplay, Trend, classify};
pub use heat_index::{HeatIndexDisplay, heat_index};
pub use statistics::StatisticsDisplay;
