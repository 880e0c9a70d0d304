#![forbid(unsafe_code)]

//! Subject/observer notification engine for skywatch.
//!
//! A [`WeatherStation`] owns the current [`Measurement`] and an ordered
//! registry of [`Dependent`]s. Each call to
//! [`set_measurements`](WeatherStation::set_measurements) validates the new
//! reading, stores it, and synchronously runs one notification pass over a
//! snapshot of the registry.
//!
//! # Invariants
//!
//! 1. Dependents are notified in attachment order.
//! 2. A dependent identity is registered at most once; attaching it again
//!    is a no-op, as is detaching an identity that is not registered.
//! 3. Attach/detach during a pass affect only later passes.
//! 4. Derived views never observe an invalid measurement.
//!
//! # Example
//!
//! ```
//! use skywatch_runtime::WeatherStation;
//! use skywatch_runtime::displays::{ForecastDisplay, StatisticsDisplay, Trend};
//!
//! let station = WeatherStation::new();
//! let stats = station.attach_new(StatisticsDisplay::new());
//! let forecast = station.attach_new(ForecastDisplay::new());
//!
//! station.set_measurements(80.0, 65.0, 30.4).unwrap();
//! station.set_measurements(82.0, 70.0, 30.9).unwrap();
//!
//! assert_eq!(stats.borrow().average(), Ok(81.0));
//! assert_eq!(forecast.borrow().trend(), Trend::Improving);
//! ```
//!
//! [`Measurement`]: skywatch_core::Measurement

pub mod dependent;
pub mod displays;
pub mod registry;
pub mod shared;
pub mod station;

pub use dependent::{Dependent, DependentId, DependentRef, SharedDependentRef, StationView};
pub use registry::Registry;
pub use shared::SharedWeatherStation;
pub use station::{WeakStation, WeatherStation};
