#![forbid(unsafe_code)]

//! Thread-safe weather station.
//!
//! [`SharedWeatherStation`] is the multi-producer counterpart of
//! [`WeatherStation`](crate::WeatherStation). All mutations of the stored
//! measurement and the registry are serialized under one mutex. A
//! notification pass validates, stores, and snapshots while holding that
//! lock, then **releases it** before invoking any dependent, so a dependent
//! may call back into the station without deadlocking.
//!
//! # Invariants
//!
//! 1. Registry order and identity uniqueness match the single-threaded
//!    station.
//! 2. Each successful `set_measurements` dispatches its own snapshot; the
//!    passes of concurrent callers may interleave with each other.
//! 3. A thread that is dispatching a pass cannot start another pass on the
//!    same station; it gets [`StationError::ReentrantNotification`].
//! 4. Dependents reading through the view they are handed see the reading
//!    their pass was started for, never a newer one stored by another
//!    producer while the pass was running.
//!
//! # Failure Modes
//!
//! - **Poisoned lock**: a panic inside a dependent poisons only that
//!   dependent's mutex; the station state is replaced wholesale under its
//!   lock, so a poisoned station mutex is recovered rather than propagated.

use std::cell::RefCell;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use skywatch_core::{Clock, Measurement, Result, StationConfig, StationError};
use tracing::{debug, debug_span, trace, warn};

use crate::dependent::{Dependent, DependentId, PassView, SharedDependentRef, StationView};
use crate::registry::Registry;

struct SharedState {
    measurement: Option<Measurement>,
    registry: Registry<SharedDependentRef>,
    config: StationConfig,
    clock: Clock,
    passes: u64,
}

thread_local! {
    /// Stations this thread is currently dispatching for, by address.
    static DISPATCHING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Subject safe to share across threads.
///
/// Cloning creates a new handle to the **same** station.
#[derive(Clone)]
pub struct SharedWeatherStation {
    state: Arc<Mutex<SharedState>>,
}

impl std::fmt::Debug for SharedWeatherStation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("SharedWeatherStation")
            .field("measurement", &state.measurement)
            .field("dependents", &state.registry.len())
            .field("passes", &state.passes)
            .finish()
    }
}

impl Default for SharedWeatherStation {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedWeatherStation {
    #[must_use]
    pub fn new() -> Self {
        Self::build(StationConfig::default(), Clock::System)
    }

    pub fn with_config(config: StationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, Clock::System))
    }

    #[must_use]
    pub fn with_clock(self, clock: impl Into<Clock>) -> Self {
        self.lock().clock = clock.into();
        self
    }

    fn build(config: StationConfig, clock: Clock) -> Self {
        Self {
            state: Arc::new(Mutex::new(SharedState {
                measurement: None,
                registry: Registry::new(),
                config,
                clock,
                passes: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.state).cast::<()>() as usize
    }

    pub fn attach(&self, dependent: SharedDependentRef) -> bool {
        let id = DependentId::of_shared(&dependent);
        let added = self.lock().registry.insert(id, dependent);
        debug!(dependent = %id, added, "shared_station.attach");
        added
    }

    pub fn attach_new<D: Dependent + Send + 'static>(&self, dependent: D) -> Arc<Mutex<D>> {
        let handle = Arc::new(Mutex::new(dependent));
        self.attach(handle.clone());
        handle
    }

    pub fn detach<D: Dependent + ?Sized>(&self, dependent: &Arc<Mutex<D>>) -> bool {
        self.detach_id(DependentId::of_shared(dependent))
    }

    pub fn detach_id(&self, id: DependentId) -> bool {
        let removed = self.lock().registry.remove(id);
        debug!(dependent = %id, removed, "shared_station.detach");
        removed
    }

    #[must_use]
    pub fn is_attached<D: Dependent + ?Sized>(&self, dependent: &Arc<Mutex<D>>) -> bool {
        self.lock()
            .registry
            .contains(DependentId::of_shared(dependent))
    }

    #[must_use]
    pub fn dependent_count(&self) -> usize {
        self.lock().registry.len()
    }

    #[must_use]
    pub fn dependent_ids(&self) -> Vec<DependentId> {
        self.lock().registry.ids()
    }

    #[must_use]
    pub fn passes(&self) -> u64 {
        self.lock().passes
    }

    /// Validate and store a new measurement, then notify the registry
    /// snapshot taken under the lock, in attachment order.
    pub fn set_measurements(
        &self,
        temperature: f64,
        humidity: f64,
        pressure: f64,
    ) -> Result<Measurement> {
        let address = self.address();
        if DISPATCHING.with(|d| d.borrow().contains(&address)) {
            warn!("set_measurements rejected: notification pass in progress on this thread");
            return Err(StationError::ReentrantNotification);
        }

        let (measurement, snapshot, pass) = {
            let mut state = self.lock();
            let measurement = Measurement::new(temperature, humidity, pressure, state.clock.now());
            if let Err(err) = measurement.validate(&state.config.bounds) {
                warn!(%err, "measurement rejected");
                return Err(err);
            }
            state.measurement = Some(measurement);
            state.passes += 1;
            (measurement, state.registry.snapshot(), state.passes)
        };

        let _pass = DispatchGuard::enter(address);
        let view = PassView::new(self, measurement);
        let span = debug_span!("station.notify", pass, dependents = snapshot.len());
        let _enter = span.enter();
        for (id, dependent) in snapshot {
            let mut dependent = dependent.lock().unwrap_or_else(PoisonError::into_inner);
            trace!(dependent = %id, name = dependent.name(), "dispatch");
            dependent.update(&view, &measurement);
        }
        Ok(measurement)
    }
}

impl StationView for SharedWeatherStation {
    fn measurement(&self) -> Option<Measurement> {
        self.lock().measurement
    }

    fn config(&self) -> StationConfig {
        self.lock().config
    }
}

/// Marks the current thread as dispatching for one station until dropped.
struct DispatchGuard {
    address: usize,
}

impl DispatchGuard {
    fn enter(address: usize) -> Self {
        DISPATCHING.with(|d| d.borrow_mut().push(address));
        Self { address }
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|d| {
            let mut d = d.borrow_mut();
            if let Some(index) = d.iter().rposition(|a| *a == self.address) {
                d.remove(index);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::displays::{CurrentConditionsDisplay, StatisticsDisplay};
    use skywatch_core::LabClock;
    use web_time::{Duration, UNIX_EPOCH};

    struct Counter {
        calls: u32,
    }

    impl Dependent for Counter {
        fn update(&mut self, _station: &dyn StationView, _measurement: &Measurement) {
            self.calls += 1;
        }
    }

    #[test]
    fn attach_is_idempotent() {
        let station = SharedWeatherStation::new();
        let counter = Arc::new(Mutex::new(Counter { calls: 0 }));
        assert!(station.attach(counter.clone()));
        assert!(!station.attach(counter.clone()));

        station.set_measurements(70.0, 50.0, 30.0).unwrap();
        assert_eq!(counter.lock().unwrap().calls, 1);
    }

    #[test]
    fn detach_unknown_is_noop() {
        let station = SharedWeatherStation::new();
        let stranger = Arc::new(Mutex::new(Counter { calls: 0 }));
        assert!(!station.detach(&stranger));
        assert_eq!(station.dependent_count(), 0);
    }

    #[test]
    fn scenario_matches_single_threaded_station() {
        let station = SharedWeatherStation::new();
        let current = station.attach_new(CurrentConditionsDisplay::new());
        let stats = station.attach_new(StatisticsDisplay::new());

        station.set_measurements(80.0, 65.0, 30.4).unwrap();
        assert!(station.detach(&stats));
        station.set_measurements(82.0, 70.0, 29.2).unwrap();

        assert_eq!(stats.lock().unwrap().count(), 1);
        assert_eq!(current.lock().unwrap().temperature(), Some(82.0));
    }

    #[test]
    fn callback_into_station_does_not_deadlock() {
        struct Reader {
            station: SharedWeatherStation,
            seen: Option<f64>,
            count: usize,
        }
        impl Dependent for Reader {
            fn update(&mut self, _station: &dyn StationView, _measurement: &Measurement) {
                self.seen = self.station.temperature();
                self.count = self.station.dependent_count();
            }
        }

        let station = SharedWeatherStation::new();
        let reader = station.attach_new(Reader {
            station: station.clone(),
            seen: None,
            count: 0,
        });
        station.set_measurements(64.0, 40.0, 30.0).unwrap();

        let reader = reader.lock().unwrap();
        assert_eq!(reader.seen, Some(64.0));
        assert_eq!(reader.count, 1);
    }

    #[test]
    fn nested_pass_on_same_thread_rejected() {
        struct Nested {
            station: SharedWeatherStation,
            result: Option<Result<Measurement>>,
        }
        impl Dependent for Nested {
            fn update(&mut self, _station: &dyn StationView, _measurement: &Measurement) {
                self.result = Some(self.station.set_measurements(1.0, 1.0, 30.0));
            }
        }

        let station = SharedWeatherStation::new();
        let nested = station.attach_new(Nested {
            station: station.clone(),
            result: None,
        });
        station.set_measurements(70.0, 50.0, 30.0).unwrap();

        assert_eq!(
            nested.lock().unwrap().result,
            Some(Err(StationError::ReentrantNotification))
        );
        assert_eq!(station.passes(), 1);
        assert!(station.set_measurements(71.0, 50.0, 30.0).is_ok());
    }

    #[test]
    fn interleaved_producer_does_not_leak_into_earlier_pass() {
        /// Holds the first pass open until another thread has stored 90.0.
        struct Gate {
            station: SharedWeatherStation,
            producer: Option<std::thread::JoinHandle<Result<Measurement>>>,
        }
        impl Dependent for Gate {
            fn update(&mut self, _station: &dyn StationView, _measurement: &Measurement) {
                if self.producer.is_some() {
                    return;
                }
                let station = self.station.clone();
                self.producer = Some(std::thread::spawn(move || {
                    station.set_measurements(90.0, 50.0, 30.0)
                }));
                while self.station.temperature() != Some(90.0) {
                    std::thread::yield_now();
                }
            }
        }

        let station = SharedWeatherStation::new();
        let gate = station.attach_new(Gate {
            station: station.clone(),
            producer: None,
        });
        let stats = station.attach_new(StatisticsDisplay::new());

        station.set_measurements(70.0, 50.0, 30.0).unwrap();
        let producer = gate.lock().unwrap().producer.take().unwrap();
        producer.join().unwrap().unwrap();

        let stats = stats.lock().unwrap();
        assert_eq!(stats.count(), 2);
        assert_eq!(stats.min(), Ok(70.0));
        assert_eq!(stats.max(), Ok(90.0));
        assert_eq!(stats.average(), Ok(80.0));
    }

    #[test]
    fn rejected_measurement_leaves_state() {
        let station = SharedWeatherStation::new();
        let counter = station.attach_new(Counter { calls: 0 });
        assert!(station.set_measurements(70.0, 150.0, 30.0).is_err());
        assert_eq!(station.measurement(), None);
        assert_eq!(counter.lock().unwrap().calls, 0);
    }

    #[test]
    fn lab_clock_stamps_observed_at() {
        let lab = LabClock::new();
        let station = SharedWeatherStation::new().with_clock(lab.clone());
        lab.advance(Duration::from_secs(5));
        let m = station.set_measurements(70.0, 50.0, 30.0).unwrap();
        assert_eq!(m.observed_at(), UNIX_EPOCH + Duration::from_secs(5));
    }

    #[test]
    fn handle_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedWeatherStation>();
    }
}
