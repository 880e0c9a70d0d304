#![forbid(unsafe_code)]

//! The single-threaded weather station subject.
//!
//! # Design
//!
//! [`WeatherStation`] is a cheaply cloneable handle around
//! `Rc<RefCell<StationInner>>`. The inner borrow is never held while a
//! dependent runs, so dependents may read from the station or attach and
//! detach other dependents (or themselves) from inside their own update.
//!
//! # Invariants
//!
//! 1. Each successful `set_measurements` runs exactly one notification pass.
//! 2. A pass visits the registry snapshot taken when the pass began, in
//!    attachment order, each dependent exactly once.
//! 3. Attach/detach issued during a pass take effect from the next pass.
//! 4. A rejected measurement changes nothing and notifies nobody.
//!
//! # Failure Modes
//!
//! - **Invalid input**: `set_measurements` returns
//!   [`StationError::InvalidMeasurement`]; the stored measurement is kept.
//! - **Nested pass**: `set_measurements` called from inside an update
//!   returns [`StationError::ReentrantNotification`].
//! - **Dependent already borrowed**: if the caller holds a borrow of a
//!   registered display, `set_measurements` returns
//!   [`StationError::DependentBusy`] before storing anything. A dependent
//!   that another dependent borrows mid-pass is skipped for that pass with
//!   a warning.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use skywatch_core::{Clock, Measurement, Result, StationConfig, StationError};
use tracing::{debug, debug_span, trace, warn};

use crate::dependent::{Dependent, DependentId, DependentRef, PassView, StationView};
use crate::registry::Registry;

struct StationInner {
    measurement: Option<Measurement>,
    registry: Registry<DependentRef>,
    config: StationConfig,
    clock: Clock,
    /// True while a notification pass is dispatching.
    notifying: bool,
    /// Completed-or-running pass count, for log correlation.
    passes: u64,
}

/// Subject owning the current measurement and the dependent registry.
///
/// Cloning a `WeatherStation` creates a new handle to the **same** station.
#[derive(Clone)]
pub struct WeatherStation {
    inner: Rc<RefCell<StationInner>>,
}

/// Non-owning handle, for dependents that call back into their station.
#[derive(Clone)]
pub struct WeakStation {
    inner: Weak<RefCell<StationInner>>,
}

impl WeakStation {
    #[must_use]
    pub fn upgrade(&self) -> Option<WeatherStation> {
        self.inner.upgrade().map(|inner| WeatherStation { inner })
    }
}

impl std::fmt::Debug for WeatherStation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("WeatherStation")
            .field("measurement", &inner.measurement)
            .field("dependents", &inner.registry.len())
            .field("passes", &inner.passes)
            .finish()
    }
}

impl Default for WeatherStation {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherStation {
    /// Empty station with the default configuration and the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::build(StationConfig::default(), Clock::System)
    }

    /// Station with a custom configuration.
    pub fn with_config(config: StationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, Clock::System))
    }

    /// Replace the time source used to stamp measurements.
    #[must_use]
    pub fn with_clock(self, clock: impl Into<Clock>) -> Self {
        self.inner.borrow_mut().clock = clock.into();
        self
    }

    fn build(config: StationConfig, clock: Clock) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StationInner {
                measurement: None,
                registry: Registry::new(),
                config,
                clock,
                notifying: false,
                passes: 0,
            })),
        }
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakStation {
        WeakStation {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Register `dependent`. Returns `false` if it was already registered,
    /// in which case nothing changes.
    pub fn attach(&self, dependent: DependentRef) -> bool {
        let id = DependentId::of(&dependent);
        let name = dependent.try_borrow().map(|d| d.name()).unwrap_or("<busy>");
        let added = self.inner.borrow_mut().registry.insert(id, dependent);
        debug!(dependent = %id, name, added, "station.attach");
        added
    }

    /// Wrap `dependent` in a fresh handle, register it, and return the
    /// handle for reading its derived view later.
    pub fn attach_new<D: Dependent + 'static>(&self, dependent: D) -> Rc<RefCell<D>> {
        let handle = Rc::new(RefCell::new(dependent));
        self.attach(handle.clone());
        handle
    }

    /// Unregister `dependent`. Returns `false` if it was not registered.
    pub fn detach<D: Dependent + ?Sized>(&self, dependent: &Rc<RefCell<D>>) -> bool {
        self.detach_id(DependentId::of(dependent))
    }

    pub fn detach_id(&self, id: DependentId) -> bool {
        let removed = self.inner.borrow_mut().registry.remove(id);
        debug!(dependent = %id, removed, "station.detach");
        removed
    }

    #[must_use]
    pub fn is_attached<D: Dependent + ?Sized>(&self, dependent: &Rc<RefCell<D>>) -> bool {
        self.inner
            .borrow()
            .registry
            .contains(DependentId::of(dependent))
    }

    #[must_use]
    pub fn dependent_count(&self) -> usize {
        self.inner.borrow().registry.len()
    }

    /// Registered identities in attachment order.
    #[must_use]
    pub fn dependent_ids(&self) -> Vec<DependentId> {
        self.inner.borrow().registry.ids()
    }

    /// Number of notification passes started so far.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.inner.borrow().passes
    }

    /// Validate and store a new measurement, then notify every registered
    /// dependent once, in attachment order.
    ///
    /// Returns the stored measurement.
    pub fn set_measurements(
        &self,
        temperature: f64,
        humidity: f64,
        pressure: f64,
    ) -> Result<Measurement> {
        let (measurement, snapshot, pass) = {
            let mut inner = self.inner.borrow_mut();
            if inner.notifying {
                warn!("set_measurements rejected: notification pass in progress");
                return Err(StationError::ReentrantNotification);
            }
            let measurement = Measurement::new(temperature, humidity, pressure, inner.clock.now());
            if let Err(err) = measurement.validate(&inner.config.bounds) {
                warn!(%err, "measurement rejected");
                return Err(err);
            }
            let snapshot = inner.registry.snapshot();
            if let Some((id, _)) = snapshot.iter().find(|(_, d)| d.try_borrow_mut().is_err()) {
                warn!(dependent = %id, "set_measurements rejected: dependent is borrowed");
                return Err(StationError::DependentBusy {
                    dependent: id.to_string(),
                });
            }
            inner.measurement = Some(measurement);
            inner.notifying = true;
            inner.passes += 1;
            (measurement, snapshot, inner.passes)
        };

        let _pass = PassGuard { inner: &self.inner };
        let view = PassView::new(self, measurement);
        let span = debug_span!("station.notify", pass, dependents = snapshot.len());
        let _enter = span.enter();
        for (id, dependent) in snapshot {
            let Ok(mut dependent) = dependent.try_borrow_mut() else {
                warn!(dependent = %id, "dispatch skipped: dependent borrowed during pass");
                continue;
            };
            trace!(dependent = %id, name = dependent.name(), "dispatch");
            dependent.update(&view, &measurement);
        }
        Ok(measurement)
    }
}

impl StationView for WeatherStation {
    fn measurement(&self) -> Option<Measurement> {
        self.inner.borrow().measurement
    }

    fn config(&self) -> StationConfig {
        self.inner.borrow().config
    }
}

/// Clears the `notifying` flag when a pass ends, including by unwinding.
struct PassGuard<'a> {
    inner: &'a RefCell<StationInner>,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.notifying = false;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
