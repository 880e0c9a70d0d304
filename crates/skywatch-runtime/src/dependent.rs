#![forbid(unsafe_code)]

//! The dependent capability and the read-only station view it receives.
//!
//! A [`Dependent`] has a single operation, [`update`](Dependent::update),
//! invoked once per notification pass. Every call carries both delivery
//! styles:
//!
//! - **Push**: the freshly stored [`Measurement`] is passed by reference.
//! - **Pull**: a [`StationView`] lets the dependent read whatever it needs
//!   from the station itself. During a pass the view is pinned to the
//!   reading that pass was started for, so push and pull agree even when
//!   another producer has stored a newer reading in the meantime.
//!
//! Identity is by allocation: two handles to the same `Rc`/`Arc` are the
//! same dependent, two separately allocated but equal values are not.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use skywatch_core::{Measurement, StationConfig};

/// Something that reacts to station state changes.
pub trait Dependent {
    /// Receive the latest measurement.
    ///
    /// Called synchronously by the station; the station's own state is not
    /// borrowed while this runs, so implementations may read from `station`
    /// or call back into a station handle they hold.
    fn update(&mut self, station: &dyn StationView, measurement: &Measurement);

    /// Short name used in log fields.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Read-only access to a station, for pull-style dependents.
pub trait StationView {
    /// The stored measurement, `None` before the first update.
    fn measurement(&self) -> Option<Measurement>;

    fn config(&self) -> StationConfig;

    fn temperature(&self) -> Option<f64> {
        self.measurement().map(|m| m.temperature())
    }

    fn humidity(&self) -> Option<f64> {
        self.measurement().map(|m| m.humidity())
    }

    fn pressure(&self) -> Option<f64> {
        self.measurement().map(|m| m.pressure())
    }
}

/// The view handed to dependents during one notification pass.
///
/// Measurement reads resolve to the reading the pass was started for;
/// everything else is forwarded to the station.
pub(crate) struct PassView<'a> {
    station: &'a dyn StationView,
    measurement: Measurement,
}

impl<'a> PassView<'a> {
    pub(crate) fn new(station: &'a dyn StationView, measurement: Measurement) -> Self {
        Self {
            station,
            measurement,
        }
    }
}

impl StationView for PassView<'_> {
    fn measurement(&self) -> Option<Measurement> {
        Some(self.measurement)
    }

    fn config(&self) -> StationConfig {
        self.station.config()
    }
}

/// Handle type held by the single-threaded station.
pub type DependentRef = Rc<RefCell<dyn Dependent>>;

/// Handle type held by the thread-safe station.
pub type SharedDependentRef = Arc<Mutex<dyn Dependent + Send>>;

/// Identity of a registered dependent.
///
/// Derived from the address of the shared allocation, which cannot be
/// reused while the registry still holds a strong handle to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependentId(usize);

impl DependentId {
    #[must_use]
    pub fn of<D: ?Sized>(dependent: &Rc<RefCell<D>>) -> Self {
        Self(Rc::as_ptr(dependent).cast::<()>() as usize)
    }

    #[must_use]
    pub fn of_shared<D: ?Sized>(dependent: &Arc<Mutex<D>>) -> Self {
        Self(Arc::as_ptr(dependent).cast::<()>() as usize)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for DependentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dep#{:x}", self.0)
    }
}
