use thiserror::Error;

use crate::measurement::MeasurementField;

pub type Result<T> = std::result::Result<T, StationError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StationError {
    /// A derived view was read before any measurement reached it.
    #[error("no data yet: {view} has not received a measurement")]
    NoData { view: &'static str },

    #[error("invalid {field}: {value} ({reason})")]
    InvalidMeasurement {
        field: MeasurementField,
        value: f64,
        reason: &'static str,
    },

    /// `set_measurements` was issued from inside a dependent's update.
    #[error("set_measurements called during an in-progress notification pass")]
    ReentrantNotification,

    /// A registered dependent was already borrowed when a pass was about
    /// to start, so the pass could not reach it.
    #[error("dependent {dependent} is borrowed; release it before set_measurements")]
    DependentBusy { dependent: String },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl StationError {
    #[must_use]
    pub fn no_data(view: &'static str) -> Self {
        Self::NoData { view }
    }

    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether this error is the "query before data" condition.
    #[must_use]
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}
