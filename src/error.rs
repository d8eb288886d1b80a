use thiserror::Error;

use crate::trim::AxisReport;

/// Crate-wide error type. Every variant corresponds to an error kind named in
/// the flight-dynamics core's error handling design.
#[derive(Error, Debug, Clone)]
pub enum FlightCoreError {
    #[error("unknown unit: {0}")]
    UnknownUnit(String),

    #[error("bad unit for this operation: {0}")]
    BadUnit(String),

    #[error("value out of range: {0}")]
    OutOfRange(String),

    #[error("numeric solve did not converge or did not bracket a root: {0}")]
    NoSolution(String),

    #[error("trim did not converge within the iteration cap")]
    TrimFailed { report: Vec<AxisReport> },

    #[error("initialization document is malformed: {0}")]
    BadSchema(String),

    #[error("initialization document version is unsupported: {0}")]
    UnsupportedVersion(String),

    #[error("component constructed without a valid executive/collaborator")]
    MissingCollaborator(String),
}

pub type Result<T> = std::result::Result<T, FlightCoreError>;
