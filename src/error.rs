use crate::segment::HalfHourSegment;

/// Planning failures surfaced to the caller.
///
/// None of these are recovered internally, and the planner performs no retries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A caller-supplied value is outside the range the planning run accepts.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A working mode outside the three known variants reached the decode boundary.
    #[error("unknown working mode `{0}`")]
    UnknownMode(String),

    /// Post-simulation validation failed.
    #[error("invariant violation at segment {segment}: {detail}")]
    InvariantViolation {
        segment: HalfHourSegment,
        detail: String,
    },

    /// The caller cancelled the planning run; the partial plan is discarded.
    #[error("the planning run was cancelled")]
    Cancelled,

    /// A forecast port failed. The underlying error is surfaced unchanged.
    #[error(transparent)]
    Forecast(#[from] anyhow::Error),
}

pub type Result<T = (), E = Error> = std::result::Result<T, E>;
