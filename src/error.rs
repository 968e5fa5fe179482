use thiserror::Error;

/// Rejected configuration values and other caller-visible failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("move_time must be positive, got {0} ms")]
    InvalidMoveTime(i64),
    #[error("infinity must be positive, got {0}")]
    InvalidInfinity(i32),
    #[error("internal search invariant violated: {0}")]
    InvariantViolation(&'static str),
}

pub type Res<T> = Result<T, EngineError>;
