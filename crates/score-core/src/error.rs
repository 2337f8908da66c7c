use thiserror::Error;

/// Rejection reasons for musical parameters at the offline boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("duration must be positive, got {0} s")]
    NonPositiveDuration(f32),
    #[error("duration {0} s exceeds the {max} s limit", max = crate::constants::MAX_DURATION_SECS)]
    DurationTooLong(f32),
    #[error("tempo must be positive, got {0} bpm")]
    NonPositiveTempo(f32),
    #[error("{field} is not a finite number")]
    NonFinite { field: &'static str },
}
