use thiserror::Error;

/// Errors raised while resolving configurations or moving records through a codec.
///
/// Out-of-range input values are never errors; they are clamped or wrapped.
/// Buffer overruns panic in `trspack-bits` instead of surfacing here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("Invalid range [{min}, {max}]: bounds must be finite with min <= max")]
    InvalidRange { min: f32, max: f32 },

    #[error("Invalid precision {0}: step size must be finite and positive")]
    InvalidPrecision(f32),

    #[error("Invalid resolution: step count must be at least 1")]
    InvalidResolution,

    #[error("Rotation budget of {0} bits is outside the supported 16..=64 range")]
    RotationBitsOutOfRange(u32),

    #[error("Record needs {requested} bits but the target holds only {limit}")]
    BitBudgetExceeded { requested: u32, limit: u32 },

    #[error("Element kind mismatch: codec expects {expected}, got {actual}")]
    KindMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}
