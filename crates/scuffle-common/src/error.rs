//! Error types for Project Scuffle.

use thiserror::Error;

use crate::ids::ActorId;

/// Top-level error type for Scuffle operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScuffleError {
    /// A boundary argument was out of its valid domain
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Argument name
        name: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Actor is not registered in the arena
    #[error("unknown actor: {0}")]
    UnknownActor(ActorId),
}

impl ScuffleError {
    /// Builds an [`ScuffleError::InvalidArgument`].
    #[must_use]
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type alias for Scuffle operations.
pub type ScuffleResult<T> = Result<T, ScuffleError>;

/// Rejects negative amounts (damage, healing).
pub fn ensure_non_negative(name: &'static str, value: i32) -> ScuffleResult<i32> {
    if value < 0 {
        return Err(ScuffleError::invalid(name, format!("must be >= 0, got {value}")));
    }
    Ok(value)
}

/// Rejects zero, negative, NaN and infinite durations/ranges.
pub fn ensure_positive(name: &'static str, value: f32) -> ScuffleResult<f32> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ScuffleError::invalid(name, format!("must be finite and > 0, got {value}")));
    }
    Ok(value)
}

/// Rejects negative, NaN and infinite tuning values. Zero is allowed.
pub fn ensure_non_negative_finite(name: &'static str, value: f32) -> ScuffleResult<f32> {
    if !value.is_finite() || value < 0.0 {
        return Err(ScuffleError::invalid(name, format!("must be finite and >= 0, got {value}")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_non_negative() {
        assert_eq!(ensure_non_negative("damage", 0), Ok(0));
        assert!(matches!(
            ensure_non_negative("damage", -1),
            Err(ScuffleError::InvalidArgument { name: "damage", .. })
        ));
    }

    #[test]
    fn test_ensure_positive_rejects_nan() {
        assert!(ensure_positive("range", f32::NAN).is_err());
        assert!(ensure_positive("range", 0.0).is_err());
        assert!(ensure_positive("range", f32::INFINITY).is_err());
        assert_eq!(ensure_positive("range", 2.0), Ok(2.0));
    }

    #[test]
    fn test_ensure_non_negative_finite() {
        assert_eq!(ensure_non_negative_finite("cooldown", 0.0), Ok(0.0));
        assert_eq!(ensure_non_negative_finite("cooldown", 1.5), Ok(1.5));
        assert!(ensure_non_negative_finite("cooldown", -0.1).is_err());
        assert!(ensure_non_negative_finite("cooldown", f32::NAN).is_err());
        assert!(ensure_non_negative_finite("cooldown", f32::INFINITY).is_err());
    }
}
