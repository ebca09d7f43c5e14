//! Error types for configuration and catalog loading.
//!
//! The simulation itself never fails: degenerate inputs (zero-area container,
//! empty catalog) degrade to an idle, empty field.  Errors only surface where
//! external data enters the crate, i.e. `assets/field.toml` and
//! `assets/catalog.toml`, and callers log them and fall back to defaults.

/// Top-level error enum for the tool field.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// A tuning value is outside its safe operating range.
    #[error("config value '{name}' = {value} is outside safe range {safe_range}")]
    InvalidConfig {
        name: &'static str,
        value: f32,
        safe_range: &'static str,
    },

    /// Two catalog entries share the same identity.
    #[error("catalog contains duplicate tool identity '{identity}'")]
    DuplicateIdentity { identity: String },

    /// A catalog entry carries a negative monthly price.
    #[error("tool '{identity}' has negative price {price}")]
    NegativePrice { identity: String, price: f32 },

    #[error("failed to parse field config: {0}")]
    ConfigParse(#[source] toml::de::Error),

    #[error("failed to parse catalog: {0}")]
    CatalogParse(#[source] toml::de::Error),
}

/// Convenience alias: a `Result` using `FieldError` as the error type.
pub type FieldResult<T> = Result<T, FieldError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is strictly positive and finite.
pub fn validate_positive(name: &'static str, value: f32) -> FieldResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FieldError::InvalidConfig {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error unless `value` is finite and not negative.
pub fn validate_non_negative(name: &'static str, value: f32) -> FieldResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FieldError::InvalidConfig {
            name,
            value,
            safe_range: "[0.0, ∞)",
        })
    }
}

/// Returns an error unless `min <= max`; `max_name` is reported on failure.
pub fn validate_range(max_name: &'static str, min: f32, max: f32) -> FieldResult<()> {
    if min <= max {
        Ok(())
    } else {
        Err(FieldError::InvalidConfig {
            name: max_name,
            value: max,
            safe_range: "[min, ∞)",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero_and_nan() {
        assert!(validate_positive("x", 0.0).is_err());
        assert!(validate_positive("x", f32::NAN).is_err());
        assert!(validate_positive("x", 1.0).is_ok());
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        let err = validate_range("size_max", 60.0, 45.0).unwrap_err();
        assert!(err.to_string().contains("size_max"));
        assert!(validate_range("size_max", 45.0, 45.0).is_ok());
    }
}
