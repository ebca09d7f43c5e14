//! Runtime field configuration loaded from `assets/field.toml`.
//!
//! [`FieldConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_field_config`] reads
//! `assets/field.toml`, validates it, and pushes the result into the running
//! [`IconField`].  Missing keys fall back to the compile-time defaults, so a
//! minimal TOML can override just the values you care about:
//!
//! ```toml
//! area_per_token = 12000.0
//! resolver = "grid"
//!
//! [boundary]
//! kind = "tethered"
//! radius = 10.0
//! ```
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `FieldConfig::default()`.

use crate::collision::ResolverKind;
use crate::constants::*;
use crate::engine::IconField;
use crate::error::{validate_non_negative, validate_positive, validate_range, FieldError, FieldResult};
use crate::physics::BoundaryPolicy;
use crate::token::HitShape;
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable layout, motion and collision configuration.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    // ── Token Count ──────────────────────────────────────────────────────────
    pub area_per_token: f32,
    pub min_tokens: usize,
    pub max_tokens: usize,

    // ── Token Geometry ───────────────────────────────────────────────────────
    pub token_size_min: f32,
    pub token_size_max: f32,
    pub grid_jitter_fraction: f32,

    // ── Motion ───────────────────────────────────────────────────────────────
    pub initial_direction_range: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub direction_jitter: f32,
    pub boundary: BoundaryPolicy,

    // ── Collision ────────────────────────────────────────────────────────────
    pub collision_nudge: f32,
    pub collision_flag_ms: u64,
    pub resolver: ResolverKind,
    pub collision_grid_cell: f32,

    // ── Interaction ──────────────────────────────────────────────────────────
    pub hit_shape: HitShape,

    // ── Frame Pacing ─────────────────────────────────────────────────────────
    pub min_frame_interval_ms: u64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            // Token Count
            area_per_token: AREA_PER_TOKEN,
            min_tokens: MIN_TOKENS,
            max_tokens: MAX_TOKENS,
            // Token Geometry
            token_size_min: TOKEN_SIZE_MIN,
            token_size_max: TOKEN_SIZE_MAX,
            grid_jitter_fraction: GRID_JITTER_FRACTION,
            // Motion
            initial_direction_range: INITIAL_DIRECTION_RANGE,
            speed_min: SPEED_MIN,
            speed_max: SPEED_MAX,
            direction_jitter: DIRECTION_JITTER,
            boundary: BoundaryPolicy::FreeRoam,
            // Collision
            collision_nudge: COLLISION_NUDGE,
            collision_flag_ms: COLLISION_FLAG_MS,
            resolver: ResolverKind::Pairwise,
            collision_grid_cell: COLLISION_GRID_CELL,
            // Interaction
            hit_shape: HitShape::Circle,
            // Frame Pacing
            min_frame_interval_ms: MIN_FRAME_INTERVAL_MS,
        }
    }
}

impl FieldConfig {
    /// Parse and validate TOML config text.
    pub fn from_toml_str(contents: &str) -> FieldResult<Self> {
        let config: FieldConfig = toml::from_str(contents).map_err(FieldError::ConfigParse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break seeding or the motion invariants.
    pub fn validate(&self) -> FieldResult<()> {
        validate_positive("area_per_token", self.area_per_token)?;
        validate_positive("token_size_min", self.token_size_min)?;
        validate_range("token_size_max", self.token_size_min, self.token_size_max)?;
        validate_non_negative("grid_jitter_fraction", self.grid_jitter_fraction)?;
        validate_non_negative("initial_direction_range", self.initial_direction_range)?;
        validate_positive("speed_min", self.speed_min)?;
        validate_range("speed_max", self.speed_min, self.speed_max)?;
        validate_non_negative("direction_jitter", self.direction_jitter)?;
        validate_non_negative("collision_nudge", self.collision_nudge)?;
        validate_positive("collision_grid_cell", self.collision_grid_cell)?;
        if let BoundaryPolicy::Tethered { radius } = self.boundary {
            validate_non_negative("boundary.radius", radius)?;
        }
        validate_range(
            "max_tokens",
            self.min_tokens as f32,
            self.max_tokens as f32,
        )?;
        Ok(())
    }
}

/// Startup system: attempt to load `assets/field.toml`, overwrite the
/// `FieldConfig` resource, and reconfigure the running field.
///
/// TOML parse or validation errors are logged but do not abort; a missing
/// file is silently ignored (defaults are already in place).
pub fn load_field_config(mut config: ResMut<FieldConfig>, mut field: ResMut<IconField>) {
    let path = "assets/field.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match FieldConfig::from_toml_str(&contents) {
            Ok(loaded) => {
                info!("Loaded field config from {path}");
                *config = loaded;
            }
            Err(e) => {
                warn!("{path}: {e}; using defaults");
            }
        },
        Err(_) => {
            info!("No {path} found; using compiled defaults");
        }
    }
    field.reconfigure(config.clone());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(FieldConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = FieldConfig::from_toml_str(
            r#"
            area_per_token = 12000.0
            resolver = "grid"
            hit_shape = "bounding_box"

            [boundary]
            kind = "tethered"
            radius = 10.0
            "#,
        )
        .expect("valid config");
        assert_eq!(config.area_per_token, 12_000.0);
        assert_eq!(config.resolver, ResolverKind::Grid);
        assert_eq!(config.hit_shape, HitShape::BoundingBox);
        assert_eq!(config.boundary, BoundaryPolicy::Tethered { radius: 10.0 });
        assert_eq!(config.token_size_min, TOKEN_SIZE_MIN);
        assert_eq!(config.min_frame_interval_ms, MIN_FRAME_INTERVAL_MS);
    }

    #[test]
    fn inverted_size_range_is_rejected() {
        let err = FieldConfig::from_toml_str("token_size_min = 60.0\ntoken_size_max = 45.0")
            .unwrap_err();
        assert!(matches!(
            err,
            FieldError::InvalidConfig { name: "token_size_max", .. }
        ));
    }

    #[test]
    fn zero_area_divisor_is_rejected() {
        let err = FieldConfig::from_toml_str("area_per_token = 0.0").unwrap_err();
        assert!(matches!(err, FieldError::InvalidConfig { name: "area_per_token", .. }));
    }

    #[test]
    fn unknown_boundary_kind_is_a_parse_error() {
        let err = FieldConfig::from_toml_str("[boundary]\nkind = \"orbit\"").unwrap_err();
        assert!(matches!(err, FieldError::ConfigParse(_)));
    }
}
