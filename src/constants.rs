//! Centralised tuning constants for the floating tool field.
//!
//! Every value here is the compiled default behind a field of
//! [`crate::config::FieldConfig`]; `assets/field.toml` can override any of
//! them at startup without recompiling.
//!
//! ## Tuning guidance
//!
//! Each constant notes the observable consequence of changing it.  After
//! editing, run the unit tests: several of them pin the documented scenarios
//! (e.g. the 800×350 container yielding 28 tokens).

// ── Token Count ───────────────────────────────────────────────────────────────

/// Container area (px²) budgeted per token when choosing how many to show.
///
/// Lower values → denser field.  Tested range: 10 000–12 000.
pub const AREA_PER_TOKEN: f32 = 10_000.0;

/// Minimum number of tokens shown whenever the catalog has that many entries.
///
/// Small containers would otherwise show only a handful of tools.
pub const MIN_TOKENS: usize = 20;

/// Hard upper bound on the token count.
///
/// The collision pass is O(n²); 50 keeps it well under a millisecond.
pub const MAX_TOKENS: usize = 50;

// ── Token Geometry ────────────────────────────────────────────────────────────

/// Smallest token diameter (px).
pub const TOKEN_SIZE_MIN: f32 = 45.0;

/// Largest token diameter (px).
pub const TOKEN_SIZE_MAX: f32 = 60.0;

/// Fraction of a grid cell a seeded origin may be jittered away from the
/// cell centre, per axis, in each direction.
pub const GRID_JITTER_FRACTION: f32 = 0.5;

// ── Motion ────────────────────────────────────────────────────────────────────

/// Initial direction components are drawn from `±INITIAL_DIRECTION_RANGE`.
pub const INITIAL_DIRECTION_RANGE: f32 = 0.6;

/// Slowest per-frame speed multiplier (px per frame at unit direction).
pub const SPEED_MIN: f32 = 0.3;

/// Fastest per-frame speed multiplier.
pub const SPEED_MAX: f32 = 0.6;

/// Per-frame random perturbation applied to each direction component.
///
/// Keeps motion from settling into a visibly periodic loop.  Values above
/// ~0.05 make the icons look jittery rather than drifting.
pub const DIRECTION_JITTER: f32 = 0.01;

/// Drift radius (px) around the origin for the tethered boundary policy.
pub const TETHER_RADIUS: f32 = 10.0;

// ── Collision ─────────────────────────────────────────────────────────────────

/// Fraction of the separation unit vector added to each colliding token's
/// direction (with opposite signs).
pub const COLLISION_NUDGE: f32 = 0.1;

/// How long the cosmetic collision flag stays raised (ms).
pub const COLLISION_FLAG_MS: u64 = 300;

/// Cell size (px) for the bucketed collision resolver.
///
/// Must be at least the largest token diameter so every overlapping pair
/// lands in the same or an adjacent cell.
pub const COLLISION_GRID_CELL: f32 = 64.0;

// ── Frame Pacing ──────────────────────────────────────────────────────────────

/// Frames arriving sooner than this after the last processed frame are
/// ignored, capping the simulation at ~60 Hz regardless of refresh rate.
pub const MIN_FRAME_INTERVAL_MS: u64 = 16;

// ── Host Window ───────────────────────────────────────────────────────────────

/// Initial window width (logical px).
pub const WINDOW_WIDTH: u32 = 800;

/// Initial window height (logical px).
pub const WINDOW_HEIGHT: u32 = 350;

/// Font size of the fallback two-letter glyph.
pub const GLYPH_FONT_SIZE: f32 = 18.0;

/// Amplitude (px) of the horizontal shake drawn while a token is flagged.
pub const SHAKE_AMPLITUDE: f32 = 2.0;

/// Seats used for the savings line until the user changes it.
pub const DEFAULT_HEADCOUNT: u32 = 10;
