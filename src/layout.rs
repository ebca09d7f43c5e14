//! Token selection and initial grid placement.
//!
//! Seeding happens in three steps:
//!
//! 1. [`target_count`] decides how many tokens the container can hold.
//! 2. [`select_candidates`] picks that many catalog entries, priority
//!    identities first.
//! 3. [`seed_tokens`] lays them out on a near-square grid with per-cell
//!    jitter and draws each token's size, direction and speed.
//!
//! Seeded tokens may overlap; the first few collision passes push them apart.

use crate::catalog::CatalogEntry;
use crate::config::FieldConfig;
use crate::random::RandomSource;
use crate::token::IconToken;
use bevy::prelude::*;
use std::collections::HashSet;

/// Number of tokens to show for `candidates` entries in a `container`.
///
/// `min(candidates, max(min_tokens, floor(area / area_per_token)), max_tokens)`.
/// A container without area holds nothing.
pub fn target_count(candidates: usize, container: Vec2, config: &FieldConfig) -> usize {
    if !has_area(container) {
        return 0;
    }
    let by_area = (container.x * container.y / config.area_per_token).floor() as usize;
    candidates
        .min(config.min_tokens.max(by_area))
        .min(config.max_tokens)
}

/// Whether both dimensions are positive and finite.
pub fn has_area(container: Vec2) -> bool {
    container.x.is_finite() && container.y.is_finite() && container.x > 0.0 && container.y > 0.0
}

/// Up to `count` entries: those named in `priority` (in catalog order), then
/// the rest (in catalog order).  Repeated identities are taken once.
pub fn select_candidates<'a>(
    catalog: &'a [CatalogEntry],
    priority: &[String],
    count: usize,
) -> Vec<&'a CatalogEntry> {
    let wanted: HashSet<&str> = priority.iter().map(String::as_str).collect();
    let mut taken: HashSet<&str> = HashSet::new();

    let preferred = catalog.iter().filter(|e| wanted.contains(e.identity.as_str()));
    let rest = catalog.iter().filter(|e| !wanted.contains(e.identity.as_str()));

    preferred
        .chain(rest)
        .filter(|e| taken.insert(e.identity.as_str()))
        .take(count)
        .collect()
}

/// Grid shape for `n` tokens: `(columns, rows)`.
pub fn grid_shape(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let columns = (n as f32).sqrt().ceil() as usize;
    let rows = n.div_ceil(columns);
    (columns, rows)
}

/// Place `entries` on a jittered grid and draw their motion parameters.
///
/// Each token's centre starts at its cell centre, offset by up to
/// `grid_jitter_fraction` of the cell size per axis; the top-left corner is
/// then clamped into `[0, container - size]`.
pub fn seed_tokens(
    entries: &[&CatalogEntry],
    container: Vec2,
    config: &FieldConfig,
    rng: &mut dyn RandomSource,
) -> Vec<IconToken> {
    let n = entries.len();
    if n == 0 || !has_area(container) {
        return Vec::new();
    }

    let (columns, rows) = grid_shape(n);
    let cell = Vec2::new(container.x / columns as f32, container.y / rows as f32);

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let col = (i % columns) as f32;
            let row = (i / columns) as f32;
            let size = rng.range(config.token_size_min, config.token_size_max);

            let jitter = Vec2::new(
                rng.symmetric(config.grid_jitter_fraction) * cell.x,
                rng.symmetric(config.grid_jitter_fraction) * cell.y,
            );
            let centre = Vec2::new((col + 0.5) * cell.x, (row + 0.5) * cell.y) + jitter;
            let max_corner = (container - Vec2::splat(size)).max(Vec2::ZERO);
            let origin = (centre - Vec2::splat(size * 0.5)).clamp(Vec2::ZERO, max_corner);

            let mut token = IconToken::new(entry.identity.clone(), origin, size);
            token.image_ref = entry.image_ref.clone();
            token.price = entry.price;
            token.direction = Vec2::new(
                rng.symmetric(config.initial_direction_range),
                rng.symmetric(config.initial_direction_range),
            );
            token.speed = rng.range(config.speed_min, config.speed_max);
            token
        })
        .collect()
}
