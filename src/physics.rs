//! Per-frame integration and boundary handling.
//!
//! A frame moves every token through four stages, in order:
//!
//! | Stage            | Function            | Effect                                      |
//! |------------------|---------------------|---------------------------------------------|
//! | Integrate        | [`advance`]         | `position += direction × speed`             |
//! | Boundary         | [`apply_boundary`]  | clamp + invert the offending axis           |
//! | Jitter           | [`perturb`]         | small random nudge to each direction axis   |
//! | Speed cap        | [`cap_direction`]   | `|direction| ≤ 1`                           |
//!
//! The collision pass (see [`crate::collision`]) runs after all tokens have
//! stepped, followed by [`clamp_to_bounds`] so that collision pushes never
//! leave a token outside its region.

use crate::constants::TETHER_RADIUS;
use crate::random::RandomSource;
use crate::token::IconToken;
use bevy::prelude::*;
use serde::Deserialize;

/// Where a token may travel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Bounce off the container walls.
    #[default]
    FreeRoam,
    /// Bounce off a square of half-width `radius` around the origin; the
    /// container walls remain a hard outer limit.
    Tethered { radius: f32 },
}

impl BoundaryPolicy {
    /// Tethered policy with the default radius.
    pub fn tethered() -> Self {
        BoundaryPolicy::Tethered {
            radius: TETHER_RADIUS,
        }
    }
}

/// Inclusive per-axis limits `[lo, hi]` for a token's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub lo: Vec2,
    pub hi: Vec2,
}

/// Container wall bounds for a token of the given size.
///
/// A container narrower than the token collapses the axis to `[0, 0]`.
pub fn wall_bounds(size: f32, container: Vec2) -> AxisBounds {
    AxisBounds {
        lo: Vec2::ZERO,
        hi: (container - Vec2::splat(size)).max(Vec2::ZERO),
    }
}

/// Tether bounds around `origin`, not yet intersected with the walls.
pub fn tether_bounds(origin: Vec2, radius: f32) -> AxisBounds {
    AxisBounds {
        lo: origin - Vec2::splat(radius),
        hi: origin + Vec2::splat(radius),
    }
}

/// Step 1: move along the direction vector.
#[inline]
pub fn advance(token: &mut IconToken) {
    token.position += token.direction * token.speed;
}

/// Clamp one axis into `[lo, hi]`, reflecting the direction away from the
/// wall that was crossed.  Returns `true` if the axis bounced.
fn bounce_axis(pos: &mut f32, dir: &mut f32, lo: f32, hi: f32) -> bool {
    if *pos < lo {
        *pos = lo;
        *dir = dir.abs();
        true
    } else if *pos > hi {
        *pos = hi;
        *dir = -dir.abs();
        true
    } else {
        false
    }
}

fn bounce_into(token: &mut IconToken, bounds: AxisBounds) -> bool {
    let bx = bounce_axis(
        &mut token.position.x,
        &mut token.direction.x,
        bounds.lo.x,
        bounds.hi.x,
    );
    let by = bounce_axis(
        &mut token.position.y,
        &mut token.direction.y,
        bounds.lo.y,
        bounds.hi.y,
    );
    bx || by
}

/// Step 2: enforce the boundary policy.  Returns `true` if any axis bounced.
pub fn apply_boundary(token: &mut IconToken, policy: BoundaryPolicy, container: Vec2) -> bool {
    let walls = wall_bounds(token.size, container);
    match policy {
        BoundaryPolicy::FreeRoam => bounce_into(token, walls),
        BoundaryPolicy::Tethered { radius } => {
            let tethered = bounce_into(token, tether_bounds(token.origin, radius));
            // Walls win when the tether square pokes outside the container.
            let walled = bounce_into(token, walls);
            tethered || walled
        }
    }
}

/// Step 3: independent uniform perturbation of each direction component.
pub fn perturb(token: &mut IconToken, amount: f32, rng: &mut dyn RandomSource) {
    if amount <= 0.0 {
        return;
    }
    token.direction.x += rng.symmetric(amount);
    token.direction.y += rng.symmetric(amount);
}

/// Step 4: rescale the direction so its magnitude does not exceed 1.
#[inline]
pub fn cap_direction(token: &mut IconToken) {
    let len = token.direction.length();
    if len > 1.0 {
        token.direction /= len;
    }
}

/// Run all four per-token stages.
pub fn step_token(
    token: &mut IconToken,
    policy: BoundaryPolicy,
    container: Vec2,
    jitter: f32,
    rng: &mut dyn RandomSource,
) {
    advance(token);
    apply_boundary(token, policy, container);
    perturb(token, jitter, rng);
    cap_direction(token);
}

/// Position-only clamp into the policy's region.  Used after the collision
/// pass; directions are left alone so the next frame's bounce still fires.
pub fn clamp_to_bounds(token: &mut IconToken, policy: BoundaryPolicy, container: Vec2) {
    let walls = wall_bounds(token.size, container);
    if let BoundaryPolicy::Tethered { radius } = policy {
        let t = tether_bounds(token.origin, radius);
        token.position = token.position.clamp(t.lo, t.hi.max(t.lo));
    }
    token.position = token.position.clamp(walls.lo, walls.hi);
}
