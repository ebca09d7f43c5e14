//! The floating icon token: one animated instance of a catalog entry.

use bevy::prelude::*;
use serde::Deserialize;

/// Region of a token that counts as a pointer hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitShape {
    /// The circular collision region (diameter = `size`).
    #[default]
    Circle,
    /// The axis-aligned `size × size` square around the circle.
    BoundingBox,
}

/// One visual unit in the field.
///
/// `position` is the top-left corner in container-local pixels (y grows
/// downward, as in the window's cursor space).  The circular region is
/// `size` wide and centred at `position + size / 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct IconToken {
    /// Unique within one token set; used as the lookup key.
    pub identity: String,
    /// Asset path of the icon image; `None` renders the two-letter glyph.
    pub image_ref: Option<String>,
    /// Display-only monthly price.
    pub price: Option<f32>,
    pub position: Vec2,
    /// Seeded position; fixed for the token's life.
    pub origin: Vec2,
    /// Direction of travel; magnitude capped at 1 each frame.
    pub direction: Vec2,
    /// Per-frame displacement at unit direction (px).
    pub speed: f32,
    /// Diameter (px).
    pub size: f32,
    /// Cosmetic shake cue; raised on contact, cleared after a delay.
    pub colliding: bool,
}

impl IconToken {
    /// Build a token at rest on its origin.
    pub fn new(identity: impl Into<String>, origin: Vec2, size: f32) -> Self {
        Self {
            identity: identity.into(),
            image_ref: None,
            price: None,
            position: origin,
            origin,
            direction: Vec2::ZERO,
            speed: 0.0,
            size,
            colliding: false,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.size * 0.5
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.position + Vec2::splat(self.radius())
    }

    /// Whether `point` (container-local) falls inside the hit region.
    pub fn contains(&self, point: Vec2, shape: HitShape) -> bool {
        match shape {
            HitShape::Circle => point.distance_squared(self.center()) <= self.radius().powi(2),
            HitShape::BoundingBox => {
                let max = self.position + Vec2::splat(self.size);
                point.x >= self.position.x
                    && point.y >= self.position.y
                    && point.x <= max.x
                    && point.y <= max.y
            }
        }
    }

    /// Two-letter fallback glyph shown when no icon image is available.
    pub fn glyph(&self) -> String {
        let glyph: String = self
            .identity
            .chars()
            .filter(|c| c.is_alphanumeric())
            .take(2)
            .collect::<String>()
            .to_uppercase();
        if glyph.is_empty() {
            "?".to_string()
        } else {
            glyph
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_is_offset_by_radius() {
        let t = IconToken::new("Slack", Vec2::new(10.0, 20.0), 50.0);
        assert_eq!(t.center(), Vec2::new(35.0, 45.0));
    }

    #[test]
    fn circle_hit_excludes_bounding_box_corner() {
        let t = IconToken::new("Slack", Vec2::ZERO, 50.0);
        let corner = Vec2::new(2.0, 2.0);
        assert!(!t.contains(corner, HitShape::Circle));
        assert!(t.contains(corner, HitShape::BoundingBox));
        assert!(t.contains(Vec2::new(25.0, 25.0), HitShape::Circle));
    }

    #[test]
    fn glyph_uses_first_two_alphanumerics() {
        let t = IconToken::new("g suite", Vec2::ZERO, 50.0);
        assert_eq!(t.glyph(), "GS");
        let t = IconToken::new("--", Vec2::ZERO, 50.0);
        assert_eq!(t.glyph(), "?");
    }
}
