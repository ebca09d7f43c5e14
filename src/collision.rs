//! Pairwise circle collision detection and resolution.
//!
//! Two tokens overlap when their centre distance is below
//! `(size_a + size_b) / 2`.  Resolution is purely positional: each token is
//! pushed half the overlap along the centre-to-centre axis, so a single call
//! fully separates an isolated pair, and each direction vector receives a
//! small nudge away from the other token.
//!
//! Two interchangeable resolvers implement [`CollisionResolver`]:
//!
//! | Resolver            | Candidate pairs              | Use when                   |
//! |---------------------|------------------------------|----------------------------|
//! | [`PairwiseResolver`]| all `n·(n-1)/2` pairs        | default; n ≤ ~50           |
//! | [`GridResolver`]    | same/adjacent spatial cells  | larger fields              |

use crate::token::IconToken;
use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;

/// Centres closer than this are treated as coincident.
const COINCIDENT_EPSILON: f32 = 1e-4;

/// Resolves overlaps in place and reports which pairs touched.
pub trait CollisionResolver: Send + Sync {
    /// Returns the index pairs `(i, j)` with `i < j` that were separated.
    fn resolve(&mut self, tokens: &mut [IconToken], nudge: f32) -> Vec<(usize, usize)>;
}

/// Selects a resolver implementation from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    #[default]
    Pairwise,
    Grid,
}

impl ResolverKind {
    pub fn build(self, cell_size: f32) -> Box<dyn CollisionResolver> {
        match self {
            ResolverKind::Pairwise => Box::new(PairwiseResolver),
            ResolverKind::Grid => Box::new(GridResolver::new(cell_size)),
        }
    }
}

/// Separate tokens `i` and `j` if they overlap.  Returns `true` on contact.
///
/// Coincident centres have no defined axis; they are split along +x.
pub fn resolve_pair(tokens: &mut [IconToken], i: usize, j: usize, nudge: f32) -> bool {
    debug_assert!(i < j, "resolve_pair expects i < j");
    let (head, tail) = tokens.split_at_mut(j);
    let a = &mut head[i];
    let b = &mut tail[0];

    let delta = b.center() - a.center();
    let distance = delta.length();
    let min_distance = (a.size + b.size) * 0.5;
    if distance >= min_distance {
        return false;
    }

    let axis = if distance > COINCIDENT_EPSILON {
        delta / distance
    } else {
        Vec2::X
    };
    let half_overlap = (min_distance - distance) * 0.5;

    a.position -= axis * half_overlap;
    b.position += axis * half_overlap;
    a.direction -= axis * nudge;
    b.direction += axis * nudge;
    a.colliding = true;
    b.colliding = true;
    true
}

/// Brute-force O(n²) scan over every unordered pair.
#[derive(Debug, Default, Clone, Copy)]
pub struct PairwiseResolver;

impl CollisionResolver for PairwiseResolver {
    fn resolve(&mut self, tokens: &mut [IconToken], nudge: f32) -> Vec<(usize, usize)> {
        let mut contacts = Vec::new();
        for i in 0..tokens.len() {
            for j in (i + 1)..tokens.len() {
                if resolve_pair(tokens, i, j, nudge) {
                    contacts.push((i, j));
                }
            }
        }
        contacts
    }
}

/// Uniform-grid broad phase.
///
/// Tokens are bucketed by centre; only tokens in the same or neighbouring
/// cells are tested.  The neighbourhood radius is derived from the largest
/// diameter present, so a cell smaller than a token still finds every pair.
#[derive(Debug, Clone, Default)]
pub struct GridResolver {
    cell_size: f32,
    /// Map from cell coordinates to token indices
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl GridResolver {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(1.0),
            cells: HashMap::new(),
        }
    }

    fn world_to_cell(&self, pos: Vec2) -> (i32, i32) {
        let x = (pos.x / self.cell_size).floor() as i32;
        let y = (pos.y / self.cell_size).floor() as i32;
        (x, y)
    }

    fn radius_in_cells(&self, max_distance: f32) -> i32 {
        ((max_distance / self.cell_size).ceil() as i32).max(1)
    }

    fn rebuild(&mut self, tokens: &[IconToken]) {
        // Retain allocations but clear contents
        for v in self.cells.values_mut() {
            v.clear();
        }
        for (index, token) in tokens.iter().enumerate() {
            let cell = self.world_to_cell(token.center());
            self.cells.entry(cell).or_default().push(index);
        }
    }

    /// Indices `j > index` in cells around `index`'s cell, sorted.
    fn candidates(&self, tokens: &[IconToken], index: usize, reach: i32) -> Vec<usize> {
        let cell = self.world_to_cell(tokens[index].center());
        let mut out = Vec::new();
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                if let Some(bucket) = self.cells.get(&(cell.0 + dx, cell.1 + dy)) {
                    out.extend(bucket.iter().copied().filter(|&j| j > index));
                }
            }
        }
        out.sort_unstable();
        out
    }
}

impl CollisionResolver for GridResolver {
    fn resolve(&mut self, tokens: &mut [IconToken], nudge: f32) -> Vec<(usize, usize)> {
        let max_size = tokens.iter().map(|t| t.size).fold(0.0_f32, f32::max);
        self.rebuild(tokens);
        let reach = self.radius_in_cells(max_size);

        let mut contacts = Vec::new();
        for i in 0..tokens.len() {
            for j in self.candidates(tokens, i, reach) {
                if resolve_pair(tokens, i, j, nudge) {
                    contacts.push((i, j));
                }
            }
        }
        contacts
    }
}
