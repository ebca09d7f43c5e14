//! The floating-icon field: lifecycle, frame pacing and deferred flag clears.
//!
//! [`IconField`] owns the token set exclusively; renderers read it through
//! [`IconField::tokens`].  The host drives it with:
//!
//! | Call                | When                                    |
//! |---------------------|-----------------------------------------|
//! | [`IconField::rebuild`] | catalog or search filter changed     |
//! | [`IconField::resize`]  | container size observed              |
//! | [`IconField::start`] / [`IconField::stop`] | mount / teardown |
//! | [`IconField::tick`]    | every display frame                  |
//! | [`IconField::hit_test`]| pointer press                        |
//!
//! ## Generations
//!
//! Every re-seed bumps [`IconField::generation`].  Collision-flag clears are
//! queued as `(generation, identity, due)`; a clear whose generation is no
//! longer live, or whose identity vanished, is dropped on delivery.

use crate::catalog::CatalogEntry;
use crate::collision::CollisionResolver;
use crate::config::FieldConfig;
use crate::layout::{has_area, seed_tokens, select_candidates, target_count};
use crate::physics::{clamp_to_bounds, step_token};
use crate::random::{RandomSource, SeededRandom, ThreadRandom};
use crate::token::IconToken;
use bevy::prelude::*;

/// A queued collision-flag clear.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FlagClear {
    generation: u64,
    identity: String,
    due_ms: u64,
}

/// Layout engine for one mounted tool field.
#[derive(Resource)]
pub struct IconField {
    config: FieldConfig,
    tokens: Vec<IconToken>,
    container: Vec2,
    generation: u64,
    running: bool,
    last_frame_ms: Option<u64>,
    frames: u64,
    pending_clears: Vec<FlagClear>,
    /// Last candidate list and priority subset, kept for re-seeding.
    source: Vec<CatalogEntry>,
    priority: Vec<String>,
    /// Set when a rebuild arrived before the container had any area.
    awaiting_area: bool,
    rng: Box<dyn RandomSource>,
    resolver: Box<dyn CollisionResolver>,
}

impl IconField {
    /// A stopped, empty field using the thread-local random source.
    pub fn new(config: FieldConfig) -> Self {
        Self::with_random(config, Box::new(ThreadRandom))
    }

    /// A stopped, empty field with a fixed seed.
    pub fn seeded(config: FieldConfig, seed: u64) -> Self {
        Self::with_random(config, Box::new(SeededRandom::new(seed)))
    }

    pub fn with_random(config: FieldConfig, rng: Box<dyn RandomSource>) -> Self {
        let resolver = config.resolver.build(config.collision_grid_cell);
        Self {
            config,
            tokens: Vec::new(),
            container: Vec2::ZERO,
            generation: 0,
            running: false,
            last_frame_ms: None,
            frames: 0,
            pending_clears: Vec::new(),
            source: Vec::new(),
            priority: Vec::new(),
            awaiting_area: false,
            rng,
            resolver,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    /// Read-only snapshot of the live tokens, in draw order.
    pub fn tokens(&self) -> &[IconToken] {
        &self.tokens
    }

    pub fn token(&self, identity: &str) -> Option<&IconToken> {
        self.tokens.iter().find(|t| t.identity == identity)
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn container(&self) -> Vec2 {
        self.container
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames actually simulated (gated frames excluded).
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn pending_clears(&self) -> usize {
        self.pending_clears.len()
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Arm the frame loop.  The next `tick` is processed unconditionally.
    pub fn start(&mut self) {
        self.running = true;
        self.last_frame_ms = None;
    }

    /// Cancel the frame loop, drop every pending flag clear and lower the
    /// flags those clears would have lowered.
    ///
    /// Idempotent; safe before the first frame.
    pub fn stop(&mut self) {
        if self.running {
            debug!("Tool field stopped after {} frames", self.frames);
        }
        self.running = false;
        self.last_frame_ms = None;
        self.pending_clears.clear();
        for token in self.tokens.iter_mut() {
            token.colliding = false;
        }
    }

    /// Replace the candidate list and re-seed the whole token set.
    ///
    /// If the container has no area yet the set stays empty and seeding is
    /// deferred to the first [`resize`](Self::resize) with a usable size.
    pub fn rebuild(&mut self, candidates: &[CatalogEntry], priority: &[String]) {
        self.source = candidates.to_vec();
        self.priority = priority.to_vec();
        self.reseed();
    }

    /// Swap in a new configuration and re-seed from the current candidates.
    pub fn reconfigure(&mut self, config: FieldConfig) {
        self.resolver = config.resolver.build(config.collision_grid_cell);
        self.config = config;
        self.reseed();
    }

    /// Record new container dimensions.
    ///
    /// Tokens are not moved here; the next frame's boundary step re-clamps
    /// them.  A pending deferred seed runs as soon as the area is non-zero.
    pub fn resize(&mut self, width: f32, height: f32) {
        let size = Vec2::new(width, height);
        self.container = if has_area(size) { size } else { Vec2::ZERO };
        if self.awaiting_area && has_area(self.container) {
            self.reseed();
        }
    }

    fn reseed(&mut self) {
        self.generation += 1;
        self.pending_clears.clear();

        if !has_area(self.container) {
            self.tokens.clear();
            self.awaiting_area = !self.source.is_empty();
            return;
        }
        self.awaiting_area = false;

        let count = target_count(self.source.len(), self.container, &self.config);
        let selected = select_candidates(&self.source, &self.priority, count);
        self.tokens = seed_tokens(&selected, self.container, &self.config, self.rng.as_mut());
        debug!(
            "Seeded {} of {} tools in {}x{} (generation {})",
            self.tokens.len(),
            self.source.len(),
            self.container.x,
            self.container.y,
            self.generation
        );
    }

    // ── Frame loop ───────────────────────────────────────────────────────────

    /// Advance one frame at wall-clock time `now_ms`.
    ///
    /// Returns `false` without touching state when the field is stopped or
    /// when less than `min_frame_interval_ms` has passed since the last
    /// processed frame.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if !self.running {
            return false;
        }
        if let Some(last) = self.last_frame_ms {
            if now_ms.saturating_sub(last) < self.config.min_frame_interval_ms {
                return false;
            }
        }
        self.last_frame_ms = Some(now_ms);
        self.flush_expired(now_ms);

        if self.tokens.is_empty() || !has_area(self.container) {
            return true;
        }

        let policy = self.config.boundary;
        for token in self.tokens.iter_mut() {
            step_token(
                token,
                policy,
                self.container,
                self.config.direction_jitter,
                self.rng.as_mut(),
            );
        }

        let contacts = self
            .resolver
            .resolve(&mut self.tokens, self.config.collision_nudge);
        for token in self.tokens.iter_mut() {
            clamp_to_bounds(token, policy, self.container);
        }

        let due_ms = now_ms + self.config.collision_flag_ms;
        for (i, j) in contacts {
            self.schedule_clear(i, due_ms);
            self.schedule_clear(j, due_ms);
        }

        self.frames += 1;
        true
    }

    /// Queue a flag clear for token `index`, replacing any earlier clear for
    /// the same identity so the flag stays up until the last contact expires.
    fn schedule_clear(&mut self, index: usize, due_ms: u64) {
        let identity = &self.tokens[index].identity;
        let generation = self.generation;
        match self
            .pending_clears
            .iter_mut()
            .find(|c| c.generation == generation && &c.identity == identity)
        {
            Some(existing) => existing.due_ms = due_ms,
            None => self.pending_clears.push(FlagClear {
                generation,
                identity: identity.clone(),
                due_ms,
            }),
        }
    }

    /// Deliver every flag clear due at `now_ms`.
    ///
    /// Stale clears (older generation, vanished identity) are dropped.
    pub fn flush_expired(&mut self, now_ms: u64) {
        if self.pending_clears.is_empty() {
            return;
        }
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending_clears)
            .into_iter()
            .partition(|c| c.due_ms <= now_ms);
        self.pending_clears = waiting;

        for clear in due {
            if clear.generation != self.generation {
                continue;
            }
            if let Some(token) = self.tokens.iter_mut().find(|t| t.identity == clear.identity) {
                token.colliding = false;
            }
        }
    }

    // ── Interaction ──────────────────────────────────────────────────────────

    /// Identity of the topmost token under `point` (container-local px).
    ///
    /// Later tokens draw over earlier ones, so the search runs back to front.
    pub fn hit_test(&self, point: Vec2) -> Option<&str> {
        self.tokens
            .iter()
            .rev()
            .find(|t| t.contains(point, self.config.hit_shape))
            .map(|t| t.identity.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BoundaryPolicy;
    use crate::token::HitShape;

    fn catalog(n: usize) -> Vec<CatalogEntry> {
        (0..n)
            .map(|i| CatalogEntry::new(format!("tool-{i}"), "misc", 5.0))
            .collect()
    }

    fn running_field(config: FieldConfig, size: Vec2, tools: usize) -> IconField {
        let mut field = IconField::seeded(config, 1234);
        field.resize(size.x, size.y);
        field.rebuild(&catalog(tools), &[]);
        field.start();
        field
    }

    /// Tick `frames` times at 16 ms spacing starting from `start_ms`.
    fn run(field: &mut IconField, start_ms: u64, frames: u64) -> u64 {
        let mut now = start_ms;
        for _ in 0..frames {
            field.tick(now);
            now += 16;
        }
        now
    }

    fn pair_at(field: &mut IconField, a: Vec2, b: Vec2) {
        let mut ta = IconToken::new("a", a, 50.0);
        let mut tb = IconToken::new("b", b, 50.0);
        ta.speed = 0.0;
        tb.speed = 0.0;
        field.tokens = vec![ta, tb];
        field.generation += 1;
    }

    // ── Seeding ───────────────────────────────────────────────────────────────

    #[test]
    fn token_count_is_deterministic_across_reseeds() {
        let mut field = running_field(FieldConfig::default(), Vec2::new(800.0, 350.0), 40);
        assert_eq!(field.tokens().len(), 28);
        let first: Vec<_> = field.tokens().iter().map(|t| t.position).collect();

        field.rebuild(&catalog(40), &[]);
        assert_eq!(field.tokens().len(), 28);
        let second: Vec<_> = field.tokens().iter().map(|t| t.position).collect();
        assert_ne!(first, second, "layout is re-randomised on rebuild");
    }

    #[test]
    fn identities_are_unique() {
        let field = running_field(FieldConfig::default(), Vec2::new(800.0, 350.0), 40);
        let mut names: Vec<_> = field.tokens().iter().map(|t| t.identity.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), field.tokens().len());
    }

    #[test]
    fn rebuild_bumps_generation() {
        let mut field = running_field(FieldConfig::default(), Vec2::new(800.0, 350.0), 10);
        let g = field.generation();
        field.rebuild(&catalog(5), &[]);
        assert_eq!(field.generation(), g + 1);
        assert_eq!(field.tokens().len(), 5);
    }

    #[test]
    fn zero_area_defers_seeding_until_resize() {
        let mut field = IconField::seeded(FieldConfig::default(), 1);
        field.rebuild(&catalog(30), &[]);
        field.start();
        assert!(field.tokens().is_empty());
        assert!(field.tick(0), "an empty field still accepts frames");

        field.resize(800.0, 350.0);
        assert_eq!(field.tokens().len(), 28);
    }

    #[test]
    fn empty_catalog_idles() {
        let mut field = running_field(FieldConfig::default(), Vec2::new(800.0, 350.0), 0);
        assert!(field.tokens().is_empty());
        run(&mut field, 0, 10);
        assert_eq!(field.frames(), 0);
    }

    // ── Frame loop ────────────────────────────────────────────────────────────

    #[test]
    fn frames_faster_than_interval_are_ignored() {
        let mut field = running_field(FieldConfig::default(), Vec2::new(800.0, 350.0), 5);
        assert!(field.tick(1_000));
        assert!(!field.tick(1_008));
        assert!(!field.tick(1_015));
        assert!(field.tick(1_016));
        assert_eq!(field.frames(), 2);
    }

    #[test]
    fn free_roam_positions_stay_inside_container() {
        let container = Vec2::new(800.0, 350.0);
        let mut field = running_field(FieldConfig::default(), container, 40);
        let mut now = 0;
        for _ in 0..600 {
            field.tick(now);
            now += 16;
            for t in field.tokens() {
                assert!(t.position.x >= 0.0 && t.position.x <= container.x - t.size);
                assert!(t.position.y >= 0.0 && t.position.y <= container.y - t.size);
            }
        }
    }

    #[test]
    fn tethered_positions_stay_near_origin() {
        let config = FieldConfig {
            boundary: BoundaryPolicy::tethered(),
            ..FieldConfig::default()
        };
        let mut field = running_field(config, Vec2::new(800.0, 350.0), 28);
        let mut now = 0;
        for _ in 0..400 {
            field.tick(now);
            now += 16;
            for t in field.tokens() {
                let d = (t.position - t.origin).abs();
                assert!(d.x <= 10.0 + 1e-3 && d.y <= 10.0 + 1e-3, "{} drifted {d:?}", t.identity);
            }
        }
    }

    #[test]
    fn sparse_field_converges_to_non_overlap() {
        let mut field = running_field(FieldConfig::default(), Vec2::new(800.0, 600.0), 8);
        run(&mut field, 0, 300);
        let tokens = field.tokens();
        for i in 0..tokens.len() {
            for j in (i + 1)..tokens.len() {
                let d = tokens[i].center().distance(tokens[j].center());
                let min = (tokens[i].size + tokens[j].size) * 0.5;
                assert!(d >= min - 2.0, "{i} and {j} overlap: {d} < {min}");
            }
        }
    }

    #[test]
    fn dense_field_converges_to_non_overlap() {
        let mut field = running_field(FieldConfig::default(), Vec2::new(800.0, 350.0), 40);
        assert_eq!(field.tokens().len(), 28);
        run(&mut field, 0, 600);
        let tokens = field.tokens();
        let mut worst = 0.0_f32;
        for i in 0..tokens.len() {
            for j in (i + 1)..tokens.len() {
                let d = tokens[i].center().distance(tokens[j].center());
                let min = (tokens[i].size + tokens[j].size) * 0.5;
                worst = worst.max(min - d);
            }
        }
        assert!(worst <= 0.5, "worst overlap {worst} px");
    }

    #[test]
    fn wall_scenario_flips_direction() {
        let mut field = IconField::seeded(FieldConfig::default(), 2);
        field.resize(800.0, 350.0);
        let mut t = IconToken::new("edge", Vec2::new(750.0, 100.0), 50.0);
        t.direction = Vec2::new(0.5, 0.0);
        t.speed = 0.5;
        field.tokens = vec![t];
        field.start();

        assert!(field.tick(0));
        let t = &field.tokens()[0];
        assert_eq!(t.position.x, 750.0);
        assert!(t.direction.x < 0.0);
    }

    // ── Collision flags ───────────────────────────────────────────────────────

    #[test]
    fn collision_flags_clear_after_delay() {
        let mut field = IconField::seeded(FieldConfig::default(), 3);
        field.resize(800.0, 350.0);
        pair_at(&mut field, Vec2::new(100.0, 100.0), Vec2::new(110.0, 100.0));
        field.start();

        field.tick(1_000);
        assert!(field.tokens().iter().all(|t| t.colliding));
        assert_eq!(field.pending_clears(), 2);

        field.flush_expired(1_299);
        assert!(field.tokens().iter().all(|t| t.colliding));
        field.flush_expired(1_300);
        assert!(field.tokens().iter().all(|t| !t.colliding));
        assert_eq!(field.pending_clears(), 0);
    }

    #[test]
    fn stale_clear_after_rebuild_is_dropped() {
        let mut field = IconField::seeded(FieldConfig::default(), 4);
        field.resize(800.0, 350.0);
        pair_at(&mut field, Vec2::new(100.0, 100.0), Vec2::new(110.0, 100.0));
        field.start();
        field.tick(0);

        // Simulate a clear queued under a superseded generation.
        let stale = FlagClear {
            generation: field.generation() - 1,
            identity: "a".to_string(),
            due_ms: 10,
        };
        field.pending_clears.push(stale);
        field.flush_expired(50);
        assert!(field.token("a").is_some_and(|t| t.colliding));

        field.rebuild(&catalog(3), &[]);
        assert_eq!(field.pending_clears(), 0, "rebuild drops queued clears");
    }

    #[test]
    fn clear_for_vanished_identity_is_a_no_op() {
        let mut field = IconField::seeded(FieldConfig::default(), 5);
        field.resize(800.0, 350.0);
        pair_at(&mut field, Vec2::new(100.0, 100.0), Vec2::new(110.0, 100.0));
        field.start();
        field.tick(0);
        field.tokens.retain(|t| t.identity != "a");
        field.flush_expired(10_000);
        assert_eq!(field.pending_clears(), 0);
    }

    // ── Teardown ──────────────────────────────────────────────────────────────

    #[test]
    fn stop_is_idempotent_and_halts_frames() {
        let mut field = IconField::seeded(FieldConfig::default(), 6);
        field.stop();
        field.stop();

        field.resize(800.0, 350.0);
        pair_at(&mut field, Vec2::new(100.0, 100.0), Vec2::new(110.0, 100.0));
        field.start();
        field.tick(0);
        assert!(field.pending_clears() > 0);

        field.stop();
        field.stop();
        assert_eq!(field.pending_clears(), 0);
        let snapshot = field.tokens().to_vec();
        assert!(!field.tick(1_000));
        assert_eq!(field.tokens(), snapshot.as_slice());
    }

    #[test]
    fn restart_after_stop_leaves_no_flag_raised() {
        let mut field = IconField::seeded(FieldConfig::default(), 9);
        field.resize(800.0, 350.0);
        pair_at(&mut field, Vec2::new(100.0, 100.0), Vec2::new(110.0, 100.0));
        field.start();
        field.tick(0);
        assert!(field.tokens().iter().all(|t| t.colliding));

        field.stop();
        field.start();
        run(&mut field, 16, 200);
        assert!(
            field.tokens().iter().all(|t| !t.colliding),
            "flags must not outlive a stop/start cycle"
        );
        assert_eq!(field.pending_clears(), 0);
    }

    // ── Configuration ─────────────────────────────────────────────────────────

    #[test]
    fn reconfigure_swaps_config_and_reseeds() {
        let mut field = running_field(FieldConfig::default(), Vec2::new(800.0, 350.0), 40);
        let generation = field.generation();
        let config = FieldConfig {
            area_per_token: 5_000.0,
            hit_shape: HitShape::BoundingBox,
            ..FieldConfig::default()
        };
        field.reconfigure(config.clone());

        assert_eq!(field.config(), &config);
        assert_eq!(field.generation(), generation + 1);
        assert_eq!(field.tokens().len(), 40, "800×350 / 5000 = 56, capped by 40 candidates");
    }

    // ── Resize ────────────────────────────────────────────────────────────────

    #[test]
    fn resize_reclamps_on_next_frame_only() {
        let mut field = running_field(FieldConfig::default(), Vec2::new(800.0, 350.0), 20);
        let generation = field.generation();
        field.resize(300.0, 200.0);
        assert_eq!(field.generation(), generation, "resize never re-seeds a live set");

        field.tick(0);
        for t in field.tokens() {
            assert!(t.position.x <= 300.0 - t.size && t.position.y <= 200.0 - t.size);
        }
    }

    // ── Hit testing ───────────────────────────────────────────────────────────

    #[test]
    fn hit_test_reports_topmost_identity() {
        let mut field = IconField::seeded(FieldConfig::default(), 7);
        field.resize(800.0, 350.0);
        pair_at(&mut field, Vec2::new(100.0, 100.0), Vec2::new(120.0, 100.0));

        assert_eq!(field.hit_test(Vec2::new(150.0, 125.0)), Some("b"));
        assert_eq!(field.hit_test(Vec2::new(105.0, 125.0)), Some("a"));
        assert_eq!(field.hit_test(Vec2::new(500.0, 300.0)), None);
    }

    #[test]
    fn bounding_box_hit_shape_accepts_corners() {
        let config = FieldConfig {
            hit_shape: HitShape::BoundingBox,
            ..FieldConfig::default()
        };
        let mut field = IconField::seeded(config, 8);
        field.tokens = vec![IconToken::new("a", Vec2::new(100.0, 100.0), 50.0)];
        assert_eq!(field.hit_test(Vec2::new(101.0, 101.0)), Some("a"));
    }
}
