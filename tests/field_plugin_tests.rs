//! Headless tests for [`ToolFieldPlugin`].
//!
//! These tests use [`MinimalPlugins`] (no window, no rendering, no mouse)
//! so they run fast and deterministically in CI.  The viewport and pointer
//! presses are written directly, and time advances in fixed 20 ms steps.
//!
//! Covered scenarios:
//! 1. The first frame seeds the field from the built-in catalog, defaults first.
//! 2. Changing the search query re-seeds with the filtered candidates.
//! 3. A press on a token toggles its selection; a second press untoggles it.
//! 4. A press on empty space leaves the selection alone.
//! 5. Frames advance under the app clock and `AppExit` stops the loop.

use bevy::ecs::message::Messages;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;
use toolfield::engine::IconField;
use toolfield::plugin::{FieldViewport, PointerPress, SearchQuery, Selection, ToolFieldPlugin};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a headless app with an 800×350 viewport and a fixed seed.
fn headless_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(ToolFieldPlugin {
        seed: Some(17),
        load_assets: false,
    });
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(20)));
    app.world_mut().resource_mut::<FieldViewport>().size = Vec2::new(800.0, 350.0);
    app
}

fn press(app: &mut App, position: Vec2) {
    app.world_mut()
        .resource_mut::<Messages<PointerPress>>()
        .write(PointerPress { position });
}

fn field(app: &App) -> &IconField {
    app.world().resource::<IconField>()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// 25 built-in tools in 800×350 → min(25, max(20, 28)) = 25 tokens, with the
/// default-selected tools seeded first in catalog order.
#[test]
fn first_frame_seeds_builtin_catalog() {
    let mut app = headless_app();
    app.update();

    let field = field(&app);
    assert!(field.is_running());
    assert_eq!(field.container(), Vec2::new(800.0, 350.0));
    assert_eq!(field.tokens().len(), 25);

    let leading: Vec<_> = field.tokens()[..3]
        .iter()
        .map(|t| t.identity.as_str())
        .collect();
    assert_eq!(leading, vec!["Slack", "Zoom", "Google Workspace"]);
}

#[test]
fn search_query_reseeds_with_filtered_tools() {
    let mut app = headless_app();
    app.update();
    let generation = field(&app).generation();

    app.world_mut().resource_mut::<SearchQuery>().0 = "project".to_string();
    app.update();

    let field = field(&app);
    assert!(field.generation() > generation);
    let mut names: Vec<_> = field.tokens().iter().map(|t| t.identity.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["Asana", "Jira", "Monday", "Trello"]);
}

#[test]
fn press_on_token_toggles_selection() {
    let mut app = headless_app();
    // A single token drifts well under its radius per frame and never collides.
    app.world_mut().resource_mut::<SearchQuery>().0 = "github".to_string();
    app.update();

    let target = field(&app).tokens()[0].clone();
    press(&mut app, target.center());
    app.update();
    assert!(
        app.world().resource::<Selection>().contains(&target.identity),
        "'{}' should be selected",
        target.identity
    );

    let centre = field(&app)
        .token(&target.identity)
        .expect("token still live")
        .center();
    press(&mut app, centre);
    app.update();
    assert!(app.world().resource::<Selection>().0.is_empty());
}

#[test]
fn press_on_empty_space_selects_nothing() {
    let mut app = headless_app();
    app.world_mut().resource_mut::<SearchQuery>().0 = "github".to_string();
    app.update();
    assert_eq!(field(&app).tokens().len(), 1);

    let token = field(&app).tokens()[0].clone();
    // Opposite corner of the container from the lone token.
    let far = Vec2::new(
        if token.center().x < 400.0 { 790.0 } else { 10.0 },
        if token.center().y < 175.0 { 340.0 } else { 10.0 },
    );
    press(&mut app, far);
    app.update();
    assert!(app.world().resource::<Selection>().0.is_empty());
}

#[test]
fn frames_advance_and_exit_stops_the_loop() {
    let mut app = headless_app();
    for _ in 0..10 {
        app.update();
    }
    let frames = field(&app).frames();
    assert!(frames >= 5, "expected most 20 ms updates to simulate, got {frames}");

    app.world_mut()
        .resource_mut::<Messages<AppExit>>()
        .write(AppExit::Success);
    app.update();
    assert!(!field(&app).is_running());

    let frames = field(&app).frames();
    app.update();
    assert_eq!(field(&app).frames(), frames, "no frame may run after teardown");
}
