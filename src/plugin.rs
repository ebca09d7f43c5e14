//! Bevy host for [`IconField`]: viewport, frame loop, pointer and selection.
//!
//! ## Systems (registered by `ToolFieldPlugin`)
//!
//! | System                      | Schedule | Purpose                                    |
//! |-----------------------------|----------|--------------------------------------------|
//! | `load_field_config`         | Startup  | Apply `assets/field.toml` (optional)       |
//! | `load_catalog`              | Startup  | Apply `assets/catalog.toml` (optional)     |
//! | `start_field_system`        | Startup  | Arm the frame loop                         |
//! | `sync_viewport_system`      | Update   | Copy primary window size into `FieldViewport` |
//! | `apply_viewport_system`     | Update   | Forward size changes to the field          |
//! | `rebuild_field_system`      | Update   | Re-seed on catalog / search change         |
//! | `tick_field_system`         | Update   | Advance one (rate-capped) frame            |
//! | `pointer_press_system`      | Update   | Left click → `PointerPress`                |
//! | `hit_test_system`           | Update   | `PointerPress` → `ToggleTool`              |
//! | `toggle_selection_system`   | Update   | `ToggleTool` → `Selection`                 |
//! | `stop_field_on_exit_system` | Last     | Tear the loop down on `AppExit`            |
//!
//! Everything here works under `MinimalPlugins`: window and mouse input are
//! optional, and tests drive the field by writing `FieldViewport` and
//! `PointerPress` directly.

use crate::catalog::{load_catalog, Catalog};
use crate::config::{load_field_config, FieldConfig};
use crate::engine::IconField;
use bevy::app::AppExit;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use std::collections::BTreeSet;

// ── Resources ─────────────────────────────────────────────────────────────────

/// Container size in logical pixels, as last observed.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct FieldViewport {
    pub size: Vec2,
}

/// Identities the visitor has picked.  Never touched by the engine.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct Selection(pub BTreeSet<String>);

impl Selection {
    pub fn contains(&self, identity: &str) -> bool {
        self.0.contains(identity)
    }
}

/// Current search text narrowing the catalog.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct SearchQuery(pub String);

// ── Messages ──────────────────────────────────────────────────────────────────

/// A press at container-local coordinates (origin top-left, y down).
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct PointerPress {
    pub position: Vec2,
}

/// Toggle request for one tool, emitted when a press lands on its token.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct ToggleTool {
    pub identity: String,
}

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers the field resources, messages, and the simulation systems.
pub struct ToolFieldPlugin {
    /// Fixed random seed; `None` uses the thread-local generator.
    pub seed: Option<u64>,
    /// Read `assets/field.toml` and `assets/catalog.toml` at startup.
    pub load_assets: bool,
}

impl Default for ToolFieldPlugin {
    fn default() -> Self {
        Self {
            seed: None,
            load_assets: true,
        }
    }
}

impl Plugin for ToolFieldPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<FieldConfig>()
            .cloned()
            .unwrap_or_default();
        let field = match self.seed {
            Some(seed) => IconField::seeded(config.clone(), seed),
            None => IconField::new(config.clone()),
        };

        app.insert_resource(config)
            .insert_resource(field)
            .init_resource::<Catalog>()
            .init_resource::<FieldViewport>()
            .init_resource::<Selection>()
            .init_resource::<SearchQuery>()
            .add_message::<PointerPress>()
            .add_message::<ToggleTool>();

        if self.load_assets {
            app.add_systems(
                Startup,
                (load_field_config, load_catalog).before(start_field_system),
            );
        }

        app.add_systems(Startup, start_field_system)
            .add_systems(
                Update,
                (
                    sync_viewport_system,
                    apply_viewport_system,
                    rebuild_field_system,
                    tick_field_system,
                    pointer_press_system,
                    hit_test_system,
                    toggle_selection_system,
                )
                    .chain(),
            )
            .add_systems(Last, stop_field_on_exit_system);
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Arm the frame loop once configuration is in place.
pub fn start_field_system(mut field: ResMut<IconField>) {
    field.start();
    info!("Tool field started");
}

// ── Update ────────────────────────────────────────────────────────────────────

/// Copy the primary window's logical size into [`FieldViewport`].
///
/// Only writes on an actual change so `apply_viewport_system` sees a
/// change tick once per resize, not every frame.
pub fn sync_viewport_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<FieldViewport>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let size = Vec2::new(window.width(), window.height());
    if viewport.size != size {
        viewport.size = size;
    }
}

/// Forward viewport changes to the field.
pub fn apply_viewport_system(viewport: Res<FieldViewport>, mut field: ResMut<IconField>) {
    if viewport.is_changed() {
        field.resize(viewport.size.x, viewport.size.y);
    }
}

/// Re-seed the field whenever the catalog or the search text changes.
pub fn rebuild_field_system(
    catalog: Res<Catalog>,
    search: Res<SearchQuery>,
    mut field: ResMut<IconField>,
) {
    if !catalog.is_changed() && !search.is_changed() {
        return;
    }
    let candidates = catalog.filter(&search.0);
    field.rebuild(&candidates, &catalog.defaults());
    info!(
        "Tool field rebuilt: {} candidates for '{}', {} tokens",
        candidates.len(),
        search.0,
        field.tokens().len()
    );
}

/// Advance the simulation using the app clock.
pub fn tick_field_system(time: Res<Time>, mut field: ResMut<IconField>) {
    let now_ms = time.elapsed().as_millis() as u64;
    field.tick(now_ms);
}

/// Turn a left click on the primary window into a [`PointerPress`].
pub fn pointer_press_system(
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut presses: MessageWriter<PointerPress>,
) {
    let Some(buttons) = buttons else {
        return;
    };
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    if let Some(position) = window.cursor_position() {
        presses.write(PointerPress { position });
    }
}

/// Hit-test each press against the live tokens.
pub fn hit_test_system(
    mut presses: MessageReader<PointerPress>,
    field: Res<IconField>,
    mut toggles: MessageWriter<ToggleTool>,
) {
    for press in presses.read() {
        if let Some(identity) = field.hit_test(press.position) {
            toggles.write(ToggleTool {
                identity: identity.to_string(),
            });
        }
    }
}

/// Flip selection membership for each toggled tool.
pub fn toggle_selection_system(
    mut toggles: MessageReader<ToggleTool>,
    mut selection: ResMut<Selection>,
) {
    for toggle in toggles.read() {
        if !selection.0.remove(&toggle.identity) {
            selection.0.insert(toggle.identity.clone());
        }
        info!(
            "Toggled '{}' ({} selected)",
            toggle.identity,
            selection.0.len()
        );
    }
}

// ── Teardown ──────────────────────────────────────────────────────────────────

/// Stop the field when the app is about to exit.
pub fn stop_field_on_exit_system(mut exits: MessageReader<AppExit>, mut field: ResMut<IconField>) {
    if exits.read().next().is_some() {
        field.stop();
    }
}
