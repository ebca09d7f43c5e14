use bevy::prelude::*;
use bevy::window::WindowResolution;
use std::env;

use toolfield::constants::{WINDOW_HEIGHT, WINDOW_WIDTH};
use toolfield::plugin::{rebuild_field_system, SearchQuery, ToolFieldPlugin};
use toolfield::rendering::{Headcount, ToolFieldRenderPlugin};

const MAX_QUERY_LEN: usize = 24;

/// Letter and digit keys accepted by the search line.
const SEARCH_KEYS: &[(KeyCode, char)] = &[
    (KeyCode::Space, ' '),
    (KeyCode::Minus, '-'),
    (KeyCode::Digit0, '0'),
    (KeyCode::Digit1, '1'),
    (KeyCode::Digit2, '2'),
    (KeyCode::Digit3, '3'),
    (KeyCode::Digit4, '4'),
    (KeyCode::Digit5, '5'),
    (KeyCode::Digit6, '6'),
    (KeyCode::Digit7, '7'),
    (KeyCode::Digit8, '8'),
    (KeyCode::Digit9, '9'),
    (KeyCode::KeyA, 'a'),
    (KeyCode::KeyB, 'b'),
    (KeyCode::KeyC, 'c'),
    (KeyCode::KeyD, 'd'),
    (KeyCode::KeyE, 'e'),
    (KeyCode::KeyF, 'f'),
    (KeyCode::KeyG, 'g'),
    (KeyCode::KeyH, 'h'),
    (KeyCode::KeyI, 'i'),
    (KeyCode::KeyJ, 'j'),
    (KeyCode::KeyK, 'k'),
    (KeyCode::KeyL, 'l'),
    (KeyCode::KeyM, 'm'),
    (KeyCode::KeyN, 'n'),
    (KeyCode::KeyO, 'o'),
    (KeyCode::KeyP, 'p'),
    (KeyCode::KeyQ, 'q'),
    (KeyCode::KeyR, 'r'),
    (KeyCode::KeyS, 's'),
    (KeyCode::KeyT, 't'),
    (KeyCode::KeyU, 'u'),
    (KeyCode::KeyV, 'v'),
    (KeyCode::KeyW, 'w'),
    (KeyCode::KeyX, 'x'),
    (KeyCode::KeyY, 'y'),
    (KeyCode::KeyZ, 'z'),
];

/// Edit the search query from the keyboard.  Escape clears it.
///
/// Only writes through `ResMut` on an actual edit so the field re-seeds once
/// per keystroke, not every frame.
fn search_input_system(keys: Res<ButtonInput<KeyCode>>, mut search: ResMut<SearchQuery>) {
    let mut query = search.0.clone();
    if keys.just_pressed(KeyCode::Escape) {
        query.clear();
    }
    if keys.just_pressed(KeyCode::Backspace) {
        query.pop();
    }
    for (key, ch) in SEARCH_KEYS {
        if keys.just_pressed(*key) && query.len() < MAX_QUERY_LEN {
            query.push(*ch);
        }
    }
    if query != search.0 {
        search.0 = query;
    }
}

/// Arrow keys adjust the seat count used for the savings line.
fn headcount_input_system(keys: Res<ButtonInput<KeyCode>>, mut headcount: ResMut<Headcount>) {
    if keys.just_pressed(KeyCode::ArrowUp) {
        headcount.0 = headcount.0.saturating_add(1);
    }
    if keys.just_pressed(KeyCode::ArrowDown) && headcount.0 > 1 {
        headcount.0 -= 1;
    }
}

fn main() {
    // A fixed seed makes the opening layout reproducible (handy for screenshots).
    let seed = env::var("TOOLFIELD_SEED")
        .ok()
        .and_then(|s| s.parse::<u64>().ok());

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Toolfield".into(),
                resolution: WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.06, 0.07, 0.10)))
        .add_plugins(ToolFieldPlugin {
            seed,
            load_assets: true,
        })
        .add_plugins(ToolFieldRenderPlugin)
        .add_systems(
            Update,
            (search_input_system, headcount_input_system).before(rebuild_field_system),
        )
        .run();
}
