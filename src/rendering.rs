//! Token visuals and the savings overlay.
//!
//! ## Layer Model
//!
//! | Layer          | Technology | Notes                                       |
//! |----------------|------------|---------------------------------------------|
//! | Token disc     | `Mesh2d`   | shared unit circle, scaled per token        |
//! | Tool icon      | `Sprite`   | only when the token has an `image_ref`      |
//! | Fallback glyph | `Text2d`   | two letters when there is no image          |
//! | Savings line   | Bevy UI    | always visible, bottom-left                 |
//! | Search line    | Bevy UI    | always visible, top-left                    |
//!
//! The plugin also spawns the 2D camera.
//!
//! Token entities are disposable: when the field's generation changes the
//! whole visual set is despawned and respawned from the new snapshot, the same
//! way the engine replaces its token set.
//!
//! ## Coordinates
//!
//! The engine works in container-local pixels with a top-left origin and y
//! pointing down.  The default `Camera2d` is centred with y up, so
//! [`container_to_world`] flips and recentres.

use crate::catalog::Catalog;
use crate::constants::{DEFAULT_HEADCOUNT, GLYPH_FONT_SIZE, SHAKE_AMPLITUDE};
use crate::engine::IconField;
use crate::plugin::{toggle_selection_system, FieldViewport, SearchQuery, Selection};
use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};
use std::collections::HashMap;

// ── Resources ─────────────────────────────────────────────────────────────────

/// Shared unit-diameter circle mesh used by every token disc.
#[derive(Resource)]
pub struct TokenMesh(pub Handle<Mesh>);

/// Generation of the field that the current visuals were spawned from.
#[derive(Resource, Debug, Default)]
pub struct SpawnedGeneration(pub Option<u64>);

/// Seats multiplied into the savings estimate.
#[derive(Resource, Debug, Clone, Copy)]
pub struct Headcount(pub u32);

impl Default for Headcount {
    fn default() -> Self {
        Self(DEFAULT_HEADCOUNT)
    }
}

// ── Component markers ─────────────────────────────────────────────────────────

/// Root entity of one token's visuals.
#[derive(Component, Debug, Clone)]
pub struct TokenVisual {
    pub identity: String,
}

/// The disc child; owns a unique material so it can be tinted per selection.
#[derive(Component, Debug, Clone)]
pub struct TokenDisc {
    pub identity: String,
}

/// Marker for the savings text node.
#[derive(Component)]
pub struct SavingsText;

/// Marker for the search text node.
#[derive(Component)]
pub struct SearchText;

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct ToolFieldRenderPlugin;

impl Plugin for ToolFieldRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpawnedGeneration>()
            .init_resource::<Headcount>()
            .add_systems(Startup, (spawn_field_camera, init_token_mesh, setup_overlay_text))
            .add_systems(
                Update,
                (
                    respawn_token_visuals_system,
                    sync_token_transforms_system,
                    tint_selection_system,
                    savings_display_system,
                    search_display_system,
                )
                    .chain()
                    .after(toggle_selection_system),
            );
    }
}

// ── Colour helpers ────────────────────────────────────────────────────────────

fn disc_color() -> Color {
    Color::srgb(0.16, 0.18, 0.24)
}
fn disc_selected_color() -> Color {
    Color::srgb(0.10, 0.55, 0.32)
}
fn glyph_color() -> Color {
    Color::srgb(0.92, 0.92, 0.96)
}
fn savings_color() -> Color {
    Color::srgb(0.95, 0.88, 0.45)
}
fn search_color() -> Color {
    Color::srgb(0.55, 0.55, 0.65)
}

// ── Geometry helpers ──────────────────────────────────────────────────────────

/// Map a container-local point (top-left origin, y down) to world space.
pub fn container_to_world(point: Vec2, container: Vec2) -> Vec2 {
    Vec2::new(point.x - container.x * 0.5, container.y * 0.5 - point.y)
}

/// Triangle-fan circle of the given radius.
fn circle_mesh(radius: f32, sides: u32) -> Mesh {
    let n = sides as usize;
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(n + 1);

    positions.push([0.0, 0.0, 0.0]);
    normals.push([0.0, 0.0, 1.0]);
    uvs.push([0.5, 0.5]);

    for i in 0..n {
        let angle = std::f32::consts::TAU * i as f32 / n as f32;
        let x = radius * angle.cos();
        let y = radius * angle.sin();
        positions.push([x, y, 0.0]);
        normals.push([0.0, 0.0, 1.0]);
        uvs.push([x / (2.0 * radius) + 0.5, y / (2.0 * radius) + 0.5]);
    }

    let mut indices: Vec<u32> = Vec::with_capacity(n * 3);
    for i in 0..n as u32 {
        let v1 = i + 1;
        let v2 = (i + 1) % n as u32 + 1;
        indices.extend_from_slice(&[0, v1, v2]);
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Default `Camera2d`: one world unit per logical pixel, centred on the
/// window, which is what [`container_to_world`] assumes.
pub fn spawn_field_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
    debug!("Field camera spawned");
}

fn init_token_mesh(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let handle = meshes.add(circle_mesh(0.5, 40));
    commands.insert_resource(TokenMesh(handle));
}

/// Spawn the search line (top-left) and the savings line (bottom-left).
pub fn setup_overlay_text(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(8.0),
                ..default()
            },
            SearchText,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Type to search tools"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(search_color()),
            ));
        });

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                bottom: Val::Px(8.0),
                ..default()
            },
            SavingsText,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Pick the tools you pay for"),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(savings_color()),
            ));
        });
}

// ── Update ────────────────────────────────────────────────────────────────────

/// Despawn and respawn all token visuals when the field re-seeds.
pub fn respawn_token_visuals_system(
    mut commands: Commands,
    field: Res<IconField>,
    token_mesh: Option<Res<TokenMesh>>,
    asset_server: Res<AssetServer>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut spawned: ResMut<SpawnedGeneration>,
    existing: Query<Entity, With<TokenVisual>>,
) {
    if spawned.0 == Some(field.generation()) {
        return;
    }
    let Some(token_mesh) = token_mesh else {
        return;
    };

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    for token in field.tokens() {
        let material = materials.add(ColorMaterial::from_color(disc_color()));
        let image = token.image_ref.as_ref().map(|path| asset_server.load::<Image>(path.clone()));
        let glyph = token.glyph();

        commands
            .spawn((
                TokenVisual {
                    identity: token.identity.clone(),
                },
                Transform::default(),
                Visibility::default(),
            ))
            .with_children(|parent| {
                parent.spawn((
                    TokenDisc {
                        identity: token.identity.clone(),
                    },
                    Mesh2d(token_mesh.0.clone()),
                    MeshMaterial2d(material),
                    Transform::from_scale(Vec3::new(token.size, token.size, 1.0)),
                ));
                match image {
                    Some(image) => {
                        parent.spawn((
                            Sprite {
                                image,
                                custom_size: Some(Vec2::splat(token.size * 0.6)),
                                ..default()
                            },
                            Transform::from_xyz(0.0, 0.0, 0.1),
                        ));
                    }
                    None => {
                        parent.spawn((
                            Text2d::new(glyph),
                            TextFont {
                                font_size: GLYPH_FONT_SIZE,
                                ..default()
                            },
                            TextColor(glyph_color()),
                            Transform::from_xyz(0.0, 0.0, 0.1),
                        ));
                    }
                }
            });
    }

    spawned.0 = Some(field.generation());
}

/// Place each token root at its token's centre, shaking flagged tokens.
pub fn sync_token_transforms_system(
    field: Res<IconField>,
    viewport: Res<FieldViewport>,
    time: Res<Time>,
    mut query: Query<(&TokenVisual, &mut Transform)>,
) {
    let by_identity: HashMap<&str, _> = field
        .tokens()
        .iter()
        .map(|t| (t.identity.as_str(), t))
        .collect();
    let shake = (time.elapsed_secs() * 60.0).sin() * SHAKE_AMPLITUDE;

    for (visual, mut transform) in query.iter_mut() {
        let Some(token) = by_identity.get(visual.identity.as_str()) else {
            continue;
        };
        let mut world = container_to_world(token.center(), viewport.size);
        if token.colliding {
            world.x += shake;
        }
        transform.translation.x = world.x;
        transform.translation.y = world.y;
    }
}

/// Colour selected discs differently.  The engine knows nothing of selection.
pub fn tint_selection_system(
    selection: Res<Selection>,
    discs: Query<(&TokenDisc, &MeshMaterial2d<ColorMaterial>)>,
    added: Query<(), Added<TokenDisc>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    if !selection.is_changed() && added.is_empty() {
        return;
    }
    for (disc, material) in discs.iter() {
        let Some(mat) = materials.get_mut(&material.0) else {
            continue;
        };
        mat.color = if selection.contains(&disc.identity) {
            disc_selected_color()
        } else {
            disc_color()
        };
    }
}

/// Savings summary followed by one line per category listing the
/// open-source alternative for each selected tool.
pub fn savings_text(catalog: &Catalog, selection: &Selection, headcount: u32) -> String {
    if selection.0.is_empty() {
        return "Pick the tools you pay for".to_string();
    }
    let estimate = catalog.estimate_savings(selection.0.iter(), headcount);
    let mut text = format!(
        "{} tools × {} seats: save ${:.0}/month (${:.0}/year)",
        estimate.priced_tools, headcount, estimate.monthly, estimate.annual
    );
    for (category, swaps) in catalog.alternatives(selection.0.iter()) {
        let swaps: Vec<String> = swaps
            .iter()
            .map(|(tool, alternative)| format!("{tool} → {alternative}"))
            .collect();
        text.push_str(&format!("\n{category}: {}", swaps.join(", ")));
    }
    text
}

/// Refresh the savings line when the selection or headcount changes.
pub fn savings_display_system(
    selection: Res<Selection>,
    headcount: Res<Headcount>,
    catalog: Res<Catalog>,
    parent_query: Query<&Children, With<SavingsText>>,
    mut text_query: Query<&mut Text>,
) {
    if !selection.is_changed() && !headcount.is_changed() && !catalog.is_changed() {
        return;
    }
    let line = savings_text(&catalog, &selection, headcount.0);
    for children in parent_query.iter() {
        for child in children.iter() {
            if let Ok(mut text) = text_query.get_mut(child) {
                *text = Text::new(line.clone());
            }
        }
    }
}

/// Mirror the search query into the search line.
pub fn search_display_system(
    search: Res<SearchQuery>,
    field: Res<IconField>,
    parent_query: Query<&Children, With<SearchText>>,
    mut text_query: Query<&mut Text>,
) {
    if !search.is_changed() {
        return;
    }
    let line = if search.0.is_empty() {
        "Type to search tools".to_string()
    } else {
        format!("Search: {} ({} shown)", search.0, field.tokens().len())
    };
    for children in parent_query.iter() {
        for child in children.iter() {
            if let Ok(mut text) = text_query.get_mut(child) {
                *text = Text::new(line.clone());
            }
        }
    }
}
