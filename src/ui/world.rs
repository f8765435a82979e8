//! World setup systems for camera, lighting, ground and roads

use bevy::prelude::*;

use super::components::{to_world, Ground, MainCamera, SimWorldResource, WORLD_SCALE};
use crate::simulation::{WORLD_HEIGHT, WORLD_WIDTH};

/// System to setup the world environment (ground, roads, lighting, camera)
pub fn setup_world(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    sim_world: Res<SimWorldResource>,
) {
    let world = &sim_world.0;
    let junction = world.config().junction;
    let road_width = (junction.max.x - junction.min.x) * WORLD_SCALE;

    // Top-down camera with screen y pointing down
    commands.spawn((
        MainCamera,
        Camera3d::default(),
        Transform::from_xyz(0.0, 40.0, 0.0).looking_at(Vec3::ZERO, Vec3::NEG_Z),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Ground,
        Mesh3d(meshes.add(
            Plane3d::default()
                .mesh()
                .size(WORLD_WIDTH * WORLD_SCALE, WORLD_HEIGHT * WORLD_SCALE),
        )),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.5, 0.3))),
    ));

    let asphalt = materials.add(Color::srgb(0.25, 0.25, 0.25));
    let center = to_world(world, &junction.center(), 0.01);

    // North-south road
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(road_width, 0.02, WORLD_HEIGHT * WORLD_SCALE))),
        MeshMaterial3d(asphalt.clone()),
        Transform::from_translation(center),
    ));

    // East-west road
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(WORLD_WIDTH * WORLD_SCALE, 0.02, road_width))),
        MeshMaterial3d(asphalt),
        Transform::from_translation(center),
    ));

    // Junction box
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(road_width, 0.03, road_width))),
        MeshMaterial3d(materials.add(Color::srgb(0.35, 0.2, 0.2))),
        Transform::from_translation(center),
    ));
}
