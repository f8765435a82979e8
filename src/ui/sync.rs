//! Systems for syncing Bevy entities with simulation state

use bevy::prelude::*;
use std::collections::HashMap;

use super::components::{
    state_color, to_world, EntityMappings, SimWorldResource, StateIndicator, VehicleLink,
    WORLD_SCALE,
};
use crate::simulation::{Renderable, VehicleId};

const VEHICLE_HEIGHT: f32 = 1.0;

/// System to run simulation tick
pub fn tick_simulation(mut sim_world: ResMut<SimWorldResource>) {
    sim_world.0.tick();
}

/// System to sync vehicle visuals from simulation state
pub fn sync_vehicles(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    sim_world: Res<SimWorldResource>,
    mut mappings: ResMut<EntityMappings>,
    mut vehicle_query: Query<(Entity, &VehicleLink, &mut Transform)>,
) {
    let world = &sim_world.0;
    let config = world.config();
    let live: HashMap<VehicleId, Renderable> =
        world.renderables().map(|renderable| (renderable.id, renderable)).collect();

    // Update existing vehicles, despawn retired ones
    for (entity, link, mut transform) in vehicle_query.iter_mut() {
        if let Some(renderable) = live.get(&link.0) {
            transform.translation = to_world(world, &renderable.position, VEHICLE_HEIGHT / 2.0);
            transform.rotation = Quat::from_rotation_y(renderable.heading);
        } else {
            commands.entity(entity).despawn();
            mappings.vehicles.remove(&link.0);
        }
    }

    // Spawn newly created vehicles
    let length = config.vehicle_length * WORLD_SCALE;
    let width = config.vehicle_width * WORLD_SCALE;
    for (id, renderable) in &live {
        if mappings.vehicles.contains_key(id) {
            continue;
        }

        let entity = commands
            .spawn((
                VehicleLink(*id),
                Mesh3d(meshes.add(Cuboid::new(width, VEHICLE_HEIGHT, length))),
                MeshMaterial3d(materials.add(Color::srgb(0.76, 0.76, 0.76))),
                Transform::from_translation(to_world(
                    world,
                    &renderable.position,
                    VEHICLE_HEIGHT / 2.0,
                ))
                .with_rotation(Quat::from_rotation_y(renderable.heading)),
            ))
            .with_children(|parent| {
                parent.spawn((
                    StateIndicator,
                    Mesh3d(meshes.add(Sphere::new(0.5))),
                    MeshMaterial3d(materials.add(state_color(renderable.state))),
                    Transform::from_xyz(0.0, VEHICLE_HEIGHT / 2.0, length / 2.0),
                ));
            })
            .id();
        mappings.vehicles.insert(*id, entity);
    }
}

/// System to colour each vehicle's indicator by its protocol state
pub fn update_state_indicators(
    sim_world: Res<SimWorldResource>,
    vehicle_query: Query<(&VehicleLink, &Children)>,
    indicator_query: Query<&MeshMaterial3d<StandardMaterial>, With<StateIndicator>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (link, children) in vehicle_query.iter() {
        let Some(vehicle) = sim_world.0.vehicle(link.0) else {
            continue;
        };
        for child in children.iter() {
            if let Ok(material_handle) = indicator_query.get(child) {
                if let Some(material) = materials.get_mut(&material_handle.0) {
                    material.base_color = state_color(vehicle.state);
                }
            }
        }
    }
}
