//! UI components and resources for linking Bevy entities to simulation state

use bevy::prelude::*;
use std::collections::HashMap;

use crate::simulation::{Position, SimWorld, VehicleId, VehicleState};

/// Bevy units per simulation unit
pub const WORLD_SCALE: f32 = 0.05;

/// Resource wrapper for the simulation world
#[derive(Resource)]
pub struct SimWorldResource(pub SimWorld);

impl Default for SimWorldResource {
    fn default() -> Self {
        Self(SimWorld::new())
    }
}

/// Marker component for ground plane
#[derive(Component)]
pub struct Ground;

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Links a Bevy entity to a simulation vehicle
#[derive(Component)]
pub struct VehicleLink(pub VehicleId);

/// Marks the coloured marker at a vehicle's front bumper
#[derive(Component)]
pub struct StateIndicator;

/// Resource to track Bevy entities mapped to simulation entities
#[derive(Resource, Default)]
pub struct EntityMappings {
    pub vehicles: HashMap<VehicleId, Entity>,
}

/// Convert a screen-space simulation position to a Bevy translation.
/// The junction centre maps to the origin and screen y maps to +Z.
pub fn to_world(world: &SimWorld, position: &Position, height: f32) -> Vec3 {
    let center = world.config().junction.center();
    Vec3::new(
        (position.x - center.x) * WORLD_SCALE,
        height,
        (position.y - center.y) * WORLD_SCALE,
    )
}

/// Indicator colour for a vehicle state
pub fn state_color(state: VehicleState) -> Color {
    let [r, g, b] = state.indicator_color();
    Color::srgb_u8(r, g, b)
}
