//! UI module that visualizes the simulation state using Bevy
//!
//! This module is purely for visualization and input - all simulation logic
//! is in the `simulation` module. The UI forwards arrow-key presses as spawn
//! requests, ticks the simulation at a fixed rate and draws its renderables.

mod components;
mod input;
mod sync;
mod world;

use bevy::prelude::*;

use crate::simulation::TICKS_PER_SECOND;

pub use components::{EntityMappings, SimWorldResource};

use input::{handle_input, handle_spawn_keys};
use sync::{sync_vehicles, tick_simulation, update_state_indicators};
use world::setup_world;

/// Plugin to register all UI systems
pub struct FourWayStopUIPlugin;

impl Plugin for FourWayStopUIPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimWorldResource>()
            .init_resource::<EntityMappings>()
            .insert_resource(Time::<Fixed>::from_hz(f64::from(TICKS_PER_SECOND)))
            .add_systems(Startup, setup_world)
            .add_systems(FixedUpdate, tick_simulation)
            .add_systems(
                Update,
                (
                    handle_input,
                    handle_spawn_keys,
                    sync_vehicles,
                    update_state_indicators,
                ),
            );
    }
}
