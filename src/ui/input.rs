//! Input handling systems

use bevy::log::debug;
use bevy::prelude::*;

use super::components::SimWorldResource;
use crate::simulation::Approach;

/// One key press spawns one vehicle on the matching approach
const SPAWN_KEYS: [(KeyCode, Approach); 4] = [
    (KeyCode::ArrowDown, Approach::South),
    (KeyCode::ArrowUp, Approach::North),
    (KeyCode::ArrowLeft, Approach::West),
    (KeyCode::ArrowRight, Approach::East),
];

/// Handle basic keyboard input
pub fn handle_input(keyboard: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keyboard.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}

/// Forward arrow-key presses to the simulation as spawn requests
pub fn handle_spawn_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut sim_world: ResMut<SimWorldResource>,
) {
    for (key, approach) in SPAWN_KEYS {
        if keyboard.just_pressed(key) && sim_world.0.spawn(approach).is_none() {
            debug!("Lane origin on {} still occupied, spawn ignored", approach);
        }
    }
}
