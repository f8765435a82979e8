//! Standalone four-way stop simulation module
//!
//! This module contains all the core simulation logic: vehicle state
//! machines, approach queues and the junction's right-of-way rule. It runs
//! independently of the Bevy game engine and can be tested via console
//! without booting up the UI.

mod approach_queue;
pub mod arbiter;
mod config;
mod stats;
mod types;
mod vehicle;
mod world;

pub use approach_queue::ApproachQueue;
pub use arbiter::{
    contenders, contention_graph, mutual_contenders, ContenderKind, Contenders, JunctionArbiter,
    LeadSnapshot, YieldReason,
};
pub use config::{
    JunctionBounds, LaneGeometry, SimConfig, TurnProfile, TurnTable, CRUISE_SPEED, DWELL_TICKS,
    FOLLOWING_BUFFER, TICKS_PER_SECOND, VEHICLE_LENGTH, VEHICLE_WIDTH, WAIT_PENALTY_TICKS,
    WORLD_HEIGHT, WORLD_WIDTH,
};
pub use stats::SimStats;
pub use types::{Approach, Position, SimId, TurnIntent, VehicleId, VehicleState};
pub use vehicle::{footprint, SimVehicle};
pub use world::{Renderable, SimWorld};
