//! Vehicle kinematics and the per-vehicle stop-line state machine
//!
//! Standalone implementation that doesn't depend on Bevy. The transitions
//! are exposed as small primitives; which one fires on a given tick is
//! decided by the approach queue (lead vehicle protocol) and the junction
//! arbiter (right-of-way).

use log::debug;
use ordered_float::OrderedFloat;

use super::config::{LaneGeometry, SimConfig};
use super::types::{Approach, Position, TurnIntent, VehicleId, VehicleState};

/// A vehicle in the intersection simulation
#[derive(Debug, Clone)]
pub struct SimVehicle {
    pub id: VehicleId,
    pub approach: Approach,
    /// Centre of the vehicle footprint
    pub position: Position,
    /// Radians, 0 = +y, growing clockwise
    pub heading: f32,
    pub speed: f32,
    /// Distance covered since spawning; orders vehicles within a queue
    pub distance_traveled: OrderedFloat<f32>,
    pub state: VehicleState,
    pub turn: TurnIntent,
    pub turn_ticks_remaining: u32,
    /// Dwell countdown while checking, penalty countdown while waiting
    pub stop_timer: u32,
    /// Number of times this vehicle had to yield
    pub wait_count: u32,
}

impl SimVehicle {
    pub fn new(id: VehicleId, approach: Approach, lane: &LaneGeometry, speed: f32) -> Self {
        Self {
            id,
            approach,
            position: lane.origin,
            heading: lane.heading,
            speed,
            distance_traveled: OrderedFloat(0.0),
            state: VehicleState::Idle,
            turn: TurnIntent::Straight,
            turn_ticks_remaining: 0,
            stop_timer: 0,
            wait_count: 0,
        }
    }

    /// Move one tick along the current heading, then apply any pending turn
    pub fn advance(&mut self, config: &SimConfig) {
        self.position = self.position.advanced(self.heading, self.speed);
        self.distance_traveled += self.speed;

        if self.turn_ticks_remaining > 0 {
            self.heading += config.turns.profile(self.turn).rate;
            self.turn_ticks_remaining -= 1;
        }
    }

    pub fn has_reached_stop_line(&self, lane: &LaneGeometry) -> bool {
        self.distance_traveled >= OrderedFloat(lane.stop_line)
    }

    /// Stop at the stop line and start the dwell timer
    pub fn begin_checking(&mut self, dwell_ticks: u32) {
        self.speed = 0.0;
        self.state = VehicleState::Checking;
        self.stop_timer = dwell_ticks;
        debug!(
            "Vehicle {} ({}) stopped at the stop line",
            self.id, self.approach
        );
    }

    /// Decrement the stop timer.
    /// Returns true once the timer has run out and right-of-way must be checked.
    pub fn count_down(&mut self) -> bool {
        self.stop_timer = self.stop_timer.saturating_sub(1);
        self.stop_timer == 0
    }

    /// Concede right-of-way and re-arm the penalty timer
    pub fn yield_for(&mut self, penalty_ticks: u32) {
        self.speed = 0.0;
        self.state = VehicleState::Waiting;
        self.stop_timer = penalty_ticks;
        self.wait_count += 1;
    }

    /// Commit to crossing with the given manoeuvre
    pub fn start_going(&mut self, turn: TurnIntent, config: &SimConfig) {
        self.state = VehicleState::Going;
        self.turn = turn;
        self.turn_ticks_remaining = config.turns.profile(turn).ticks;
        self.stop_timer = 0;
        self.speed = config.cruise_speed;
        debug!(
            "Vehicle {} ({}) entering junction, turn {:?} after {} waits",
            self.id, self.approach, turn, self.wait_count
        );
    }

    /// Corners of the vehicle rectangle, rear-left first, clockwise
    pub fn footprint(&self, length: f32, width: f32) -> [Position; 4] {
        footprint(self.position, self.heading, length, width)
    }
}

/// Corners of a rectangle of `length` along `heading` and `width` across it
pub fn footprint(center: Position, heading: f32, length: f32, width: f32) -> [Position; 4] {
    let front_x = length * heading.sin() / 2.0;
    let front_y = length * heading.cos() / 2.0;
    let side_x = width * heading.cos() / 2.0;
    let side_y = width * heading.sin() / 2.0;

    [
        Position::new(center.x - front_x - side_x, center.y - front_y + side_y),
        Position::new(center.x - front_x + side_x, center.y - front_y - side_y),
        Position::new(center.x + front_x + side_x, center.y + front_y - side_y),
        Position::new(center.x + front_x - side_x, center.y + front_y + side_y),
    ]
}
