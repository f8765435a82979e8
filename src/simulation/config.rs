//! Immutable simulation parameters
//!
//! Every timer, turn rate and piece of lane geometry lives here so a run can
//! be reproduced (or varied) by constructing a different `SimConfig`.

use anyhow::{ensure, Result};
use std::f32::consts::{FRAC_PI_2, PI};

use super::types::{Approach, Position, TurnIntent};

/// Forward speed of a moving vehicle, in world units per tick
pub const CRUISE_SPEED: f32 = 5.0;

/// Vehicle footprint
pub const VEHICLE_LENGTH: f32 = 80.0;
pub const VEHICLE_WIDTH: f32 = 50.0;

/// Extra space kept between queued vehicles, on top of one vehicle length
pub const FOLLOWING_BUFFER: f32 = 20.0;

/// Dwell at the stop line before the first right-of-way check
pub const DWELL_TICKS: u32 = 30;

/// Wait imposed every time a vehicle has to yield
pub const WAIT_PENALTY_TICKS: u32 = 50;

/// Reference frame rate of the interactive front-end
pub const TICKS_PER_SECOND: u32 = 30;

/// World extent in screen coordinates
pub const WORLD_WIDTH: f32 = 800.0;
pub const WORLD_HEIGHT: f32 = 600.0;

/// Distance from the junction centre to its edge
pub const JUNCTION_HALF_WIDTH: f32 = 100.0;

/// Distance from a road's centre line to the middle of a lane
pub const LANE_OFFSET: f32 = 50.0;

/// How far outside the junction square a transit vehicle may drift before
/// it is retired
pub const EXIT_MARGIN: f32 = 50.0;

/// How a vehicle's heading evolves while it executes a turn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnProfile {
    /// Number of ticks during which the heading changes
    pub ticks: u32,
    /// Heading change per tick in radians (positive is clockwise)
    pub rate: f32,
}

/// Turn profiles for each manoeuvre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnTable {
    pub straight: TurnProfile,
    pub left: TurnProfile,
    pub right: TurnProfile,
}

impl TurnTable {
    pub fn profile(&self, turn: TurnIntent) -> TurnProfile {
        match turn {
            TurnIntent::Straight => self.straight,
            TurnIntent::Left => self.left,
            TurnIntent::Right => self.right,
        }
    }
}

impl Default for TurnTable {
    fn default() -> Self {
        Self {
            straight: TurnProfile { ticks: 0, rate: 0.0 },
            left: TurnProfile {
                ticks: 58,
                rate: 0.027,
            },
            right: TurnProfile {
                ticks: 26,
                rate: -0.06,
            },
        }
    }
}

/// Where vehicles of one approach spawn and where they must stop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneGeometry {
    pub origin: Position,
    pub heading: f32,
    /// Distance from the origin at which a lead vehicle starts checking
    pub stop_line: f32,
}

/// Axis-aligned square occupied by the junction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JunctionBounds {
    pub min: Position,
    pub max: Position,
}

impl JunctionBounds {
    pub fn centered(center: Position, half_width: f32) -> Self {
        Self {
            min: Position::new(center.x - half_width, center.y - half_width),
            max: Position::new(center.x + half_width, center.y + half_width),
        }
    }

    pub fn center(&self) -> Position {
        Position::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Grow the bounds by `margin` on every side
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: Position::new(self.min.x - margin, self.min.y - margin),
            max: Position::new(self.max.x + margin, self.max.y + margin),
        }
    }

    pub fn contains(&self, position: &Position) -> bool {
        position.x >= self.min.x
            && position.x <= self.max.x
            && position.y >= self.min.y
            && position.y <= self.max.y
    }
}

/// All simulation parameters, fixed for the lifetime of a `SimWorld`
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub cruise_speed: f32,
    pub vehicle_length: f32,
    pub vehicle_width: f32,
    pub following_buffer: f32,
    pub dwell_ticks: u32,
    pub wait_penalty_ticks: u32,
    pub turns: TurnTable,
    pub junction: JunctionBounds,
    pub exit_margin: f32,
    /// Lane table indexed by `Approach::index`
    pub lanes: [LaneGeometry; 4],
    pub ticks_per_second: u32,
    /// Audit the membership and kinematic invariants after every tick
    pub check_invariants: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        let junction = JunctionBounds::centered(
            Position::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0),
            JUNCTION_HALF_WIDTH,
        );
        let lanes = default_lanes(&junction, VEHICLE_LENGTH);

        Self {
            cruise_speed: CRUISE_SPEED,
            vehicle_length: VEHICLE_LENGTH,
            vehicle_width: VEHICLE_WIDTH,
            following_buffer: FOLLOWING_BUFFER,
            dwell_ticks: DWELL_TICKS,
            wait_penalty_ticks: WAIT_PENALTY_TICKS,
            turns: TurnTable::default(),
            junction,
            exit_margin: EXIT_MARGIN,
            lanes,
            ticks_per_second: TICKS_PER_SECOND,
            check_invariants: true,
        }
    }
}

/// Lanes entering from the world edges, stopping half a vehicle short of
/// the junction square
fn default_lanes(junction: &JunctionBounds, vehicle_length: f32) -> [LaneGeometry; 4] {
    let center = junction.center();
    let half_length = vehicle_length / 2.0;

    let north = LaneGeometry {
        origin: Position::new(center.x + LANE_OFFSET, WORLD_HEIGHT),
        heading: -PI,
        stop_line: WORLD_HEIGHT - junction.max.y - half_length,
    };
    let south = LaneGeometry {
        origin: Position::new(center.x - LANE_OFFSET, 0.0),
        heading: 0.0,
        stop_line: junction.min.y - half_length,
    };
    let east = LaneGeometry {
        origin: Position::new(0.0, center.y + LANE_OFFSET),
        heading: FRAC_PI_2,
        stop_line: junction.min.x - half_length,
    };
    let west = LaneGeometry {
        origin: Position::new(WORLD_WIDTH, center.y - LANE_OFFSET),
        heading: -FRAC_PI_2,
        stop_line: WORLD_WIDTH - junction.max.x - half_length,
    };

    let mut lanes = [north; 4];
    lanes[Approach::North.index()] = north;
    lanes[Approach::South.index()] = south;
    lanes[Approach::East.index()] = east;
    lanes[Approach::West.index()] = west;
    lanes
}

impl SimConfig {
    pub fn lane(&self, approach: Approach) -> &LaneGeometry {
        &self.lanes[approach.index()]
    }

    /// Minimum bumper-to-bumper spacing between centres of queued vehicles
    pub fn safety_margin(&self) -> f32 {
        self.vehicle_length + self.following_buffer
    }

    /// Region a transit vehicle must stay inside to remain simulated
    pub fn exit_bounds(&self) -> JunctionBounds {
        self.junction.expanded(self.exit_margin)
    }

    /// Reject parameter sets the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.cruise_speed.is_finite() && self.cruise_speed > 0.0,
            "cruise speed must be positive, got {}",
            self.cruise_speed
        );
        ensure!(
            self.vehicle_length > 0.0 && self.vehicle_width > 0.0,
            "vehicle footprint must be positive, got {}x{}",
            self.vehicle_length,
            self.vehicle_width
        );
        ensure!(
            self.following_buffer >= 0.0,
            "following buffer must not be negative, got {}",
            self.following_buffer
        );
        ensure!(self.dwell_ticks > 0, "dwell must last at least one tick");
        ensure!(
            self.wait_penalty_ticks > 0,
            "wait penalty must last at least one tick"
        );
        ensure!(
            self.junction.min.x < self.junction.max.x && self.junction.min.y < self.junction.max.y,
            "junction bounds are inverted: {:?}",
            self.junction
        );
        ensure!(
            self.exit_margin >= 0.0,
            "exit margin must not be negative, got {}",
            self.exit_margin
        );
        for approach in Approach::ALL {
            let lane = self.lane(approach);
            ensure!(
                lane.stop_line >= 0.0,
                "{approach} stop line lies behind its origin ({})",
                lane.stop_line
            );
        }
        ensure!(self.ticks_per_second > 0, "tick rate must be positive");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lanes_match_screen_layout() {
        let config = SimConfig::default();

        let west = config.lane(Approach::West);
        assert_eq!(west.origin, Position::new(800.0, 250.0));
        assert_eq!(west.stop_line, 260.0);

        let east = config.lane(Approach::East);
        assert_eq!(east.origin, Position::new(0.0, 350.0));
        assert_eq!(east.stop_line, 260.0);

        let north = config.lane(Approach::North);
        assert_eq!(north.origin, Position::new(450.0, 600.0));
        assert_eq!(north.stop_line, 160.0);

        let south = config.lane(Approach::South);
        assert_eq!(south.origin, Position::new(350.0, 0.0));
        assert_eq!(south.stop_line, 160.0);
    }

    #[test]
    fn test_exit_bounds() {
        let bounds = SimConfig::default().exit_bounds();
        assert_eq!(bounds.min, Position::new(250.0, 150.0));
        assert_eq!(bounds.max, Position::new(550.0, 450.0));
        assert!(bounds.contains(&Position::new(400.0, 300.0)));
        assert!(!bounds.contains(&Position::new(249.0, 300.0)));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let config = SimConfig {
            cruise_speed: 0.0,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SimConfig {
            dwell_ticks: 0,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.junction = JunctionBounds {
            min: Position::new(500.0, 400.0),
            max: Position::new(300.0, 200.0),
        };
        assert!(config.validate().is_err());
    }
}
