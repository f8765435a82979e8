//! Core types for the intersection simulation
//!
//! These are standalone types that don't depend on Bevy.

use std::fmt;

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimId(pub usize);

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub SimId);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0 .0)
    }
}

/// One of the four approach lanes feeding the junction.
///
/// The labels name queues as seen by the right-of-way table, not literal
/// compass geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Approach {
    North,
    South,
    East,
    West,
}

impl Approach {
    /// All approaches, in the order the simulation processes them each tick
    pub const ALL: [Approach; 4] = [
        Approach::North,
        Approach::South,
        Approach::East,
        Approach::West,
    ];

    /// Dense index into per-approach arrays
    pub const fn index(self) -> usize {
        match self {
            Approach::North => 0,
            Approach::South => 1,
            Approach::East => 2,
            Approach::West => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Approach::North => "north",
            Approach::South => "south",
            Approach::East => "east",
            Approach::West => "west",
        }
    }
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-vehicle stop-line protocol state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VehicleState {
    /// Spawned or cruising toward the stop line
    #[default]
    Idle,
    /// Stopped at the stop line, running the dwell timer
    Checking,
    /// Yielded to another vehicle, running the wait penalty
    Waiting,
    /// Cleared to cross; never leaves this state
    Going,
}

impl VehicleState {
    /// Indicator colour drawn at the front of the vehicle
    pub fn indicator_color(self) -> [u8; 3] {
        match self {
            VehicleState::Idle => [0, 0, 0],
            VehicleState::Checking => [100, 100, 255],
            VehicleState::Waiting => [255, 100, 100],
            VehicleState::Going => [100, 255, 100],
        }
    }

    /// Single character used by the terminal map
    pub fn map_symbol(self) -> char {
        match self {
            VehicleState::Idle => 'I',
            VehicleState::Checking => 'C',
            VehicleState::Waiting => 'W',
            VehicleState::Going => 'G',
        }
    }
}

/// Manoeuvre picked when a vehicle is cleared to cross
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TurnIntent {
    #[default]
    Straight,
    Left,
    Right,
}

impl TurnIntent {
    pub const ALL: [TurnIntent; 3] = [TurnIntent::Straight, TurnIntent::Left, TurnIntent::Right];
}

/// A 2D position in screen coordinates (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Offset this position by `distance` along a heading.
    /// Heading 0 points along +y and grows clockwise on screen.
    pub fn advanced(&self, heading: f32, distance: f32) -> Position {
        Position {
            x: self.x + distance * heading.sin(),
            y: self.y + distance * heading.cos(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approach_indices_are_dense() {
        for (expected, approach) in Approach::ALL.iter().enumerate() {
            assert_eq!(approach.index(), expected);
        }
    }

    #[test]
    fn test_advanced_follows_heading_convention() {
        let origin = Position::new(10.0, 10.0);

        let south = origin.advanced(0.0, 5.0);
        assert!((south.x - 10.0).abs() < 1e-5);
        assert!((south.y - 15.0).abs() < 1e-5);

        let east = origin.advanced(std::f32::consts::FRAC_PI_2, 5.0);
        assert!((east.x - 15.0).abs() < 1e-5);
        assert!((east.y - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_state_colors_match_renderer_palette() {
        assert_eq!(VehicleState::Checking.indicator_color(), [100, 100, 255]);
        assert_eq!(VehicleState::Going.indicator_color(), [100, 255, 100]);
        assert_eq!(VehicleState::Waiting.indicator_color(), [255, 100, 100]);
    }
}
