//! Single-lane approach queues
//!
//! A queue owns the ordering of the vehicles travelling on one approach.
//! Each tick the lead vehicle runs the stop-line protocol while the
//! followers keep their distance to the vehicle ahead.

use log::debug;
use ordered_float::OrderedFloat;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::{HashMap, VecDeque};

use super::arbiter::{JunctionArbiter, LeadSnapshot};
use super::config::SimConfig;
use super::types::{Approach, TurnIntent, VehicleId, VehicleState};
use super::vehicle::SimVehicle;

/// Vehicles on one approach, lead vehicle (closest to the stop line) first
#[derive(Debug, Clone)]
pub struct ApproachQueue {
    pub approach: Approach,
    vehicles: VecDeque<VehicleId>,
}

impl ApproachQueue {
    pub fn new(approach: Approach) -> Self {
        Self {
            approach,
            vehicles: VecDeque::new(),
        }
    }

    /// The vehicle closest to the stop line, if any
    pub fn lead(&self) -> Option<VehicleId> {
        self.vehicles.front().copied()
    }

    /// The most recently spawned vehicle, if any
    pub fn tail(&self) -> Option<VehicleId> {
        self.vehicles.back().copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.vehicles.iter().copied()
    }

    pub fn contains(&self, id: VehicleId) -> bool {
        self.vehicles.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Append a freshly spawned vehicle at the tail
    pub fn push(&mut self, id: VehicleId) {
        self.vehicles.push_back(id);
    }

    /// Whether the lane origin is clear enough to spawn another vehicle
    pub fn has_room_at_origin(
        &self,
        vehicles: &HashMap<VehicleId, SimVehicle>,
        config: &SimConfig,
    ) -> bool {
        self.tail()
            .and_then(|id| vehicles.get(&id))
            .map_or(true, |tail| {
                tail.distance_traveled >= OrderedFloat(config.safety_margin())
            })
    }

    /// Advance every vehicle on this approach by one tick.
    ///
    /// Returns the lead vehicle if it was cleared to cross this tick; it has
    /// already been removed from the queue and must be handed to the arbiter.
    pub fn advance<R: Rng>(
        &mut self,
        vehicles: &mut HashMap<VehicleId, SimVehicle>,
        arbiter: &JunctionArbiter,
        leads: &LeadSnapshot,
        config: &SimConfig,
        rng: &mut R,
    ) -> Option<VehicleId> {
        let mut ahead: Option<OrderedFloat<f32>> = None;

        for &id in &self.vehicles {
            // Take the vehicle out while it is updated so the arbiter can
            // still read the rest of the arena
            let Some(mut vehicle) = vehicles.remove(&id) else {
                continue;
            };

            match ahead {
                None => self.step_lead(&mut vehicle, arbiter, leads, vehicles, config, rng),
                Some(ahead_distance) => {
                    // Margin uses the speed the follower would move at, so a
                    // restart never closes the gap below one safety margin
                    let gap = ahead_distance - vehicle.distance_traveled;
                    vehicle.speed =
                        if gap < OrderedFloat(config.safety_margin() + config.cruise_speed) {
                            0.0
                        } else {
                            config.cruise_speed
                        };
                }
            }

            vehicle.advance(config);
            ahead = Some(vehicle.distance_traveled);
            vehicles.insert(id, vehicle);
        }

        let lead = self.lead()?;
        if vehicles.get(&lead)?.state != VehicleState::Going {
            return None;
        }
        self.vehicles.pop_front();
        Some(lead)
    }

    /// Run the stop-line protocol for the lead vehicle
    fn step_lead<R: Rng>(
        &self,
        vehicle: &mut SimVehicle,
        arbiter: &JunctionArbiter,
        leads: &LeadSnapshot,
        vehicles: &HashMap<VehicleId, SimVehicle>,
        config: &SimConfig,
        rng: &mut R,
    ) {
        match vehicle.state {
            VehicleState::Checking | VehicleState::Waiting => {
                if !vehicle.count_down() {
                    return;
                }
                match arbiter.must_yield(self.approach, leads, vehicles) {
                    Some(reason) => {
                        vehicle.yield_for(config.wait_penalty_ticks);
                        debug!(
                            "Vehicle {} ({}) yields: {:?} (wait #{})",
                            vehicle.id, self.approach, reason, vehicle.wait_count
                        );
                    }
                    None => {
                        let turn = choose_turn(rng);
                        vehicle.start_going(turn, config);
                    }
                }
            }
            VehicleState::Idle if vehicle.has_reached_stop_line(config.lane(self.approach)) => {
                vehicle.begin_checking(config.dwell_ticks);
            }
            VehicleState::Idle => vehicle.speed = config.cruise_speed,
            VehicleState::Going => {}
        }
    }
}

/// Pick a manoeuvre uniformly at random
fn choose_turn<R: Rng>(rng: &mut R) -> TurnIntent {
    TurnIntent::ALL.choose(rng).copied().unwrap_or_default()
}
