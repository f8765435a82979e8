//! Cross-lane right-of-way for the four-way stop
//!
//! The arbiter owns the set of vehicles currently crossing the junction and
//! answers, for an approach's lead vehicle whose stop timer just expired,
//! whether it has to yield. Contenders on other approaches are read from a
//! snapshot taken at the start of the tick; the transit set is read live.

use log::debug;
use petgraph::graphmap::DiGraphMap;
use std::collections::HashMap;

use super::config::SimConfig;
use super::types::{Approach, VehicleId, VehicleState};
use super::vehicle::SimVehicle;

/// Role a contender plays in the rotation table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContenderKind {
    Cross,
    Right,
}

/// The two other approaches an approach must give way to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contenders {
    pub cross: Approach,
    pub right: Approach,
}

/// Static rotation table, indexed by `Approach::index`.
///
/// Deliberately asymmetric: it does not follow a geometric right-hand rule.
static CONTENDER_TABLE: [Contenders; 4] = [
    // north
    Contenders {
        cross: Approach::South,
        right: Approach::West,
    },
    // south
    Contenders {
        cross: Approach::North,
        right: Approach::East,
    },
    // east
    Contenders {
        cross: Approach::West,
        right: Approach::North,
    },
    // west
    Contenders {
        cross: Approach::East,
        right: Approach::South,
    },
];

pub fn contenders(approach: Approach) -> Contenders {
    CONTENDER_TABLE[approach.index()]
}

/// Directed graph with an edge from each approach to each of its contenders
pub fn contention_graph() -> DiGraphMap<Approach, ContenderKind> {
    let mut graph = DiGraphMap::new();
    for approach in Approach::ALL {
        graph.add_node(approach);
    }
    for approach in Approach::ALL {
        let Contenders { cross, right } = contenders(approach);
        graph.add_edge(approach, cross, ContenderKind::Cross);
        graph.add_edge(approach, right, ContenderKind::Right);
    }
    graph
}

/// Pairs of approaches that each list the other as a contender
pub fn mutual_contenders() -> Vec<(Approach, Approach)> {
    let graph = contention_graph();
    let mut pairs: Vec<(Approach, Approach)> = graph
        .all_edges()
        .filter(|(from, to, _)| from < to && graph.contains_edge(*to, *from))
        .map(|(from, to, _)| (from, to))
        .collect();
    pairs.sort();
    pairs
}

/// Why a lead vehicle was refused right-of-way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YieldReason {
    /// A committed vehicle is still crossing
    JunctionOccupied(VehicleId),
    /// A contender has not conceded yet
    Contender {
        kind: ContenderKind,
        approach: Approach,
        state: VehicleState,
    },
}

/// States of every approach's lead vehicle as of the start of a tick.
///
/// A lead vehicle that has not reached its stop line yet is recorded as
/// absent: only vehicles running the stop-line protocol contend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LeadSnapshot {
    leads: [Option<VehicleState>; 4],
}

impl LeadSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, approach: Approach, state: Option<VehicleState>) {
        self.leads[approach.index()] = state.filter(|state| *state != VehicleState::Idle);
    }

    pub fn lead(&self, approach: Approach) -> Option<VehicleState> {
        self.leads[approach.index()]
    }
}

/// Tracks vehicles inside the junction and applies the right-of-way rule
#[derive(Debug, Clone, Default)]
pub struct JunctionArbiter {
    transit: Vec<VehicleId>,
}

impl JunctionArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vehicles currently crossing, in admission order
    pub fn transit(&self) -> &[VehicleId] {
        &self.transit
    }

    pub fn contains(&self, id: VehicleId) -> bool {
        self.transit.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.transit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transit.is_empty()
    }

    /// Take ownership of a vehicle that just left its approach queue
    pub fn admit(&mut self, id: VehicleId) {
        self.transit.push(id);
    }

    /// Decide whether the lead vehicle of `approach` must yield.
    ///
    /// Rules are checked in order and the first match wins:
    /// 1. any transit vehicle is GOING
    /// 2. the cross contender is present and not WAITING
    /// 3. the right contender is present and not WAITING
    pub fn must_yield(
        &self,
        approach: Approach,
        leads: &LeadSnapshot,
        vehicles: &HashMap<VehicleId, SimVehicle>,
    ) -> Option<YieldReason> {
        if let Some(id) = self.transit.iter().copied().find(|id| {
            vehicles
                .get(id)
                .is_some_and(|vehicle| vehicle.state == VehicleState::Going)
        }) {
            return Some(YieldReason::JunctionOccupied(id));
        }

        let Contenders { cross, right } = contenders(approach);
        [(ContenderKind::Cross, cross), (ContenderKind::Right, right)]
            .into_iter()
            .find_map(|(kind, contender)| match leads.lead(contender) {
                Some(state) if state != VehicleState::Waiting => Some(YieldReason::Contender {
                    kind,
                    approach: contender,
                    state,
                }),
                _ => None,
            })
    }

    /// Move every transit vehicle one tick and drop those that left the
    /// junction region. Retired vehicles are removed from `vehicles` and
    /// returned.
    pub fn advance_transit(
        &mut self,
        vehicles: &mut HashMap<VehicleId, SimVehicle>,
        config: &SimConfig,
    ) -> Vec<SimVehicle> {
        let bounds = config.exit_bounds();
        let mut retired = Vec::new();

        self.transit.retain(|id| {
            let Some(vehicle) = vehicles.get_mut(id) else {
                return false;
            };
            vehicle.advance(config);
            if bounds.contains(&vehicle.position) {
                return true;
            }

            debug!(
                "Vehicle {} left the junction at ({:.1}, {:.1})",
                id, vehicle.position.x, vehicle.position.y
            );
            if let Some(vehicle) = vehicles.remove(id) {
                retired.push(vehicle);
            }
            false
        });

        retired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::types::{Position, SimId, TurnIntent};
    use petgraph::Direction;

    fn vehicle_in(
        vehicles: &mut HashMap<VehicleId, SimVehicle>,
        n: usize,
        approach: Approach,
        config: &SimConfig,
    ) -> VehicleId {
        let id = VehicleId(SimId(n));
        vehicles.insert(
            id,
            SimVehicle::new(id, approach, config.lane(approach), config.cruise_speed),
        );
        id
    }

    #[test]
    fn test_rotation_table_is_reproduced_exactly() {
        assert_eq!(
            contenders(Approach::West),
            Contenders {
                cross: Approach::East,
                right: Approach::South
            }
        );
        assert_eq!(
            contenders(Approach::East),
            Contenders {
                cross: Approach::West,
                right: Approach::North
            }
        );
        assert_eq!(
            contenders(Approach::North),
            Contenders {
                cross: Approach::South,
                right: Approach::West
            }
        );
        assert_eq!(
            contenders(Approach::South),
            Contenders {
                cross: Approach::North,
                right: Approach::East
            }
        );
    }

    #[test]
    fn test_no_approach_contends_with_itself() {
        for approach in Approach::ALL {
            let Contenders { cross, right } = contenders(approach);
            assert_ne!(cross, approach);
            assert_ne!(right, approach);
            assert_ne!(cross, right);
        }
    }

    #[test]
    fn test_contention_graph_shape() {
        let graph = contention_graph();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 8);
        for approach in Approach::ALL {
            assert_eq!(
                graph.neighbors_directed(approach, Direction::Outgoing).count(),
                2
            );
            assert_eq!(
                graph.neighbors_directed(approach, Direction::Incoming).count(),
                2
            );
        }
    }

    #[test]
    fn test_only_cross_pairs_contend_mutually() {
        assert_eq!(
            mutual_contenders(),
            vec![
                (Approach::North, Approach::South),
                (Approach::East, Approach::West)
            ]
        );
    }

    #[test]
    fn test_snapshot_treats_idle_lead_as_absent() {
        let mut leads = LeadSnapshot::new();
        leads.record(Approach::East, Some(VehicleState::Idle));
        leads.record(Approach::South, Some(VehicleState::Checking));
        assert_eq!(leads.lead(Approach::East), None);
        assert_eq!(leads.lead(Approach::South), Some(VehicleState::Checking));
        assert_eq!(leads.lead(Approach::North), None);
    }

    #[test]
    fn test_empty_junction_and_no_contenders_clears() {
        let arbiter = JunctionArbiter::new();
        let vehicles = HashMap::new();
        assert_eq!(
            arbiter.must_yield(Approach::West, &LeadSnapshot::new(), &vehicles),
            None
        );
    }

    #[test]
    fn test_going_transit_vehicle_has_priority() {
        let config = SimConfig::default();
        let mut vehicles = HashMap::new();
        let id = vehicle_in(&mut vehicles, 1, Approach::East, &config);
        if let Some(vehicle) = vehicles.get_mut(&id) {
            vehicle.start_going(TurnIntent::Straight, &config);
        }
        let mut arbiter = JunctionArbiter::new();
        arbiter.admit(id);

        // Even with every contender parked, the occupied junction wins
        let mut leads = LeadSnapshot::new();
        leads.record(Approach::East, Some(VehicleState::Waiting));
        leads.record(Approach::South, Some(VehicleState::Waiting));

        assert_eq!(
            arbiter.must_yield(Approach::West, &leads, &vehicles),
            Some(YieldReason::JunctionOccupied(id))
        );
    }

    #[test]
    fn test_cross_contender_checked_before_right() {
        let arbiter = JunctionArbiter::new();
        let vehicles = HashMap::new();
        let mut leads = LeadSnapshot::new();
        leads.record(Approach::East, Some(VehicleState::Checking));
        leads.record(Approach::South, Some(VehicleState::Checking));

        assert_eq!(
            arbiter.must_yield(Approach::West, &leads, &vehicles),
            Some(YieldReason::Contender {
                kind: ContenderKind::Cross,
                approach: Approach::East,
                state: VehicleState::Checking,
            })
        );
    }

    #[test]
    fn test_right_contender_blocks_when_cross_has_conceded() {
        let arbiter = JunctionArbiter::new();
        let vehicles = HashMap::new();
        let mut leads = LeadSnapshot::new();
        leads.record(Approach::East, Some(VehicleState::Waiting));
        leads.record(Approach::South, Some(VehicleState::Checking));

        assert_eq!(
            arbiter.must_yield(Approach::West, &leads, &vehicles),
            Some(YieldReason::Contender {
                kind: ContenderKind::Right,
                approach: Approach::South,
                state: VehicleState::Checking,
            })
        );
    }

    #[test]
    fn test_waiting_contenders_concede() {
        let arbiter = JunctionArbiter::new();
        let vehicles = HashMap::new();
        let mut leads = LeadSnapshot::new();
        leads.record(Approach::East, Some(VehicleState::Waiting));
        leads.record(Approach::South, Some(VehicleState::Waiting));
        // North is not one of west's contenders
        leads.record(Approach::North, Some(VehicleState::Checking));

        assert_eq!(arbiter.must_yield(Approach::West, &leads, &vehicles), None);
    }

    #[test]
    fn test_transit_vehicle_retired_on_first_tick_outside_bounds() {
        let config = SimConfig::default();
        let mut vehicles = HashMap::new();
        let id = vehicle_in(&mut vehicles, 7, Approach::South, &config);
        if let Some(vehicle) = vehicles.get_mut(&id) {
            vehicle.start_going(TurnIntent::Straight, &config);
            // Heading +y, two ticks short of the bottom edge at y = 450
            vehicle.position = Position::new(350.0, 441.0);
        }
        let mut arbiter = JunctionArbiter::new();
        arbiter.admit(id);

        let retired = arbiter.advance_transit(&mut vehicles, &config);
        assert!(retired.is_empty());
        assert!(arbiter.contains(id));

        let retired = arbiter.advance_transit(&mut vehicles, &config);
        assert_eq!(retired.len(), 1);
        assert_eq!(retired[0].id, id);
        assert!(arbiter.is_empty());
        assert!(!vehicles.contains_key(&id));

        let retired = arbiter.advance_transit(&mut vehicles, &config);
        assert!(retired.is_empty());
    }
}
