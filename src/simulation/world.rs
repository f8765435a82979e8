//! Main simulation world that ties everything together
//!
//! `SimWorld` is the simulation clock: it owns the vehicle arena, the four
//! approach queues and the junction arbiter, and advances them one discrete
//! tick at a time without any Bevy dependencies.

use anyhow::{bail, ensure, Context, Result};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

use super::approach_queue::ApproachQueue;
use super::arbiter::{JunctionArbiter, LeadSnapshot};
use super::config::SimConfig;
use super::stats::SimStats;
use super::types::{Approach, Position, SimId, VehicleId, VehicleState};
use super::vehicle::{self, SimVehicle};

/// Slack allowed when auditing queue spacing, to absorb float drift
const SPACING_TOLERANCE: f32 = 1e-3;

/// What a renderer needs to draw one live vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderable {
    pub id: VehicleId,
    pub approach: Approach,
    pub position: Position,
    pub heading: f32,
    pub state: VehicleState,
}

impl Renderable {
    /// Corners of the vehicle rectangle
    pub fn footprint(&self, config: &SimConfig) -> [Position; 4] {
        vehicle::footprint(
            self.position,
            self.heading,
            config.vehicle_length,
            config.vehicle_width,
        )
    }

    /// Point at the front bumper where the state indicator is drawn
    pub fn front(&self, config: &SimConfig) -> Position {
        self.position
            .advanced(self.heading, config.vehicle_length / 2.0)
    }
}

impl From<&SimVehicle> for Renderable {
    fn from(vehicle: &SimVehicle) -> Self {
        Self {
            id: vehicle.id,
            approach: vehicle.approach,
            position: vehicle.position,
            heading: vehicle.heading,
            state: vehicle.state,
        }
    }
}

/// The main simulation world
pub struct SimWorld {
    config: SimConfig,

    /// Every live vehicle, queued or in transit
    vehicles: HashMap<VehicleId, SimVehicle>,

    /// Approach queues indexed by `Approach::index`
    queues: [ApproachQueue; 4],

    arbiter: JunctionArbiter,

    /// Next ID to assign
    next_id: usize,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,

    stats: SimStats,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    fn new_internal(config: SimConfig, rng: Option<StdRng>) -> Self {
        Self {
            config,
            vehicles: HashMap::new(),
            queues: Approach::ALL.map(ApproachQueue::new),
            arbiter: JunctionArbiter::new(),
            next_id: 0,
            rng,
            stats: SimStats::default(),
        }
    }

    pub fn new() -> Self {
        Self::new_internal(SimConfig::default(), None)
    }

    /// Create a new SimWorld with a seeded RNG for reproducible simulations
    pub fn new_with_seed(seed: u64) -> Self {
        Self::new_internal(SimConfig::default(), Some(StdRng::seed_from_u64(seed)))
    }

    /// Create a SimWorld with custom parameters
    pub fn with_config(config: SimConfig, seed: Option<u64>) -> Result<Self> {
        config.validate().context("Invalid simulation config")?;
        Ok(Self::new_internal(config, seed.map(StdRng::seed_from_u64)))
    }

    fn next_sim_id(&mut self) -> SimId {
        let id = SimId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&SimVehicle> {
        self.vehicles.get(&id)
    }

    pub fn queue(&self, approach: Approach) -> &ApproachQueue {
        &self.queues[approach.index()]
    }

    pub fn arbiter(&self) -> &JunctionArbiter {
        &self.arbiter
    }

    /// Number of live vehicles
    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn queued_count(&self) -> usize {
        self.queues.iter().map(ApproachQueue::len).sum()
    }

    /// Enqueue a new vehicle at the origin of `approach`.
    ///
    /// Silently ignored (returns `None`) while the previous vehicle on that
    /// approach is still within one safety margin of the origin.
    pub fn spawn(&mut self, approach: Approach) -> Option<VehicleId> {
        if !self.queues[approach.index()].has_room_at_origin(&self.vehicles, &self.config) {
            self.stats.rejected_spawns += 1;
            debug!("Spawn on {} ignored: origin occupied", approach);
            return None;
        }

        let id = VehicleId(self.next_sim_id());
        let vehicle = SimVehicle::new(
            id,
            approach,
            self.config.lane(approach),
            self.config.cruise_speed,
        );
        self.vehicles.insert(id, vehicle);
        self.queues[approach.index()].push(id);
        self.stats.spawned += 1;
        debug!("Spawned vehicle {} on {}", id, approach);
        Some(id)
    }

    /// States of every approach's lead vehicle right now
    pub fn lead_snapshot(&self) -> LeadSnapshot {
        let mut leads = LeadSnapshot::new();
        for queue in &self.queues {
            let state = queue
                .lead()
                .and_then(|id| self.vehicles.get(&id))
                .map(|vehicle| vehicle.state);
            leads.record(queue.approach, state);
        }
        leads
    }

    /// Main simulation tick
    pub fn tick(&mut self) {
        self.stats.ticks += 1;

        // Contenders are judged on their state at the start of the tick
        let leads = self.lead_snapshot();

        for approach in Approach::ALL {
            let queue = &mut self.queues[approach.index()];
            let departed = match &mut self.rng {
                Some(rng) => queue.advance(
                    &mut self.vehicles,
                    &self.arbiter,
                    &leads,
                    &self.config,
                    rng,
                ),
                None => queue.advance(
                    &mut self.vehicles,
                    &self.arbiter,
                    &leads,
                    &self.config,
                    &mut rand::rng(),
                ),
            };

            if let Some(id) = departed {
                self.arbiter.admit(id);
                self.stats.departed += 1;
            }
        }

        for vehicle in self.arbiter.advance_transit(&mut self.vehicles, &self.config) {
            self.stats.record_retirement(&vehicle);
        }

        if self.config.check_invariants {
            if let Err(err) = self.check_invariants() {
                panic!(
                    "Simulation invariant violated at tick {}: {:#}",
                    self.stats.ticks, err
                );
            }
        }
    }

    /// Every live vehicle, queued vehicles first (by approach, lead first),
    /// then those crossing the junction
    pub fn renderables(&self) -> impl Iterator<Item = Renderable> + '_ {
        self.queues
            .iter()
            .flat_map(|queue| queue.ids())
            .chain(self.arbiter.transit().iter().copied())
            .filter_map(|id| self.vehicles.get(&id))
            .map(Renderable::from)
    }

    /// Audit membership, ordering and kinematic invariants
    pub fn check_invariants(&self) -> Result<()> {
        let mut memberships: HashMap<VehicleId, usize> = HashMap::new();

        for queue in &self.queues {
            let mut ahead: Option<&SimVehicle> = None;
            for id in queue.ids() {
                *memberships.entry(id).or_default() += 1;
                let vehicle = self
                    .vehicles
                    .get(&id)
                    .with_context(|| format!("Queued vehicle {} missing from arena", id))?;

                ensure!(
                    vehicle.approach == queue.approach,
                    "Vehicle {} from {} queued on {}",
                    id,
                    vehicle.approach,
                    queue.approach
                );
                ensure!(
                    vehicle.state != VehicleState::Going,
                    "Vehicle {} is GOING but still queued on {}",
                    id,
                    queue.approach
                );
                if let Some(ahead) = ahead {
                    let gap = (ahead.distance_traveled - vehicle.distance_traveled).into_inner();
                    ensure!(
                        gap + SPACING_TOLERANCE >= self.config.safety_margin(),
                        "Vehicles {} and {} on {} are {:.2} apart",
                        ahead.id,
                        id,
                        queue.approach,
                        gap
                    );
                }
                ahead = Some(vehicle);
            }
        }

        for &id in self.arbiter.transit() {
            *memberships.entry(id).or_default() += 1;
            let vehicle = self
                .vehicles
                .get(&id)
                .with_context(|| format!("Transit vehicle {} missing from arena", id))?;
            ensure!(
                vehicle.state == VehicleState::Going,
                "Vehicle {} crossing in state {:?}",
                id,
                vehicle.state
            );
        }

        if let Some((id, count)) = memberships.iter().find(|(_, count)| **count > 1) {
            bail!("Vehicle {} belongs to {} containers", id, count);
        }

        for (id, vehicle) in &self.vehicles {
            if !memberships.contains_key(id) {
                bail!("Vehicle {} is in neither a queue nor the junction", id);
            }
            ensure!(
                vehicle.speed.is_finite() && vehicle.speed >= 0.0,
                "Vehicle {} has invalid speed {}",
                id,
                vehicle.speed
            );
        }

        Ok(())
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Four-Way Stop Summary ===");
        println!(
            "Tick: {} ({:.1}s)",
            self.stats.ticks,
            self.stats.ticks as f32 / self.config.ticks_per_second as f32
        );
        println!(
            "Vehicles: {} (queued {}, in junction {})",
            self.vehicle_count(),
            self.queued_count(),
            self.arbiter.len()
        );
        println!(
            "Spawned: {}, Departed: {}, Retired: {}",
            self.stats.spawned, self.stats.departed, self.stats.retired
        );
        println!();

        println!("--- Approaches ---");
        for queue in &self.queues {
            let lead = queue
                .lead()
                .and_then(|id| self.vehicles.get(&id))
                .map(|vehicle| {
                    format!(
                        "{:?} (timer {}, waits {})",
                        vehicle.state, vehicle.stop_timer, vehicle.wait_count
                    )
                })
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<5}: queued={}, lead={}",
                queue.approach.label(),
                queue.len(),
                lead
            );
        }

        if !self.arbiter.is_empty() {
            println!("--- In Junction ---");
            for vehicle in self
                .arbiter
                .transit()
                .iter()
                .filter_map(|id| self.vehicles.get(id))
            {
                println!(
                    "  Vehicle {}: from {}, turn {:?}, position=({:.1}, {:.1})",
                    vehicle.id,
                    vehicle.approach,
                    vehicle.turn,
                    vehicle.position.x,
                    vehicle.position.y
                );
            }
        }
    }

    /// Draw a visual map of the junction in the terminal
    pub fn draw_map(&self) {
        // World units per character
        let scale = 20.0;
        let bounds = self.config.exit_bounds().expanded(scale * 6.0);
        let width = ((bounds.max.x - bounds.min.x) / scale).ceil() as usize;
        let height = ((bounds.max.y - bounds.min.y) / scale).ceil() as usize;
        let junction = self.config.junction;

        let mut grid = vec![vec![' '; width]; height];

        // Roads run through the junction along both axes
        for (row, line) in grid.iter_mut().enumerate() {
            for (col, cell) in line.iter_mut().enumerate() {
                let x = bounds.min.x + (col as f32 + 0.5) * scale;
                let y = bounds.min.y + (row as f32 + 0.5) * scale;
                let on_vertical = x >= junction.min.x && x <= junction.max.x;
                let on_horizontal = y >= junction.min.y && y <= junction.max.y;
                *cell = match (on_vertical, on_horizontal) {
                    (true, true) => '+',
                    (true, false) | (false, true) => '·',
                    (false, false) => ' ',
                };
            }
        }

        let to_grid = |position: &Position| -> Option<(usize, usize)> {
            let col = ((position.x - bounds.min.x) / scale).floor();
            let row = ((position.y - bounds.min.y) / scale).floor();
            if col < 0.0 || row < 0.0 || col >= width as f32 || row >= height as f32 {
                return None;
            }
            Some((row as usize, col as usize))
        };

        // Draw vehicles
        for renderable in self.renderables() {
            if let Some((row, col)) = to_grid(&renderable.position) {
                grid[row][col] = renderable.state.map_symbol();
            }
        }

        println!("\n=== Junction Map ===");
        println!("Legend: I=Idle, C=Checking, W=Waiting, G=Going, +=Junction, ·=Road");
        println!();
        for row in &grid {
            let line: String = row.iter().collect();
            println!("{}", line);
        }
        println!();
    }
}
