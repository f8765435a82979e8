//! Run statistics for the intersection simulation

use log::info;

use super::vehicle::SimVehicle;

/// Counters accumulated over a simulation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimStats {
    pub ticks: u64,
    pub spawned: u32,
    /// Spawn requests dropped because the lane origin was occupied
    pub rejected_spawns: u32,
    /// Vehicles that were cleared to cross
    pub departed: u32,
    pub retired: u32,
    /// Sum of `wait_count` over retired vehicles
    pub total_waits: u64,
    /// Largest `wait_count` of any retired vehicle
    pub max_waits: u32,
}

impl SimStats {
    pub fn record_retirement(&mut self, vehicle: &SimVehicle) {
        self.retired += 1;
        self.total_waits += u64::from(vehicle.wait_count);
        self.max_waits = self.max_waits.max(vehicle.wait_count);
    }

    /// Vehicles cleared per simulated minute at the given tick rate
    pub fn throughput_per_minute(&self, ticks_per_second: u32) -> f32 {
        if self.ticks == 0 {
            return 0.0;
        }
        let minutes = self.ticks as f32 / ticks_per_second as f32 / 60.0;
        self.departed as f32 / minutes
    }

    /// Log the end-of-run report
    pub fn log_report(&self, in_junction: usize, queued: usize, ticks_per_second: u32) {
        info!("=== SIMULATION COMPLETE ===");
        info!(
            "Elapsed ticks: {} ({:.1}s simulated)",
            self.ticks,
            self.ticks as f32 / ticks_per_second as f32
        );
        info!("Total vehicles spawned: {}", self.spawned);
        info!("Rejected spawns: {}", self.rejected_spawns);
        info!("Total vehicles departed: {}", self.departed);
        info!("Total vehicles retired: {}", self.retired);
        info!("Vehicles in junction: {}", in_junction);
        info!("Vehicles queued: {}", queued);
        info!("Total waits: {}", self.total_waits);
        info!("Longest wait streak: {}", self.max_waits);
        info!(
            "Throughput: {:.1} vehicles/min",
            self.throughput_per_minute(ticks_per_second)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::SimConfig;
    use crate::simulation::types::{Approach, SimId, VehicleId};

    #[test]
    fn test_retirement_accumulates_waits() {
        let config = SimConfig::default();
        let mut stats = SimStats::default();
        let mut vehicle = SimVehicle::new(
            VehicleId(SimId(0)),
            Approach::East,
            config.lane(Approach::East),
            config.cruise_speed,
        );
        vehicle.wait_count = 3;
        stats.record_retirement(&vehicle);
        vehicle.wait_count = 1;
        stats.record_retirement(&vehicle);

        assert_eq!(stats.retired, 2);
        assert_eq!(stats.total_waits, 4);
        assert_eq!(stats.max_waits, 3);
    }

    #[test]
    fn test_throughput() {
        let stats = SimStats {
            ticks: 1800,
            departed: 6,
            ..SimStats::default()
        };
        assert!((stats.throughput_per_minute(30) - 6.0).abs() < 1e-4);
        assert_eq!(SimStats::default().throughput_per_minute(30), 0.0);
    }
}
