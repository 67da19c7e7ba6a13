//! Flight metrics collection.
//!
//! A [`MetricsCollector`] watches one vehicle tick by tick and produces a
//! [`FlightMetrics`] record; [`BatchSummary`] aggregates many of them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use skyship_core::components::{Subsystem, VehicleId};
use skyship_core::events::{TickEvents, VehicleEvent, VehicleTelemetry};

/// Complete metrics for a single flight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Vehicle type flown.
    pub vehicle: String,
    /// Random seed used.
    pub seed: u64,
    /// Ticks simulated.
    pub ticks: u64,
    /// Simulated time (s).
    pub duration_seconds: f64,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
    /// Whether the flight ended early because every subsystem failed.
    pub ended_disabled: bool,

    // === Flight envelope ===
    /// Highest altitude reached (m).
    pub max_altitude: f64,
    /// Lowest altitude reached (m).
    pub min_altitude: f64,
    /// Highest signed forward speed (kt).
    pub max_speed_knots: f64,
    /// Highest climb rate commanded by the lift (m/s).
    pub max_vertical_velocity: f64,

    // === Stress ===
    /// Hottest any thermal plant got.
    pub peak_temperature: Option<f64>,
    /// Time with at least one plant overheating (s).
    pub overheat_seconds: f64,
    /// Strongest field as percent of weight.
    pub peak_field_strength: Option<f64>,
    /// Time with the lift field overloaded (s).
    pub overload_seconds: f64,

    // === Damage ===
    /// Damage points by subsystem (`power_plant[0]`, `lift`).
    pub damage: BTreeMap<String, u64>,
    /// Subsystem failures in order.
    pub failures: Vec<FailureRecord>,
    /// Script commands the simulation rejected.
    pub command_errors: Vec<CommandErrorRecord>,

    /// Periodic samples.
    pub samples: Vec<FlightSample>,
    /// Telemetry at the end of the flight.
    pub final_telemetry: Option<VehicleTelemetry>,
}

impl FlightMetrics {
    /// Create a new flight metrics instance.
    #[must_use]
    pub fn new(scenario: impl Into<String>, vehicle: impl Into<String>, seed: u64) -> Self {
        Self {
            scenario: scenario.into(),
            vehicle: vehicle.into(),
            seed,
            min_altitude: f64::INFINITY,
            max_altitude: f64::NEG_INFINITY,
            max_speed_knots: f64::NEG_INFINITY,
            max_vertical_velocity: f64::NEG_INFINITY,
            ..Default::default()
        }
    }

    /// Total damage points over every subsystem.
    #[must_use]
    pub fn total_damage(&self) -> u64 {
        self.damage.values().sum()
    }

    /// Tick at which `subsystem` failed, if it did.
    #[must_use]
    pub fn failure_tick(&self, subsystem: Subsystem) -> Option<u64> {
        let name = subsystem.to_string();
        self.failures
            .iter()
            .find(|f| f.subsystem == name)
            .map(|f| f.tick)
    }
}

/// A subsystem failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Tick of the failure.
    pub tick: u64,
    /// Failed subsystem.
    pub subsystem: String,
}

/// A scripted command the simulation refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandErrorRecord {
    /// Tick the command was due.
    pub tick: u64,
    /// Command name.
    pub command: String,
    /// Error message.
    pub message: String,
}

/// Periodic flight snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightSample {
    /// Tick of the sample.
    pub tick: u64,
    /// Height (m).
    pub altitude: f64,
    /// Signed forward speed (kt).
    pub speed_knots: f64,
    /// Lift vertical velocity (m/s).
    pub vertical_velocity: f64,
    /// Sum of enabled plant outputs.
    pub total_power_output: f64,
    /// Net thrust (N).
    pub total_thrust_newtons: f64,
}

/// Summary statistics across multiple flights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total flights.
    pub total_flights: u32,
    /// Flights that ended with every subsystem failed.
    pub disabled_flights: u32,
    /// Average flight length in ticks.
    pub avg_ticks: f64,
    /// Average of each flight's highest altitude (m).
    pub avg_max_altitude: f64,
    /// Lowest altitude over all flights (m).
    pub min_altitude: f64,
    /// Average of each flight's top speed (kt).
    pub avg_max_speed_knots: f64,
    /// Average time overheating (s).
    pub avg_overheat_seconds: f64,
    /// Average time overloaded (s).
    pub avg_overload_seconds: f64,
    /// Average damage points per flight.
    pub avg_total_damage: f64,
    /// Failure count by subsystem.
    pub failures_by_subsystem: BTreeMap<String, u32>,
    /// Distinct final state hashes.
    pub distinct_final_hashes: u32,
}

impl BatchSummary {
    /// Calculate summary from a list of flight metrics.
    #[must_use]
    pub fn from_flights(flights: &[FlightMetrics]) -> Self {
        if flights.is_empty() {
            return Self::default();
        }

        let count = flights.len() as f64;
        let average = |f: fn(&FlightMetrics) -> f64| flights.iter().map(f).sum::<f64>() / count;

        let mut summary = Self {
            total_flights: flights.len() as u32,
            disabled_flights: flights.iter().filter(|f| f.ended_disabled).count() as u32,
            avg_ticks: average(|f| f.ticks as f64),
            avg_max_altitude: average(|f| f.max_altitude),
            min_altitude: flights
                .iter()
                .map(|f| f.min_altitude)
                .fold(f64::INFINITY, f64::min),
            avg_max_speed_knots: average(|f| f.max_speed_knots),
            avg_overheat_seconds: average(|f| f.overheat_seconds),
            avg_overload_seconds: average(|f| f.overload_seconds),
            avg_total_damage: average(|f| f.total_damage() as f64),
            ..Default::default()
        };

        for failure in flights.iter().flat_map(|f| &f.failures) {
            *summary
                .failures_by_subsystem
                .entry(failure.subsystem.clone())
                .or_default() += 1;
        }

        let mut hashes: Vec<u64> = flights.iter().map(|f| f.final_state_hash).collect();
        hashes.sort_unstable();
        hashes.dedup();
        summary.distinct_final_hashes = hashes.len() as u32;

        summary
    }

    /// Fraction of flights in which `subsystem` failed.
    #[must_use]
    pub fn failure_rate(&self, subsystem: &str) -> f64 {
        let failures = self.failures_by_subsystem.get(subsystem).copied().unwrap_or(0);
        f64::from(failures) / f64::from(self.total_flights.max(1))
    }
}

/// Metrics collector that tracks one vehicle during a flight.
#[derive(Debug)]
pub struct MetricsCollector {
    metrics: FlightMetrics,
    vehicle_id: VehicleId,
    sample_every: u64,
}

impl MetricsCollector {
    /// Create a collector sampling every `sample_every` ticks (0 = never).
    #[must_use]
    pub fn new(metrics: FlightMetrics, vehicle_id: VehicleId, sample_every: u64) -> Self {
        Self {
            metrics,
            vehicle_id,
            sample_every,
        }
    }

    /// Record a scripted command the simulation refused.
    pub fn record_command_error(&mut self, tick: u64, command: &str, message: String) {
        self.metrics.command_errors.push(CommandErrorRecord {
            tick,
            command: command.to_string(),
            message,
        });
    }

    /// Fold in one tick of events and the telemetry after it.
    pub fn observe(&mut self, tick: u64, dt: f64, events: &TickEvents, telemetry: &VehicleTelemetry) {
        let m = &mut self.metrics;

        for event in events.for_vehicle(self.vehicle_id) {
            match *event {
                VehicleEvent::Damaged { subsystem, amount } => {
                    *m.damage.entry(subsystem.to_string()).or_default() += u64::from(amount);
                }
                VehicleEvent::PowerPlantFailure { plant } => m.failures.push(FailureRecord {
                    tick,
                    subsystem: Subsystem::PowerPlant(plant).to_string(),
                }),
                VehicleEvent::LiftFailure => m.failures.push(FailureRecord {
                    tick,
                    subsystem: Subsystem::Lift.to_string(),
                }),
                _ => {}
            }
        }

        let altitude = telemetry.position.y;
        m.max_altitude = m.max_altitude.max(altitude);
        m.min_altitude = m.min_altitude.min(altitude);
        m.max_speed_knots = m.max_speed_knots.max(telemetry.current_speed_knots);

        let vertical_velocity = telemetry
            .lift
            .as_ref()
            .map_or(0.0, |l| l.state.vertical_velocity_mps);
        m.max_vertical_velocity = m.max_vertical_velocity.max(vertical_velocity);

        for heat in telemetry.power_plants.iter().filter_map(|p| p.heat) {
            let peak = m.peak_temperature.get_or_insert(heat.current_temperature);
            *peak = peak.max(heat.current_temperature);
        }
        if telemetry.power_plants.iter().any(|p| p.is_overheating()) {
            m.overheat_seconds += dt;
        }

        if let Some(lift) = &telemetry.lift {
            if let Some(field) = lift.field {
                let peak = m.peak_field_strength.get_or_insert(field.field_strength_percent);
                *peak = peak.max(field.field_strength_percent);
            }
            if lift.is_field_overloaded() {
                m.overload_seconds += dt;
            }
        }

        if self.sample_every > 0 && tick % self.sample_every == 0 {
            m.samples.push(FlightSample {
                tick,
                altitude,
                speed_knots: telemetry.current_speed_knots,
                vertical_velocity,
                total_power_output: telemetry.total_power_output,
                total_thrust_newtons: telemetry.total_thrust_newtons,
            });
        }
    }

    /// Close the record.
    #[must_use]
    pub fn finish(
        mut self,
        ticks: u64,
        duration_seconds: f64,
        final_state_hash: u64,
        final_telemetry: Option<VehicleTelemetry>,
    ) -> FlightMetrics {
        let m = &mut self.metrics;
        m.ticks = ticks;
        m.duration_seconds = duration_seconds;
        m.final_state_hash = final_state_hash;
        m.ended_disabled = final_telemetry.as_ref().is_some_and(VehicleTelemetry::is_disabled);
        m.final_telemetry = final_telemetry;

        // No tick observed: report the envelope as empty rather than infinite
        if !m.max_altitude.is_finite() {
            m.max_altitude = 0.0;
            m.min_altitude = 0.0;
            m.max_speed_knots = 0.0;
            m.max_vertical_velocity = 0.0;
        }
        self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(seed: u64, max_altitude: f64, failures: &[&str]) -> FlightMetrics {
        let mut metrics = FlightMetrics::new("test", "frigate", seed);
        metrics.ticks = 100;
        metrics.max_altitude = max_altitude;
        metrics.min_altitude = max_altitude - 10.0;
        metrics.max_speed_knots = 5.0;
        metrics.final_state_hash = seed % 2;
        metrics.damage.insert("lift".to_string(), 4);
        metrics.failures = failures
            .iter()
            .map(|s| FailureRecord {
                tick: 50,
                subsystem: (*s).to_string(),
            })
            .collect();
        metrics
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_flights(&[]);
        assert_eq!(summary.total_flights, 0);
        assert_eq!(summary.failure_rate("lift"), 0.0);
    }

    #[test]
    fn test_summary_aggregates() {
        let flights = vec![
            flight(0, 110.0, &["lift"]),
            flight(1, 130.0, &[]),
            flight(2, 120.0, &["lift", "power_plant[0]"]),
        ];
        let summary = BatchSummary::from_flights(&flights);

        assert_eq!(summary.total_flights, 3);
        assert!((summary.avg_max_altitude - 120.0).abs() < 1e-9);
        assert_eq!(summary.min_altitude, 100.0);
        assert!((summary.avg_total_damage - 4.0).abs() < 1e-9);
        assert_eq!(summary.failures_by_subsystem["lift"], 2);
        assert!((summary.failure_rate("lift") - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.distinct_final_hashes, 2);
    }

    #[test]
    fn test_failure_tick_lookup() {
        let metrics = flight(0, 100.0, &["lift"]);
        assert_eq!(metrics.failure_tick(Subsystem::Lift), Some(50));
        assert_eq!(metrics.failure_tick(Subsystem::PowerPlant(0)), None);
    }

    #[test]
    fn test_finish_without_ticks_is_finite() {
        let collector = MetricsCollector::new(FlightMetrics::new("s", "v", 0), 1, 10);
        let metrics = collector.finish(0, 0.0, 0, None);
        assert_eq!(metrics.max_altitude, 0.0);
        assert_eq!(metrics.min_altitude, 0.0);
        assert!(!metrics.ended_disabled);
    }
}
