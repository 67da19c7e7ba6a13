//! Batch flight runner.
//!
//! Flies one scenario with many seeds in parallel using rayon and collects
//! the per-flight metrics and a summary.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::flight_runner::FlightRunner;
use crate::metrics::{BatchSummary, FlightMetrics};
use crate::scenario::{Scenario, ScenarioError};

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario to fly (built-in name or RON path)
    pub scenario: String,
    /// Number of flights
    pub flight_count: u32,
    /// Worker threads (0 = rayon default)
    pub parallel_flights: u32,
    /// Output directory for results
    pub output_dir: PathBuf,
    /// Seed of the first flight; flight `i` uses `seed_start + i`
    pub seed_start: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: "hover_test".to_string(),
            flight_count: 100,
            parallel_flights: 0,
            output_dir: PathBuf::from("batch_results"),
            seed_start: 0,
        }
    }
}

impl BatchConfig {
    /// Create a config with a scenario and flight count.
    #[must_use]
    pub fn new(scenario: &str, flight_count: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            flight_count,
            ..Default::default()
        }
    }

    /// Set output directory.
    #[must_use]
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set starting seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set worker thread count.
    #[must_use]
    pub const fn with_parallelism(mut self, threads: u32) -> Self {
        self.parallel_flights = threads;
        self
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual flight metrics, ordered by seed
    pub flights: Vec<FlightMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Wall-clock runtime
    pub duration_seconds: f64,
    /// Flights that failed to run
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to a pretty JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from a JSON file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }

    /// Default results file inside the configured output directory.
    #[must_use]
    pub fn default_path(&self) -> PathBuf {
        let name = Path::new(&self.config.scenario)
            .file_stem()
            .map_or_else(|| "batch".into(), |s| s.to_string_lossy());
        self.config
            .output_dir
            .join(format!("{name}_{}.json", self.config.seed_start))
    }
}

/// A flight that could not be run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchError {
    /// Flight index
    pub flight_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Progress tracking for batch runs
#[derive(Debug)]
pub struct BatchProgress {
    /// Total flights
    pub total: u32,
    completed: AtomicU32,
    disabled: AtomicU32,
    start_time: Instant,
}

impl BatchProgress {
    /// Create new progress tracker
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self {
            total,
            completed: AtomicU32::new(0),
            disabled: AtomicU32::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a completed flight
    pub fn record_completion(&self, ended_disabled: bool) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        if ended_disabled {
            self.disabled.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Completed flight count
    #[must_use]
    pub fn current(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Flights so far that ended disabled
    #[must_use]
    pub fn disabled(&self) -> u32 {
        self.disabled.load(Ordering::Relaxed)
    }

    /// Completion percentage
    #[must_use]
    pub fn percentage(&self) -> f64 {
        f64::from(self.current()) / f64::from(self.total.max(1)) * 100.0
    }

    /// Estimated time remaining
    #[must_use]
    pub fn eta(&self) -> Duration {
        let completed = self.current();
        if completed == 0 {
            return Duration::from_secs(0);
        }
        let per_flight = self.start_time.elapsed().as_secs_f64() / f64::from(completed);
        let remaining = self.total.saturating_sub(completed);
        Duration::from_secs_f64(per_flight * f64::from(remaining))
    }

    /// Log progress
    pub fn report(&self) {
        let eta = self.eta();
        info!(
            completed = self.current(),
            total = self.total,
            disabled = self.disabled(),
            "Batch progress {:.1}% (ETA {}m {}s)",
            self.percentage(),
            eta.as_secs() / 60,
            eta.as_secs() % 60
        );
    }
}

/// Run a batch of flights.
///
/// Fails only if the scenario itself cannot be prepared; individual
/// flight failures are collected in [`BatchResults::errors`].
pub fn run_batch(config: BatchConfig) -> Result<BatchResults, ScenarioError> {
    let start = Instant::now();
    let scenario = Scenario::resolve(&config.scenario)?;
    let runner = FlightRunner::new(&scenario)?;
    let progress = BatchProgress::new(config.flight_count);

    info!(
        "Starting batch run: {} flights of '{}'",
        config.flight_count, scenario.name
    );

    let fly = || -> Vec<Result<FlightMetrics, BatchError>> {
        (0..config.flight_count)
            .into_par_iter()
            .map(|i| {
                let seed = config.seed_start.wrapping_add(u64::from(i));
                match runner.run(seed) {
                    Ok(metrics) => {
                        progress.record_completion(metrics.ended_disabled);
                        let completed = progress.current();
                        if completed % 10 == 0 {
                            debug!("Progress: {}/{}", completed, config.flight_count);
                        }
                        if completed % 100 == 0 {
                            progress.report();
                        }
                        Ok(metrics)
                    }
                    Err(e) => {
                        warn!("Flight {} failed: {}", i, e);
                        Err(BatchError {
                            flight_index: i,
                            seed,
                            message: e.to_string(),
                        })
                    }
                }
            })
            .collect()
    };

    let results = if config.parallel_flights > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_flights as usize)
            .build()
        {
            Ok(pool) => pool.install(fly),
            Err(e) => {
                warn!("Could not build thread pool ({}), using the global pool", e);
                fly()
            }
        }
    } else {
        fly()
    };

    let (flights, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let flights: Vec<FlightMetrics> = flights.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_flights(&flights);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} flights in {:.1}s ({:.1} flights/sec)",
        flights.len(),
        duration_seconds,
        flights.len() as f64 / duration_seconds.max(f64::EPSILON)
    );

    Ok(BatchResults {
        config,
        flights,
        summary,
        duration_seconds,
        errors,
    })
}

/// Fly the same seed `runs` times and check every final hash matches.
pub fn verify_determinism(scenario: &str, seed: u64, runs: u32) -> Result<bool, ScenarioError> {
    let runner = FlightRunner::new(&Scenario::resolve(scenario)?)?;
    let mut expected = None;
    for run in 0..runs {
        let hash = runner.run(seed)?.final_state_hash;
        match expected {
            None => expected = Some(hash),
            Some(first) if first != hash => {
                warn!(run, first, hash, "Flight diverged");
                return Ok(false);
            }
            Some(_) => {}
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_scenario_file(dir: &Path) -> PathBuf {
        let path = dir.join("short.ron");
        let ron = r#"Scenario(
            name: "short",
            vehicle: Inline(VehicleData(
                id: "frigate",
                hull: HullData(mass_tons: 30.0),
                power_plants: [PowerPlantData(name: "main", max_power_per_second: 200.0)],
                lift: Some(LiftUnitData(name: "lift", minimum_power_per_second: 30.0)),
            )),
            duration_seconds: 2.0,
            script: [
                (at_seconds: 1.0, command: SetKnotsAhead(plant: 0, knots: 20.0)),
            ],
        )"#;
        std::fs::write(&path, ron).unwrap();
        path
    }

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert_eq!(config.flight_count, 100);
        assert_eq!(config.scenario, "hover_test");
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new("custom_scenario", 500)
            .with_output(PathBuf::from("/tmp/results"))
            .with_seed(12345)
            .with_parallelism(2);

        assert_eq!(config.scenario, "custom_scenario");
        assert_eq!(config.flight_count, 500);
        assert_eq!(config.seed_start, 12345);
        assert_eq!(config.parallel_flights, 2);
    }

    #[test]
    fn test_progress_tracking() {
        let progress = BatchProgress::new(100);
        assert_eq!(progress.current(), 0);
        assert_eq!(progress.percentage(), 0.0);

        progress.record_completion(false);
        progress.record_completion(true);
        progress.record_completion(false);

        assert_eq!(progress.current(), 3);
        assert_eq!(progress.disabled(), 1);
        assert!((progress.percentage() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_run_batch_small() {
        let dir = tempfile::tempdir().unwrap();
        let path = short_scenario_file(dir.path());
        let config = BatchConfig::new(&path.display().to_string(), 6)
            .with_seed(10)
            .with_parallelism(2);
        let results = run_batch(config).unwrap();

        assert_eq!(results.flights.len(), 6);
        assert!(results.errors.is_empty());
        assert_eq!(results.summary.total_flights, 6);
        let seeds: Vec<u64> = results.flights.iter().map(|f| f.seed).collect();
        assert_eq!(seeds, vec![10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn test_unknown_scenario_fails() {
        assert!(matches!(
            run_batch(BatchConfig::new("no_such_scenario", 1)),
            Err(ScenarioError::UnknownScenario(_))
        ));
    }

    #[test]
    fn test_verify_determinism() {
        let dir = tempfile::tempdir().unwrap();
        let path = short_scenario_file(dir.path());
        assert!(verify_determinism(&path.display().to_string(), 12345, 3).unwrap());
    }

    #[test]
    fn test_batch_results_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = short_scenario_file(dir.path());
        let config = BatchConfig::new(&path.display().to_string(), 3)
            .with_output(dir.path().join("out"));
        let results = run_batch(config).unwrap();

        let out = results.default_path();
        results.save(&out).unwrap();
        assert!(out.exists());
        assert!(out.ends_with("short_0.json"));

        let loaded = BatchResults::load(&out).unwrap();
        assert_eq!(loaded.flights.len(), 3);
        let hashes = |r: &BatchResults| -> Vec<u64> {
            r.flights.iter().map(|f| f.final_state_hash).collect()
        };
        assert_eq!(hashes(&loaded), hashes(&results));
        assert_eq!(loaded.config, results.config);
    }
}
