//! Headless flight runner for scripted flights and CI verification.
//!
//! This crate flies skyship vehicles without graphics. It can be driven
//! interactively via JSON commands on stdin, or fly RON scenarios on its
//! own:
//!
//! - **Scripted flights**: A [`Scenario`] schedules commands over time and
//!   [`FlightRunner`] records [`FlightMetrics`]
//! - **Batch runs**: One scenario over many seeds in parallel
//! - **Determinism checks**: Same seed, same final state hash
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from controller (tick, set_burn_rate, query, etc.)
//! - **stdout**: State updates and responses (JSON)
//! - **stderr**: Debug logs (human-readable)
//!
//! See the [`protocol`] module for the command and response format.
//!
//! # Example
//!
//! ```bash
//! # Run interactively
//! echo '{"cmd":"tick","count":50}' | cargo run -p skyship_headless -- run --scenario hover_test
//!
//! # Fly a scenario once
//! cargo run -p skyship_headless -- fly --scenario assets/scenarios/overheat_run.ron --seed 7
//!
//! # Verify determinism
//! cargo run -p skyship_headless -- verify --scenario field_overload --runs 5
//! ```

pub mod batch;
pub mod flight_runner;
pub mod metrics;
pub mod protocol;
pub mod runner;
pub mod scenario;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults};
pub use flight_runner::FlightRunner;
pub use metrics::{BatchSummary, FlightMetrics, MetricsCollector};
pub use protocol::{Command, Response};
pub use runner::{HeadlessConfig, HeadlessRunner};
pub use scenario::{Scenario, ScenarioError, ScriptedCommand, VehicleSource};
