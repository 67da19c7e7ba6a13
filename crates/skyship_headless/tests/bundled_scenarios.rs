//! Flies the scenarios shipped in `assets/data/scenarios`.

use std::path::{Path, PathBuf};

use skyship_headless::{FlightRunner, Scenario};

fn scenario_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../assets/data/scenarios")
        .join(format!("{name}.ron"))
}

fn fly(name: &str, seed: u64) -> skyship_headless::FlightMetrics {
    let scenario = Scenario::load(scenario_path(name)).unwrap();
    FlightRunner::new(&scenario).unwrap().run(seed).unwrap()
}

#[test]
fn test_file_scenarios_match_builtins() {
    for name in ["hover_test", "overheat_run", "field_overload"] {
        let from_file = fly(name, 3);
        let builtin = FlightRunner::new(&Scenario::builtin(name).unwrap())
            .unwrap()
            .run(3)
            .unwrap();
        assert_eq!(from_file.ticks, builtin.ticks, "{name}");
        assert!(from_file.command_errors.is_empty(), "{name}: {:?}", from_file.command_errors);
    }
}

#[test]
fn test_hover_test_climbs_one_meter_per_second() {
    let metrics = fly("hover_test", 0);
    assert_eq!(metrics.ticks, 3000);
    // Five seconds at 1 m/s from 100 m.
    assert!((metrics.max_altitude - 105.0).abs() < 0.05);
    assert!((metrics.min_altitude - 100.0).abs() < 1e-9);
    assert!(metrics.max_speed_knots > 0.0);
    assert_eq!(metrics.samples.len(), 60);
}

#[test]
fn test_overheat_run_overheats_and_recovers() {
    let metrics = fly("overheat_run", 0);
    assert!(metrics.overheat_seconds > 0.0);
    assert!(metrics.peak_temperature.unwrap() > 100.0);
    assert!(metrics.overheat_seconds < metrics.duration_seconds);
    let end = metrics.final_telemetry.unwrap();
    assert!(!end.power_plants[0].is_overheating());
    assert!(end.power_plants[0].active);
}

#[test]
fn test_field_overload_is_seeded() {
    let a = fly("field_overload", 21);
    let b = fly("field_overload", 21);
    assert_eq!(a.final_state_hash, b.final_state_hash);
    assert!(a.peak_field_strength.is_some());
}

#[test]
fn test_hauler_cruise_runs_clean() {
    let metrics = fly("hauler_cruise", 0);
    assert!(metrics.command_errors.is_empty(), "{:?}", metrics.command_errors);
    assert!(!metrics.ended_disabled);
    assert_eq!(metrics.samples.len(), 90);
}
