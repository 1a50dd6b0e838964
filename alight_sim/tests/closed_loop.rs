// alight_sim/tests/closed_loop.rs

use alight_sim::prelude::*;
use alight_sim::simulation::runner::collect_scenarios;
use std::path::Path;

fn static_scenario(seed: u64) -> ScenarioConfig {
    let mut config = ScenarioConfig::default();
    config.simulation.seed = Some(seed);
    config.simulation.duration_seconds = 120.0;
    config.detector.noise_std = 0.01;
    config.detector.dropout_probability = 0.0;
    config
}

#[test]
fn static_target_is_landed_on() {
    let report = run_scenario("static", &static_scenario(42)).unwrap();

    assert!(report.landed(), "{report}");
    assert!(report.touchdown_error.unwrap() < 0.5, "{report}");

    let states: Vec<MissionState> = report.transitions.iter().map(|t| t.state).collect();
    assert_eq!(
        states,
        vec![
            MissionState::Discover,
            MissionState::Tracking,
            MissionState::Landing,
            MissionState::MissionAccomplished,
        ]
    );
}

#[test]
fn landing_waits_for_minimum_track_time() {
    let config = static_scenario(3);
    let report = run_scenario("static", &config).unwrap();

    let time_of = |state| {
        report
            .transitions
            .iter()
            .find(|t| t.state == state)
            .map(|t| t.time)
            .unwrap()
    };
    let tracked_for = time_of(MissionState::Landing) - time_of(MissionState::Tracking);
    assert!(tracked_for >= config.mission.tracking.min_track_time - 1e-9);
}

#[test]
fn same_seed_same_report() {
    let mut config = static_scenario(11);
    config.detector.dropout_probability = 0.05;
    let a = run_scenario("a", &config).unwrap();
    let b = run_scenario("a", &config).unwrap();
    assert_eq!(a, b);
}

#[test]
fn target_never_seen_keeps_discovering() {
    let mut config = static_scenario(1);
    config.simulation.duration_seconds = 10.0;
    config.target.start = [100.0, 0.0, 0.0];
    let report = run_scenario("far", &config).unwrap();

    assert!(!report.landed());
    assert_eq!(report.final_state, MissionState::Discover);
    assert_eq!(report.time_to_land, None);
}

#[test]
fn shipped_scenarios_all_load() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../assets/scenarios");
    let files = collect_scenarios(&dir).unwrap();
    assert!(files.len() >= 2);
    for file in files {
        let config = ScenarioConfig::load(&file).unwrap();
        assert!(config.to_toml().unwrap().contains("[mission"));
    }
}
