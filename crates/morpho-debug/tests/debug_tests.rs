//! Integration tests for morpho-debug.

use std::thread;

use morpho_debug::{
    tick_with_hooks, ConvergenceMonitor, DebugMarkers, InspectionHook, MonitorConfig, MonitorStatus,
    StateSnapshot, TelemetryHook,
};
use morpho_math::Vec3;
use morpho_mesh::generators::single_tet;
use morpho_solver::{
    Constraint, ConvergenceStats, SimulationConfig, SoftBody, SoftBodyBuilder, TickReport, VertexSelector,
};
use morpho_telemetry::events::EventKind;

fn resting_body() -> SoftBody {
    let config = SimulationConfig {
        gravity_enabled: false,
        floor_enabled: false,
        ..Default::default()
    };
    SoftBodyBuilder::new(config)
        .initialize(&single_tet(Vec3::ZERO, 1.0), None)
        .unwrap()
}

fn falling_body() -> SoftBody {
    SoftBodyBuilder::new(SimulationConfig::default())
        .initialize(&single_tet(Vec3::new(0.0, 1.0, 0.0), 1.0), None)
        .unwrap()
}

fn stats(displacement: f32, velocity_delta: f32) -> ConvergenceStats {
    ConvergenceStats {
        max_displacement: displacement,
        mean_displacement: displacement,
        max_velocity_delta: velocity_delta,
        mean_velocity_delta: velocity_delta,
    }
}

// ─── Hook Tests ───────────────────────────────────────────────

#[test]
fn telemetry_hook_collects_tick_events() {
    let mut body = falling_body();
    let mut hooks: Vec<Box<dyn InspectionHook>> = vec![Box::new(TelemetryHook::new())];
    tick_with_hooks(&mut body, &mut hooks);

    let mut hook = TelemetryHook::new().with_energy();
    hook.on_tick_begin(body.tick_count(), body.sim_time());
    let report = body.tick();
    hook.on_tick_end(&report, &body);

    let events = hook.drain_events();
    assert!(matches!(events[0].kind, EventKind::TickBegin { .. }));
    assert!(events.iter().any(|e| matches!(e.kind, EventKind::Convergence { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e.kind, EventKind::TickEnd { success: true, .. })));
    assert!(events.iter().any(|e| matches!(e.kind, EventKind::Energy { kinetic } if kinetic > 0.0)));
    assert!(hook.drain_events().is_empty());
}

#[test]
fn failed_tick_becomes_geometry_failure() {
    let report = TickReport {
        tick: 7,
        success: false,
        bad_tets: 3,
        ..Default::default()
    };
    let events = TelemetryHook::events_for(&report);
    assert!(events
        .iter()
        .any(|e| e.kind == EventKind::GeometryFailure { bad_tets: 3 }));
    assert!(!events.iter().any(|e| matches!(e.kind, EventKind::Convergence { .. })));
    assert!(events.last().unwrap().is_failure());
}

#[test]
fn constraint_transitions_reported() {
    let mut body = resting_body();
    body.add_constraint(Constraint::lock(0.0, 0.0, VertexSelector::All)).unwrap();
    let report = body.tick();
    let events = TelemetryHook::events_for(&report);
    assert!(events.iter().any(|e| e.kind
        == EventKind::ConstraintTransition {
            activated: 1,
            ended: 1
        }));
}

#[test]
fn default_hook_methods_are_noops() {
    struct Named;
    impl InspectionHook for Named {
        fn name(&self) -> &str {
            "named"
        }
    }
    let mut body = resting_body();
    let mut hooks: Vec<Box<dyn InspectionHook>> = vec![Box::new(Named)];
    let report = tick_with_hooks(&mut body, &mut hooks);
    assert!(report.success);
    hooks[0].on_simulation_end();
    assert_eq!(hooks[0].name(), "named");
}

// ─── Monitor Tests ────────────────────────────────────────────

#[test]
fn monitor_detects_steady_state() {
    let mut monitor = ConvergenceMonitor::new(MonitorConfig {
        steady_ticks: 5,
        ..Default::default()
    });
    for _ in 0..4 {
        assert_eq!(monitor.observe(&stats(0.0, 0.0)), MonitorStatus::Running);
    }
    assert_eq!(monitor.observe(&stats(0.0, 0.0)), MonitorStatus::SteadyState);
    assert!(monitor.should_stop());

    // Motion resumes.
    assert_eq!(monitor.observe(&stats(1.0, 0.0)), MonitorStatus::Running);
}

#[test]
fn monitor_as_hook_on_resting_body() {
    let mut body = resting_body();
    let mut monitor = ConvergenceMonitor::new(MonitorConfig {
        steady_ticks: 10,
        ..Default::default()
    });
    for _ in 0..10 {
        let report = body.tick();
        monitor.on_tick_end(&report, &body);
    }
    assert_eq!(monitor.status(), MonitorStatus::SteadyState);
    assert_eq!(monitor.observed(), 10);
}

#[test]
fn monitor_flags_non_finite_immediately() {
    let mut monitor = ConvergenceMonitor::default();
    assert_eq!(monitor.observe(&stats(f32::NAN, 0.0)), MonitorStatus::Diverged);
    // Terminal until reset.
    assert_eq!(monitor.observe(&stats(0.0, 0.0)), MonitorStatus::Diverged);
    monitor.reset();
    assert_eq!(monitor.status(), MonitorStatus::Running);
    assert_eq!(monitor.observed(), 0);
}

#[test]
fn monitor_needs_sustained_runaway() {
    let mut monitor = ConvergenceMonitor::new(MonitorConfig {
        very_big: 10.0,
        divergence_ticks: 3,
        ..Default::default()
    });
    assert_eq!(monitor.observe(&stats(100.0, 0.0)), MonitorStatus::Running);
    assert_eq!(monitor.observe(&stats(100.0, 0.0)), MonitorStatus::Running);
    // A calm tick breaks the streak.
    assert_eq!(monitor.observe(&stats(1.0, 0.0)), MonitorStatus::Running);
    monitor.observe(&stats(0.0, 100.0));
    monitor.observe(&stats(0.0, 100.0));
    assert_eq!(monitor.observe(&stats(0.0, 100.0)), MonitorStatus::Diverged);
}

// ─── Snapshot Tests ───────────────────────────────────────────

#[test]
fn snapshot_captures_body() {
    let mut body = falling_body();
    body.add_constraint(Constraint::lock(0.0, 1.0, VertexSelector::Explicit(vec![2])))
        .unwrap();
    for _ in 0..5 {
        body.tick();
    }
    let snap = StateSnapshot::capture(&body);
    assert_eq!(snap.tick, 5);
    assert_eq!(snap.vertex_count, 4);
    assert_eq!(snap.positions.len(), 12);
    assert_eq!(snap.position_locks, vec![0, 0, 1, 0]);
    assert_eq!(snap.position(1), body.positions()[1]);
}

#[test]
fn snapshot_bytes_and_file_roundtrip() {
    let mut body = falling_body();
    body.tick();
    let snap = StateSnapshot::capture(&body);

    let bytes = snap.to_bytes().unwrap();
    assert_eq!(StateSnapshot::from_bytes(&bytes).unwrap(), snap);

    let path = std::env::temp_dir().join(format!("morpho_snapshot_{}.bin", std::process::id()));
    snap.save(&path).unwrap();
    let loaded = StateSnapshot::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded.max_position_delta(&snap), Some(0.0));
}

#[test]
fn snapshot_rejects_garbage() {
    assert!(StateSnapshot::from_bytes(&[1, 2, 3]).is_err());

    let mut snap = StateSnapshot::capture(&resting_body());
    snap.velocities.pop();
    let bytes = snap.to_bytes().unwrap();
    assert!(StateSnapshot::from_bytes(&bytes).is_err());
}

#[test]
fn snapshot_delta_tracks_motion() {
    let mut body = falling_body();
    let before = StateSnapshot::capture(&body);
    for _ in 0..50 {
        body.tick();
    }
    let after = StateSnapshot::capture(&body);
    assert!(after.max_position_delta(&before).unwrap() > 0.0);

    let mut other = before.clone();
    other.vertex_count = 3;
    assert_eq!(other.max_position_delta(&before), None);
}

// ─── Marker Tests ─────────────────────────────────────────────

#[test]
fn markers_shared_across_threads() {
    let markers = DebugMarkers::new();
    let writer = markers.clone();
    thread::spawn(move || {
        writer.add_point(Vec3::ONE);
        writer.mark_vertex(3);
        writer.mark_vertex(3);
    })
    .join()
    .unwrap();

    let set = markers.snapshot();
    assert_eq!(set.points, vec![Vec3::ONE]);
    assert_eq!(set.vertices, vec![3]);
    assert_eq!(markers.with(|s| s.points.len()), 1);

    markers.clear();
    assert!(markers.snapshot().vertices.is_empty());
}
