//! CLI command implementations.

use std::path::Path;
use std::time::Instant;

use morpho_bench::metrics::BenchmarkMetrics;
use morpho_bench::runner::BenchmarkRunner;
use morpho_bench::scenarios::{Scenario, ScenarioKind};
use morpho_debug::{tick_with_hooks, ConvergenceMonitor, InspectionHook, MonitorStatus, StateSnapshot, TelemetryHook};
use morpho_io::{validate_input, SimulationInput, SimulationMetrics, SimulationOutput};
use morpho_solver::{SimulationConfig, SoftBody, TickReport};
use morpho_telemetry::bus::{EventBus, EventSender};
use morpho_telemetry::sinks::TracingSink;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Arguments of `morpho simulate`.
pub struct SimulateArgs<'a> {
    pub input: Option<&'a str>,
    pub scenario: Option<&'a str>,
    pub config: Option<&'a str>,
    pub duration: Option<f32>,
    pub until_steady: bool,
    pub output: Option<&'a str>,
    pub snapshot: Option<&'a str>,
}

/// Forwards telemetry for each tick to the event bus.
struct BusHook {
    telemetry: TelemetryHook,
    sender: EventSender,
}

impl InspectionHook for BusHook {
    fn on_tick_begin(&mut self, tick: u64, sim_time: f32) {
        self.telemetry.on_tick_begin(tick, sim_time);
    }

    fn on_tick_end(&mut self, report: &TickReport, body: &SoftBody) {
        self.telemetry.on_tick_end(report, body);
        for event in self.telemetry.drain_events() {
            self.sender.emit(event);
        }
    }

    fn name(&self) -> &str {
        "bus_hook"
    }
}

fn scenario_kind(name: &str) -> Result<ScenarioKind, Box<dyn std::error::Error>> {
    ScenarioKind::from_name(name).ok_or_else(|| {
        let available: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
        format!("Unknown scenario: '{name}'. Available: {}", available.join(", ")).into()
    })
}

/// Run a simulation from an input file or a built-in scenario.
pub fn simulate(args: SimulateArgs<'_>) -> CliResult {
    println!("morpho Simulation");
    println!("─────────────────");

    let mut input = match (args.input, args.scenario) {
        (Some(path), _) => {
            println!("Input:     {path}");
            SimulationInput::load(Path::new(path))?
        }
        (None, Some(name)) => {
            println!("Scenario:  {name}");
            Scenario::from_kind(scenario_kind(name)?).input
        }
        (None, None) => return Err("Pass --input <file> or --scenario <name>".into()),
    };

    if let Some(path) = args.config {
        let content = std::fs::read_to_string(path)?;
        input.config = toml::from_str::<SimulationConfig>(&content)?;
        println!("Config:    {path}");
    }
    if let Some(duration) = args.duration {
        input.duration = duration;
    }

    let report = validate_input(&input)?;
    for warning in &report.warnings {
        println!("⚠ {warning}");
    }

    let mut body = input.instantiate(None)?;
    let ticks = input.tick_count();
    println!(
        "Mesh:      {} verts, {} tets, {} ticks of {}s",
        body.vertex_count(),
        body.connectivity().tet_count(),
        ticks,
        input.config.dt
    );
    println!();

    let mut bus = EventBus::new();
    bus.add_sink(Box::new(TracingSink::new()));
    let mut hooks: Vec<Box<dyn InspectionHook>> = vec![Box::new(BusHook {
        telemetry: TelemetryHook::new(),
        sender: bus.sender(),
    })];
    let mut monitor = ConvergenceMonitor::default();
    let mut metrics = SimulationMetrics::default();
    let skinned = body.render_mesh().is_some();

    let start = Instant::now();
    for _ in 0..ticks {
        let tick = tick_with_hooks(&mut body, &mut hooks);
        bus.flush();

        if !tick.success {
            metrics.failed_ticks += 1;
            continue;
        }
        metrics.final_stats = tick.stats;
        if skinned {
            body.update_skin();
        }
        if args.until_steady && monitor.observe(&tick.stats) != MonitorStatus::Running {
            tracing::info!(tick = tick.tick, status = ?monitor.status(), "stopping early");
            break;
        }
    }
    for hook in hooks.iter_mut() {
        hook.on_simulation_end();
    }
    bus.finish();

    metrics.wall_time_seconds = start.elapsed().as_secs_f64();
    metrics.tick_count = body.tick_count();
    metrics.sim_time = body.sim_time();
    metrics.final_kinetic_energy = body.kinetic_energy();

    println!("  Ticks:         {} ({} failed)", metrics.tick_count, metrics.failed_ticks);
    println!("  Sim time:      {:.3}s", metrics.sim_time);
    println!("  Wall time:     {:.3}s", metrics.wall_time_seconds);
    println!("  Final KE:      {:.6e}", metrics.final_kinetic_energy);
    println!("  Last max disp: {:.3e}", metrics.final_stats.max_displacement);
    if args.until_steady {
        println!("  Monitor:       {:?}", monitor.status());
    }

    if let Some(path) = args.snapshot {
        StateSnapshot::capture(&body).save(Path::new(path))?;
        println!("Snapshot written to: {path}");
    }
    if let Some(path) = args.output {
        SimulationOutput::capture(&body, metrics).save(Path::new(path))?;
        println!("Output written to: {path}");
    }

    Ok(())
}

/// Run benchmark suite.
pub fn benchmark(scenario_name: &str, output_path: Option<&str>, json: bool) -> CliResult {
    println!("morpho Benchmark Suite");
    println!("══════════════════════");
    println!();

    let scenarios: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        vec![scenario_kind(scenario_name)?]
    };

    let mut all_metrics = Vec::new();

    for &kind in &scenarios {
        let scenario = Scenario::from_kind(kind);

        println!(
            "Running: {} ({} verts, {} tets, {} ticks)",
            kind.name(),
            scenario.input.mesh.vertex_count(),
            scenario.input.mesh.tet_count(),
            scenario.tick_count(),
        );

        let metrics = BenchmarkRunner::run(&scenario).map_err(|e| format!("Benchmark failed: {e}"))?;

        println!("  Wall time:     {:.3}s", metrics.total_wall_time);
        println!("  Avg tick:      {:.3}ms", metrics.avg_tick_time * 1000.0);
        println!("  Failed ticks:  {}", metrics.failed_ticks);
        println!("  Final KE:      {:.6e}", metrics.final_kinetic_energy);
        println!("  Max displace:  {:.4}m", metrics.max_displacement);
        match metrics.steady_tick {
            Some(tick) => println!("  Steady at:     tick {tick}"),
            None if metrics.diverged => println!("  Diverged"),
            None => println!("  Still moving"),
        }
        println!();

        all_metrics.push(metrics);
    }

    let rendered = if json {
        BenchmarkMetrics::to_json(&all_metrics)?
    } else {
        BenchmarkMetrics::to_csv(&all_metrics)
    };

    if let Some(path) = output_path {
        std::fs::write(path, &rendered)?;
        println!("Results written to: {path}");
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

/// Write a scenario's input as JSON.
pub fn export(scenario_name: &str, output_path: &str) -> CliResult {
    let scenario = Scenario::from_kind(scenario_kind(scenario_name)?);
    scenario.input.save(Path::new(output_path))?;
    println!("{} written to: {output_path}", scenario_name);
    Ok(())
}

/// Inspect a state snapshot.
pub fn inspect(path: &str, compare: Option<&str>) -> CliResult {
    println!("morpho Snapshot Inspector");
    println!("────────────────────────");
    println!();

    let snapshot = StateSnapshot::load(Path::new(path))?;

    println!("Tick:         {}", snapshot.tick);
    println!("Sim time:     {:.4}s", snapshot.sim_time);
    println!("Vertices:     {}", snapshot.vertex_count);
    println!(
        "Locked:       {} position, {} force",
        snapshot.position_locks.iter().filter(|&&c| c > 0).count(),
        snapshot.force_locks.iter().filter(|&&c| c > 0).count()
    );

    if snapshot.vertex_count > 0 {
        let (min_y, max_y) = (0..snapshot.vertex_count)
            .map(|v| snapshot.position(v).y)
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));
        println!("Y range:      [{:.4}, {:.4}]", min_y, max_y);

        let max_speed = snapshot
            .velocities
            .chunks_exact(3)
            .map(|v| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt())
            .fold(0.0f32, f32::max);
        println!("Max speed:    {:.4e}", max_speed);
    }

    if let Some(other_path) = compare {
        let other = StateSnapshot::load(Path::new(other_path))?;
        match snapshot.max_position_delta(&other) {
            Some(delta) => println!("Max Δ vs {other_path}: {delta:.6e}"),
            None => println!("{other_path} has {} vertices, cannot compare", other.vertex_count),
        }
    }

    Ok(())
}

/// Validate a config or simulation input.
pub fn validate(path: &str) -> CliResult {
    println!("morpho Validator");
    println!("────────────────");
    println!();

    if path.ends_with(".toml") {
        println!("Validating config: {path}");
        let content = std::fs::read_to_string(path)?;
        let config: SimulationConfig = toml::from_str(&content)?;
        match config.validate() {
            Ok(()) => println!("✅ Config is valid."),
            Err(e) => println!("❌ Config validation failed: {e}"),
        }
    } else if path.ends_with(".json") {
        println!("Validating input: {path}");
        let input = SimulationInput::load(Path::new(path))?;
        match validate_input(&input) {
            Ok(report) => {
                println!(
                    "✅ Input is valid ({} verts, {} tets, {} constraints).",
                    input.mesh.vertex_count(),
                    input.mesh.tet_count(),
                    input.constraints.len()
                );
                for warning in &report.warnings {
                    println!("⚠ {warning}");
                }
            }
            Err(e) => println!("❌ Input validation failed: {e}"),
        }
    } else {
        println!("Unsupported file format. Use .toml (config) or .json (simulation input).");
    }

    Ok(())
}
