//! Simulator entry point — CLI wiring and config-driven engine construction.

use std::path::Path;
use std::process;

use hybrid_sim::accounting::{CostModel, LifecycleCosting};
use hybrid_sim::allocator::{MpcAllocator, MpcSettings, RuleAllocator, RuleSettings};
use hybrid_sim::battery::{Battery, DegradationCoeffs, DegradationModel};
use hybrid_sim::config::ScenarioConfig;
use hybrid_sim::demand::{DemandSource, ForecastDemand, SinusoidDemand};
use hybrid_sim::io::export::export_csv;
use hybrid_sim::sim::engine::{Engine, SimulationRun};
use hybrid_sim::sim::summary::RunSummary;
use hybrid_sim::sim::types::SimTiming;
use hybrid_sim::solver::SolverOptions;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    telemetry_out: Option<String>,
    quiet: bool,
}

fn print_help() {
    eprintln!("hybrid-sim — hybrid battery + fuel-generator dispatch simulator");
    eprintln!();
    eprintln!("Usage: hybrid-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline, conservative, mpc)");
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --telemetry-out <path>   Export step history to CSV");
    eprintln!("  --quiet                  Suppress per-step output");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        telemetry_out: None,
        quiet: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--telemetry-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --telemetry-out requires a path argument");
                    process::exit(1);
                }
                cli.telemetry_out = Some(args[i].clone());
            }
            "--quiet" => {
                cli.quiet = true;
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Builds the components every strategy shares.
///
/// Returns `(timing, demand, degradation, costing, battery)`.
fn build_scenario(
    cfg: &ScenarioConfig,
) -> (SimTiming, DemandSource, DegradationModel, CostModel, Battery) {
    let s = &cfg.simulation;
    let timing = SimTiming::new(s.steps, s.step_seconds);

    let dm = &cfg.demand;
    let demand = match dm.model.as_str() {
        "forecast" => DemandSource::Forecast(ForecastDemand::new(
            dm.base_kw,
            dm.swing_kw,
            dm.noise_std,
            dm.max_kw,
            dm.control_increment,
            s.seed,
        )),
        _ => DemandSource::Sinusoid(SinusoidDemand::new(dm.base_kw, dm.amplitude_kw, s.steps)),
    };

    let b = &cfg.battery;
    let coeffs = match cfg.degradation.profile.as_str() {
        "conservative" => DegradationCoeffs::conservative(),
        _ => DegradationCoeffs::standard(),
    };
    let degradation = DegradationModel::new(b.capacity_ah, b.temperature_k, coeffs);

    let lc = &cfg.lifecycle;
    let lifecycle = lc.enabled.then_some(LifecycleCosting {
        degradation_cost_per_ah: lc.degradation_cost_per_ah,
        co2_cost_per_kg: lc.co2_cost_per_kg,
    });
    let f = &cfg.fuel;
    let costing = CostModel::new(f.price_per_kwh, f.co2_kg_per_kwh, f.nox_kg_per_kwh, lifecycle);

    let battery = Battery::new(
        b.voltage_v,
        b.capacity_ah,
        b.internal_resistance_ohm,
        b.soc_min,
        b.soc_max,
        b.soh_max,
        s.soc_start,
        s.soh_start,
    );

    (timing, demand, degradation, costing, battery)
}

/// Runs the simulation with the configured allocation strategy.
fn run_simulation(cfg: &ScenarioConfig) -> SimulationRun {
    let (timing, demand, degradation, costing, battery) = build_scenario(cfg);
    let a = &cfg.allocator;

    if a.strategy == "mpc" {
        let allocator = MpcAllocator::new(
            degradation.clone(),
            costing.clone(),
            MpcSettings {
                soh_penalty_weight: a.soh_penalty_weight,
                soc_penalty_weight: a.soc_penalty_weight,
                soc_floor: a.soc_floor,
                unmet_penalty: a.unmet_penalty,
                solver: SolverOptions {
                    max_iters: a.max_iters,
                    tolerance: a.tolerance_kw,
                },
            },
            timing.step_seconds,
        );
        Engine::new(timing, demand, allocator, degradation, costing, battery).run()
    } else {
        let allocator = RuleAllocator::new(
            RuleSettings {
                soc_high: a.soc_high,
                soh_healthy: a.soh_healthy,
                soc_moderate: a.soc_moderate,
                soc_critical: a.soc_critical,
                soh_degraded: a.soh_degraded,
                battery_frac_high: a.battery_frac_high,
                battery_frac_moderate: a.battery_frac_moderate,
                battery_frac_low: a.battery_frac_low,
                shed_frac: a.shed_frac,
            },
            timing.dt_hours,
        );
        Engine::new(timing, demand, allocator, degradation, costing, battery).run()
    }
}

fn main() {
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then baseline
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    // Apply seed override
    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }

    // Validate before anything runs
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let run = run_simulation(&scenario);

    if !cli.quiet {
        for r in &run.history {
            println!("{r}");
        }
    }

    let summary = RunSummary::from_run(&run);
    println!("\n{summary}");

    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&run.history, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Telemetry written to {path}");
    }
}
