//! EV fleet load simulator entry point: CLI wiring and config-driven runs.

use std::path::Path;
use std::process;

use tracing::info;
use tracing_subscriber::EnvFilter;

use ev_fleet_sim::config::ScenarioConfig;
use ev_fleet_sim::io::export::{export_days_csv, export_json};
use ev_fleet_sim::sim::orchestrator::RunOrchestrator;
use ev_fleet_sim::sim::rollup::{monthly_energy, weekly_energy, weekly_peaks};
use ev_fleet_sim::sweep::concurrency_sweep;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    workers_override: Option<usize>,
    days_out: Option<String>,
    json_out: Option<String>,
    sweep: Option<usize>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("ev-fleet-sim: Monte-Carlo load simulator for EV charging fleets");
    eprintln!();
    eprintln!("Usage: ev-fleet-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>   Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>     Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>        Override random seed");
    eprintln!("  --workers <n>       Override the number of parallel charger groups");
    eprintln!("  --days-out <path>   Export day summaries to CSV");
    eprintln!("  --json-out <path>   Export the full result as JSON");
    eprintln!("  --sweep <n>         Run a concurrency-factor sweep over 1..=n chargers");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve             Start REST API server instead of a one-off run");
        eprintln!("  --port <u16>        API server port (default: 3000)");
    }
    eprintln!("  --help              Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
    eprintln!("Log verbosity follows RUST_LOG (default: info).");
}

/// Returns the value following flag `args[*i]`, advancing `i`, or exits.
fn flag_value<'a>(args: &'a [String], i: &mut usize, what: &str) -> &'a str {
    let flag = &args[*i];
    *i += 1;
    match args.get(*i) {
        Some(v) => v,
        None => {
            eprintln!("error: {flag} requires {what}");
            process::exit(1);
        }
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str, kind: &str) -> T {
    value.parse::<T>().unwrap_or_else(|_| {
        eprintln!("error: {flag} value \"{value}\" is not a valid {kind}");
        process::exit(1);
    })
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        workers_override: None,
        days_out: None,
        json_out: None,
        sweep: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                cli.scenario_path = Some(flag_value(&args, &mut i, "a path argument").into());
            }
            "--preset" => {
                cli.preset = Some(flag_value(&args, &mut i, "a name argument").into());
            }
            "--seed" => {
                let v = flag_value(&args, &mut i, "a u64 argument");
                cli.seed_override = Some(parse_number("--seed", v, "u64"));
            }
            "--workers" => {
                let v = flag_value(&args, &mut i, "a count argument");
                cli.workers_override = Some(parse_number("--workers", v, "count"));
            }
            "--days-out" => {
                cli.days_out = Some(flag_value(&args, &mut i, "a path argument").into());
            }
            "--json-out" => {
                cli.json_out = Some(flag_value(&args, &mut i, "a path argument").into());
            }
            "--sweep" => {
                let v = flag_value(&args, &mut i, "a count argument");
                cli.sweep = Some(parse_number("--sweep", v, "count"));
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                let v = flag_value(&args, &mut i, "a u16 argument");
                cli.port = parse_number("--port", v, "u16");
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

fn load_scenario(cli: &CliArgs) -> ScenarioConfig {
    // --scenario takes priority, then --preset, then the baseline default
    let loaded = if let Some(ref path) = cli.scenario_path {
        ScenarioConfig::from_toml_file(Path::new(path))
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)
    } else {
        Ok(ScenarioConfig::baseline())
    };

    let mut scenario = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(workers) = cli.workers_override {
        scenario.simulation.workers = workers;
    }
    scenario
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("error: {e}");
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();
    let scenario = load_scenario(&cli);

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let errors = scenario.validate();
        if !errors.is_empty() {
            errors.iter().for_each(|e| eprintln!("{e}"));
            process::exit(1);
        }
        let state = Arc::new(ev_fleet_sim::api::AppState::new(scenario.simulation));
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new()
            .unwrap_or_else(|e| fail(format!("failed to create tokio runtime: {e}")));
        if let Err(e) = rt.block_on(ev_fleet_sim::api::serve(state, addr)) {
            fail(format!("server error: {e}"));
        }
        return;
    }

    let (config, input) = scenario.prepare().unwrap_or_else(|e| fail(e));

    if let Some(max) = cli.sweep {
        let power_kw = input.chargers.first().map_or(0.0, |c| c.power_kw());
        info!(max, power_kw, "running concurrency sweep");
        let rows = concurrency_sweep(&config, &input, max, power_kw).unwrap_or_else(|e| fail(e));
        println!("--- Concurrency Factor ---");
        for row in &rows {
            println!("{row}");
        }
        return;
    }

    let result = RunOrchestrator::new(config)
        .run(&input)
        .unwrap_or_else(|e| fail(e));

    println!("{result}");

    println!("\n--- Monthly Energy ---");
    for month in monthly_energy(&result.days) {
        println!("{month}");
    }
    println!("\n--- Weekly Peaks ---");
    for week in weekly_peaks(&result.days) {
        println!("{week}");
    }
    println!("\n--- Weekly Energy ---");
    for week in weekly_energy(&result.days) {
        println!("{week}");
    }

    if let Some(ref path) = cli.days_out {
        if let Err(e) = export_days_csv(&result, Path::new(path)) {
            fail(format!("failed to write CSV: {e}"));
        }
        info!(path = %path, "day summaries written");
    }
    if let Some(ref path) = cli.json_out {
        if let Err(e) = export_json(&result, Path::new(path)) {
            fail(format!("failed to write JSON: {e}"));
        }
        info!(path = %path, "result written");
    }
}
