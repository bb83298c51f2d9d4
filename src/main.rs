//! ev-fleet-scheduler entry point — CLI wiring and config-driven simulation run.

use std::path::PathBuf;
use std::process;

use ev_fleet_scheduler::cli;
use ev_fleet_scheduler::config::SimulationConfig;
use ev_fleet_scheduler::driver;

fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    let opts = cli::parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        cli::print_usage();
        process::exit(1);
    });

    let config_path = opts.config.clone().unwrap_or_else(|| PathBuf::from("sim.toml"));
    let mut cfg = SimulationConfig::from_file_or_default(&config_path).unwrap_or_else(|e| {
        eprintln!("configuration error: {e}");
        process::exit(2);
    });

    if let Some(seed) = opts.seed {
        cfg.seed = seed;
    }
    let log_level = opts.log_level.clone().unwrap_or_else(|| cfg.log_level.clone());
    init_tracing(&log_level);

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("configuration error: {e}");
        }
        process::exit(2);
    }

    let input_path = opts.input.clone().unwrap_or_else(|| PathBuf::from(&cfg.input_file));

    if let Err(e) = driver::run(&cfg, &input_path, &opts.out_dir) {
        eprintln!("error: {e}");
        process::exit(e.exit_code());
    }
}
