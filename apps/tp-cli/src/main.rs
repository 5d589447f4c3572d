use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tp_app::{AppError, AppResult, SimulateOptions, SimulationReport, TracingStatus};
use tp_project::ControllerConfig;
use tracing::info;

#[derive(Parser)]
#[command(name = "tp-cli")]
#[command(about = "thermopulse CLI - time-proportioning PID valve controller", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a controller configuration file
    Validate {
        /// Path to the configuration file (YAML, or JSON by extension)
        config_path: PathBuf,
    },
    /// Print the default configuration
    Defaults {
        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },
    /// Run the controller against the simulated plant
    Simulate {
        /// Path to the configuration file
        config_path: PathBuf,
        /// Number of control loop iterations
        #[arg(long, default_value_t = 1_000)]
        iterations: u64,
        /// Pace the loop with the wall clock instead of virtual time
        #[arg(long)]
        realtime: bool,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the controller on the wall clock until interrupted
    Run {
        /// Path to the configuration file
        config_path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Defaults { format } => cmd_defaults(format),
        Commands::Simulate {
            config_path,
            iterations,
            realtime,
            json,
        } => cmd_simulate(&config_path, iterations, realtime, json),
        Commands::Run { config_path } => cmd_run(&config_path),
    }
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let runtime = tp_app::load_runtime(config_path)?;
    println!("✓ Configuration is valid");
    println!(
        "  pins: increase {}, decrease {}, sensor {}",
        runtime.pins.increase, runtime.pins.decrease, runtime.pins.sensor
    );

    let clamped = runtime.params.clamped();
    if clamped != runtime.params {
        println!("  note: some tunables are out of range and will be clamped at runtime");
    }
    Ok(())
}

fn cmd_defaults(format: Format) -> AppResult<()> {
    let config = ControllerConfig::default();
    let text = match format {
        Format::Yaml => tp_project::to_yaml_string(&config)?,
        Format::Json => tp_project::to_json_string(&config)?,
    };
    println!("{}", text.trim_end());
    Ok(())
}

fn cmd_simulate(config_path: &Path, iterations: u64, realtime: bool, json: bool) -> AppResult<()> {
    let runtime = tp_app::load_runtime(config_path)?;
    info!(path = %config_path.display(), "configuration loaded");

    let options = SimulateOptions {
        iterations,
        realtime,
    };
    let report = tp_app::simulate(&runtime, options, TracingStatus)?;

    if json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::InvalidInput(format!("Failed to encode report: {}", e)))?;
        println!("{}", text);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn cmd_run(config_path: &Path) -> AppResult<()> {
    let runtime = tp_app::load_runtime(config_path)?;
    info!(path = %config_path.display(), "configuration loaded");
    match tp_app::run(&runtime, TracingStatus)? {}
}

fn print_report(report: &SimulationReport) {
    let summary = &report.summary;
    println!("✓ Simulation completed: {} iterations", summary.iterations);
    println!("  pulses fired:        {}", summary.pulses_fired);
    println!("  increase ticks:      {}", summary.increase_ticks);
    println!("  decrease ticks:      {}", summary.decrease_ticks);
    println!("  sensor unavailable:  {}", summary.unavailable_ticks);
    println!("  final temperature:   {:.2}", report.final_temperature);
    println!("  final valve opening: {:.1} %", report.final_position * 100.0);
    if let Some(address) = &report.network_address {
        println!("  network address:     {}", address);
    }
}
