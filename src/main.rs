//! Keyguard - Main Entry Point

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use keyguard_core::api::commands;
use keyguard_core::constants;
use keyguard_core::logic::config::AppConfig;
use keyguard_core::logic::report::ExportFormat;
use keyguard_core::logic::session::{CycleObserver, HistoryFilter, ScanReport, Session};
use keyguard_core::logic::threat::{EngineVariant, Sensitivity};

/// Keyguard - detect keyloggers among processes holding keyboard hooks
#[derive(Parser)]
#[command(name = "keyguard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// JSON config file
    #[arg(long, global = true, env = constants::ENV_CONFIG)]
    config: Option<PathBuf>,

    /// Scan the built-in demo host instead of live sources
    #[arg(long, global = true)]
    mock: bool,

    /// Hook enumerator output (JSON)
    #[arg(long, global = true)]
    hooks_file: Option<PathBuf>,

    /// Scoring engine: tiered | legacy
    #[arg(long, global = true)]
    engine: Option<EngineVariant>,

    /// Legacy engine sensitivity: low | medium | high
    #[arg(long, global = true)]
    sensitivity: Option<Sensitivity>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one scan cycle
    Snapshot {
        /// Print the scan report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Scan repeatedly until Ctrl+C or --duration elapses
    Monitor {
        /// Seconds between cycles
        #[arg(long)]
        interval: Option<f64>,
        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<f64>,
        /// Export history and summary on exit
        #[arg(long, value_enum)]
        export: Option<ExportFormat>,
    },
    /// Take a snapshot and export it
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Output file (default: timestamped file in the export dir)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show the active engine's rule table
    Rules,
    /// Show the effective configuration and trust store
    Policy,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.global.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(global: &GlobalOpts) -> Result<AppConfig, String> {
    let mut config = AppConfig::load(global.config.as_deref()).map_err(|e| e.to_string())?;

    // CLI flags win over file and environment
    if let Some(engine) = global.engine {
        config.engine = engine;
    }
    if let Some(sensitivity) = global.sensitivity {
        config.sensitivity = sensitivity;
    }
    if let Some(path) = &global.hooks_file {
        config.hooks_file = Some(path.clone());
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<(), String> {
    let config = load_config(&cli.global)?;
    let mock = cli.global.mock;

    log::info!(
        "Starting {} v{} (engine: {})",
        constants::APP_NAME,
        constants::APP_VERSION,
        config.engine
    );

    match cli.command {
        Command::Snapshot { json } => {
            let session = commands::open_session(&config, mock)?;
            let report = commands::run_snapshot(&session)?;
            if json {
                let out = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
                println!("{}", out);
            } else {
                print!("{}", commands::render_report(&report));
            }
            session.shutdown();
        }
        Command::Monitor {
            interval,
            duration,
            export,
        } => {
            let mut config = config;
            if let Some(secs) = interval {
                config.monitor_interval_secs = secs;
                config.validate().map_err(|e| e.to_string())?;
            }
            let session = commands::open_session(&config, mock)?;
            run_monitor(&session, &config, duration, export)?;
        }
        Command::Export { format, output } => {
            let session = commands::open_session(&config, mock)?;
            commands::run_snapshot(&session)?;
            let result = commands::export_history(&session, format, output.as_deref(), &config.export_dir)?;
            println!(
                "Exported {} verdicts to {}",
                result.verdict_count,
                result.verdicts_file.display()
            );
            session.shutdown();
        }
        Command::Rules => {
            let session = commands::open_session(&config, mock)?;
            println!("Engine: {}", session.engine_variant());
            print!("{}", commands::render_rules(&commands::get_rules(&session)?));
        }
        Command::Policy => {
            let status = commands::get_policy(&config, mock)?;
            print!("{}", commands::render_policy(&status));
        }
    }

    Ok(())
}

fn run_monitor(
    session: &Arc<Session>,
    config: &AppConfig,
    duration: Option<f64>,
    export: Option<ExportFormat>,
) -> Result<(), String> {
    let duration = match duration {
        Some(secs) => match Duration::try_from_secs_f64(secs) {
            Ok(d) if !d.is_zero() => Some(d),
            _ => return Err(format!("--duration must be greater than zero (got {})", secs)),
        },
        None => None,
    };

    let observer: CycleObserver =
        Box::new(|report: &ScanReport| println!("{}", commands::render_cycle_line(report)));
    commands::start_monitor(session, config.monitor_interval(), Some(observer))?;
    println!(
        "Monitoring every {}s. Press Ctrl+C to stop.",
        config.monitor_interval_secs
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

    rt.block_on(async {
        match duration {
            Some(limit) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => log::info!("Interrupted"),
                    _ = tokio::time::sleep(limit) => log::info!("Monitoring duration reached"),
                }
            }
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::warn!("Ctrl+C handler failed: {}", e);
                }
            }
        }
    });

    commands::stop_monitor(session)?;

    let detections = commands::get_history(session, &HistoryFilter::all().detections())?;
    println!(
        "Stopped. {} verdicts recorded, {} HIGH detections.",
        session.history_len(),
        detections.len()
    );

    if let Some(format) = export {
        let result = commands::export_with_summary(session, format, &config.export_dir)?;
        println!("Exported {} verdicts to {}", result.verdict_count, result.verdicts_file.display());
        if let Some(summary) = result.summary_file {
            println!("Summary written to {}", summary.display());
        }
    }

    session.shutdown();
    Ok(())
}
