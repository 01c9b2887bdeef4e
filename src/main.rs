/// Version injected at compile time via ARMSIM_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("ARMSIM_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{Context, Result};
use armsim::arm::auth::SimulatedCredential;
use armsim::arm::client::ResourceManagementClient;
use armsim::automation::{
    bulk_create_resources, find_resources_by_owner, generate_compliance_report, transfer_ownership,
    BulkResourceSpec, ProgressObserver, ProgressTracker,
};
use armsim::config::{Config, FaultMode};
use armsim::error::format_arm_error;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Simulated Azure Resource Manager for automation workshops
#[derive(Parser, Debug)]
#[command(name = "armsim", version, about, long_about = None)]
struct Args {
    /// Subscription to simulate
    #[arg(short, long, global = true)]
    subscription: Option<String>,

    /// Seed for fault injection (reproducible runs)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Disable simulated latency and failures
    #[arg(long, global = true)]
    no_faults: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bulk create the resources listed in a JSON file
    Migrate {
        /// JSON array of resource records
        input: PathBuf,
    },
    /// Load resources, then move them from one owner to another
    Transfer {
        input: PathBuf,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Load resources, then print a compliance report as JSON
    Report { input: PathBuf },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("armsim {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("armsim").join("armsim.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".armsim").join("armsim.log");
    }
    PathBuf::from("armsim.log")
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let _log_guard = setup_logging(args.log_level);

    if let Err(err) = run(args).await {
        eprintln!("Error: {}", format_arm_error(&err));
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load();
    if args.no_faults {
        config.faults = FaultMode::Off;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let subscription = config.effective_subscription(args.subscription.as_deref());
    if let Some(chosen) = &args.subscription {
        if let Err(e) = Config::load().set_subscription(chosen) {
            tracing::warn!("Failed to save config: {}", e);
        }
    }
    let options = config.client_options();
    tracing::info!("Using subscription: {}", subscription);

    let credential = SimulatedCredential::with_profile(options.fault_profile.clone(), options.seed);
    let client = ResourceManagementClient::new(&credential, &subscription, options).await?;

    match args.command {
        Command::Migrate { input } => {
            let specs = load_specs(&input)?;
            let tracker = bulk_create_resources(&client, &specs, Some(progress_line())).await;
            eprintln!();
            print_tracker(&tracker);
        }
        Command::Transfer { input, from, to } => {
            let specs = load_specs(&input)?;
            bulk_create_resources(&client, &specs, None).await;

            let summary = transfer_ownership(&client, &from, &to, Some(progress_line())).await?;
            eprintln!();
            println!(
                "Transferred {}/{} resources from {} to {} in {:.2}s",
                summary.successfully_transferred, summary.total_resources, from, to, summary.duration_seconds
            );
            for error in &summary.errors {
                println!("  failed: {}", error);
            }
            for owner in [&from, &to] {
                let owned = find_resources_by_owner(&client, owner).await?;
                println!("{}: {} resources", owner, owned.len());
            }
        }
        Command::Report { input } => {
            let specs = load_specs(&input)?;
            bulk_create_resources(&client, &specs, None).await;

            let report = generate_compliance_report(&client).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    client.close();
    Ok(())
}

fn load_specs(path: &Path) -> Result<Vec<BulkResourceSpec>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let specs: Vec<BulkResourceSpec> =
        serde_json::from_str(&content).with_context(|| format!("Invalid resource list in {}", path.display()))?;
    tracing::info!("Loaded {} resource records from {:?}", specs.len(), path);
    Ok(specs)
}

fn progress_line() -> ProgressObserver {
    Box::new(|tracker: &ProgressTracker| {
        eprint!(
            "\rProgress: {}/{} ({:.1}%) - {} failed",
            tracker.processed(),
            tracker.total(),
            tracker.percentage(),
            tracker.failed()
        );
        let _ = std::io::stderr().flush();
    })
}

fn print_tracker(tracker: &ProgressTracker) {
    println!(
        "Created {}/{} resources ({:.1}% success) in {:.2}s",
        tracker.completed(),
        tracker.total(),
        tracker.success_rate(),
        tracker.elapsed().as_secs_f64()
    );
    for error in tracker.errors() {
        println!("  failed: {}", error);
    }
}
