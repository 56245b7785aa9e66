//! WardPulse CLI - Command-line interface for the WardPulse simulator
//!
//! Commands:
//! - run: Drive live ticks on a fixed interval, streaming snapshot updates (streaming mode)
//! - backfill: Generate historical telemetry over a past window (batch mode)
//! - roster: Parse a roster seed file and report the accepted entries
//! - doctor: Diagnose engine health and configuration

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};

use wardpulse::config::{DEFAULT_BACKFILL_STEP_SECS, DEFAULT_TICK_INTERVAL_SECS};
use wardpulse::{
    parse_roster, populate_if_empty, sample_roster, DataPoint, Engine, EngineConfig, MemorySink,
    MemoryStore, NdjsonSink, Subject, SubjectSeed, TelemetryStore, ENGINE_VERSION,
};

/// WardPulse - Stateful physiological telemetry simulator for care-team rosters
#[derive(Parser)]
#[command(name = "wardpulse")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Simulate bounded physiological telemetry for a subject roster", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive live ticks on a fixed interval (streaming mode)
    Run {
        /// Roster seed file, a JSON array of {name, role} (sample roster when omitted)
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Engine configuration overrides (JSON, partial documents allowed)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seconds between ticks
        #[arg(long, default_value_t = DEFAULT_TICK_INTERVAL_SECS)]
        interval: u64,

        /// Stop after this many ticks (run until interrupted when omitted)
        #[arg(long)]
        ticks: Option<u64>,

        /// Backfill this many hours of history before going live
        #[arg(long)]
        backfill_hours: Option<i64>,

        /// Pin the noise seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Append committed data points to this NDJSON file
        #[arg(long)]
        points_out: Option<PathBuf>,
    },

    /// Generate historical telemetry over a past window (batch mode)
    Backfill {
        /// Roster seed file, a JSON array of {name, role} (sample roster when omitted)
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Engine configuration overrides (JSON, partial documents allowed)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Hours before now to cover (defaults to 48 when no window is given)
        #[arg(long, conflicts_with_all = ["start", "end"])]
        hours: Option<i64>,

        /// Window start (RFC 3339)
        #[arg(long, requires = "end")]
        start: Option<String>,

        /// Window end, exclusive (RFC 3339)
        #[arg(long, requires = "start")]
        end: Option<String>,

        /// Seconds between generated points
        #[arg(long, default_value_t = DEFAULT_BACKFILL_STEP_SECS)]
        step: i64,

        /// Pin the noise seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Output file for NDJSON data points (use - for stdout)
        #[arg(short, long, default_value = "-")]
        out: PathBuf,
    },

    /// Parse a roster seed file and report the accepted entries
    Roster {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose engine health and configuration
    Doctor {
        /// Check a roster seed file
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), WardCliError> {
    match cli.command {
        Commands::Run {
            roster,
            config,
            interval,
            ticks,
            backfill_hours,
            seed,
            points_out,
        } => cmd_run(
            roster.as_deref(),
            config.as_deref(),
            interval,
            ticks,
            backfill_hours,
            seed,
            points_out.as_deref(),
        ),

        Commands::Backfill {
            roster,
            config,
            hours,
            start,
            end,
            step,
            seed,
            out,
        } => cmd_backfill(
            roster.as_deref(),
            config.as_deref(),
            hours,
            start.as_deref(),
            end.as_deref(),
            step,
            seed,
            &out,
        ),

        Commands::Roster { input, json } => cmd_roster(&input, json),

        Commands::Doctor { roster, json } => cmd_doctor(roster.as_deref(), json),
    }
}

fn cmd_run(
    roster: Option<&Path>,
    config: Option<&Path>,
    interval: u64,
    ticks: Option<u64>,
    backfill_hours: Option<i64>,
    seed: Option<u64>,
    points_out: Option<&Path>,
) -> Result<(), WardCliError> {
    let seeds = load_seeds(roster)?;
    let mut store = MemoryStore::new();
    populate_if_empty(&mut store, &seeds, Utc::now())?;

    let mut engine = make_engine(load_config(config)?, seed)?;

    if let Some(hours) = backfill_hours {
        let end = Utc::now();
        let start = end - Duration::hours(hours);
        engine.backfill(
            &mut store,
            start,
            end,
            Duration::seconds(DEFAULT_BACKFILL_STEP_SECS),
        )?;
    }

    let mut sink = NdjsonSink::new(io::stdout());
    let mut written = store.points().len();
    let mut done = 0u64;

    while ticks.map_or(true, |limit| done < limit) {
        let now = Utc::now();
        engine.live_tick(&mut store, &mut sink, now);
        done += 1;

        if let Some(path) = points_out {
            append_new_points(path, &store, &mut written)?;
        }

        if ticks.map_or(true, |limit| done < limit) {
            thread::sleep(StdDuration::from_secs(interval));
        }
    }

    Ok(())
}

fn cmd_backfill(
    roster: Option<&Path>,
    config: Option<&Path>,
    hours: Option<i64>,
    start: Option<&str>,
    end: Option<&str>,
    step: i64,
    seed: Option<u64>,
    out: &Path,
) -> Result<(), WardCliError> {
    let (start, end) = resolve_window(hours, start, end)?;
    let seeds = load_seeds(roster)?;

    let mut store = MemoryStore::new();
    populate_if_empty(&mut store, &seeds, start)?;

    let mut engine = make_engine(load_config(config)?, seed)?;
    engine.backfill(&mut store, start, end, Duration::seconds(step))?;

    let mut output = String::new();
    for point in store.points() {
        output.push_str(&serde_json::to_string(point)?);
        output.push('\n');
    }

    if out.to_string_lossy() == "-" {
        print!("{}", output);
    } else {
        fs::write(out, output)?;
    }

    Ok(())
}

fn cmd_roster(input: &Path, json: bool) -> Result<(), WardCliError> {
    let data = read_input(input)?;
    let seeds = parse_roster(&data)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&seeds)?);
    } else {
        println!("Roster Report");
        println!("=============");
        println!("Accepted entries: {}", seeds.len());
        for seed in &seeds {
            println!("  - {} ({})", seed.name, seed.role);
        }
    }

    if seeds.is_empty() {
        Err(WardCliError::EmptyRoster)
    } else {
        Ok(())
    }
}

fn cmd_doctor(roster: Option<&Path>, json: bool) -> Result<(), WardCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("WardPulse version {}", ENGINE_VERSION),
    });

    checks.push(determinism_check());

    // Check roster file if provided
    if let Some(roster_path) = roster {
        if roster_path.exists() {
            match fs::read_to_string(roster_path) {
                Ok(content) => match parse_roster(&content) {
                    Ok(seeds) if seeds.is_empty() => {
                        checks.push(DoctorCheck {
                            name: "roster".to_string(),
                            status: CheckStatus::Warning,
                            message: "Roster file has no usable entries".to_string(),
                        });
                    }
                    Ok(seeds) => {
                        checks.push(DoctorCheck {
                            name: "roster".to_string(),
                            status: CheckStatus::Ok,
                            message: format!("Roster file valid ({} entries)", seeds.len()),
                        });
                    }
                    Err(e) => {
                        checks.push(DoctorCheck {
                            name: "roster".to_string(),
                            status: CheckStatus::Error,
                            message: format!("Invalid roster JSON: {}", e),
                        });
                    }
                },
                Err(e) => {
                    checks.push(DoctorCheck {
                        name: "roster".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Cannot read roster file: {}", e),
                    });
                }
            }
        } else {
            checks.push(DoctorCheck {
                name: "roster".to_string(),
                status: CheckStatus::Warning,
                message: "Roster file does not exist".to_string(),
            });
        }
    }

    // Check stdout (updates stream there in run mode)
    let stdout_check = if atty::is(atty::Stream::Stdout) {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a TTY (updates render inline)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdout_check);

    let report = DoctorReport {
        engine: "wardpulse".to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("WardPulse Doctor Report");
        println!("=======================");
        println!("Engine:  {}", report.engine);
        println!("Version: {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(WardCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn make_engine(config: EngineConfig, seed: Option<u64>) -> Result<Engine, WardCliError> {
    let engine = match seed {
        Some(seed) => Engine::with_seed(config, seed)?,
        None => Engine::new(config)?,
    };
    Ok(engine)
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, WardCliError> {
    match path {
        Some(path) => {
            let data = read_input(path)?;
            Ok(EngineConfig::from_json(&data)?)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn load_seeds(path: Option<&Path>) -> Result<Vec<SubjectSeed>, WardCliError> {
    match path {
        Some(path) => {
            let data = read_input(path)?;
            let seeds = parse_roster(&data)?;
            if seeds.is_empty() {
                return Err(WardCliError::EmptyRoster);
            }
            Ok(seeds)
        }
        None => Ok(sample_roster()),
    }
}

fn read_input(path: &Path) -> Result<String, io::Error> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read_to_string(path)
    }
}

fn resolve_window(
    hours: Option<i64>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), WardCliError> {
    match (hours, start, end) {
        (Some(hours), _, _) => {
            let end = Utc::now();
            Ok((end - Duration::hours(hours), end))
        }
        (None, Some(start), Some(end)) => {
            let start = parse_timestamp(start)?;
            let end = parse_timestamp(end)?;
            Ok((start, end))
        }
        // no window given: cover the last two days
        (None, None, None) => {
            let end = Utc::now();
            Ok((end - Duration::hours(48), end))
        }
        _ => Err(WardCliError::BadTimestamp(
            "both --start and --end are required".to_string(),
        )),
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, WardCliError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| WardCliError::BadTimestamp(format!("{}: {}", value, e)))
}

fn append_new_points(
    path: &Path,
    store: &MemoryStore,
    written: &mut usize,
) -> Result<(), WardCliError> {
    let points = store.points();
    if *written >= points.len() {
        return Ok(());
    }

    let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    for point in &points[*written..] {
        serde_json::to_writer(&mut file, point)?;
        file.write_all(b"\n")?;
    }
    *written = points.len();

    Ok(())
}

fn doctor_series(roster: &[Subject], now: DateTime<Utc>) -> Result<Vec<DataPoint>, WardCliError> {
    let mut store = MemoryStore::new();
    store.commit_batch(&[], roster)?;

    let mut engine = Engine::with_seed(EngineConfig::default(), 17)?;
    let mut sink = MemorySink::new();
    for i in 0..3 {
        engine.live_tick(&mut store, &mut sink, now + Duration::seconds(i * 5));
    }

    Ok(store.points().to_vec())
}

fn determinism_check() -> DoctorCheck {
    let now = Utc::now();
    let mut seeded = MemoryStore::new();
    let roster = populate_if_empty(&mut seeded, &sample_roster(), now)
        .and_then(|_| seeded.list_subjects());

    let status = match roster {
        Ok(roster) => match (doctor_series(&roster, now), doctor_series(&roster, now)) {
            (Ok(a), Ok(b)) if a == b => None,
            _ => Some("Seeded engine produced diverging series".to_string()),
        },
        Err(e) => Some(format!("Could not seed a scratch roster: {}", e)),
    };

    match status {
        None => DoctorCheck {
            name: "determinism".to_string(),
            status: CheckStatus::Ok,
            message: "Seeded engine replays an identical series".to_string(),
        },
        Some(message) => DoctorCheck {
            name: "determinism".to_string(),
            status: CheckStatus::Error,
            message,
        },
    }
}

// Error types

#[derive(Debug)]
enum WardCliError {
    Io(io::Error),
    Json(serde_json::Error),
    Config(wardpulse::ConfigError),
    Engine(wardpulse::EngineError),
    Store(wardpulse::StoreError),
    Seed(wardpulse::SeedError),
    BadTimestamp(String),
    EmptyRoster,
    DoctorFailed,
}

impl From<io::Error> for WardCliError {
    fn from(e: io::Error) -> Self {
        WardCliError::Io(e)
    }
}

impl From<serde_json::Error> for WardCliError {
    fn from(e: serde_json::Error) -> Self {
        WardCliError::Json(e)
    }
}

impl From<wardpulse::ConfigError> for WardCliError {
    fn from(e: wardpulse::ConfigError) -> Self {
        WardCliError::Config(e)
    }
}

impl From<wardpulse::EngineError> for WardCliError {
    fn from(e: wardpulse::EngineError) -> Self {
        WardCliError::Engine(e)
    }
}

impl From<wardpulse::StoreError> for WardCliError {
    fn from(e: wardpulse::StoreError) -> Self {
        WardCliError::Store(e)
    }
}

impl From<wardpulse::SeedError> for WardCliError {
    fn from(e: wardpulse::SeedError) -> Self {
        WardCliError::Seed(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<WardCliError> for CliError {
    fn from(e: WardCliError) -> Self {
        match e {
            WardCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            WardCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            WardCliError::Config(e) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the config JSON and its range bounds".to_string()),
            },
            WardCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the window bounds and step".to_string()),
            },
            WardCliError::Store(e) => CliError {
                code: "STORE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("The storage backend rejected the batch".to_string()),
            },
            WardCliError::Seed(e) => CliError {
                code: "SEED_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure the roster file is a JSON array of {name, role}".to_string()),
            },
            WardCliError::BadTimestamp(msg) => CliError {
                code: "BAD_TIMESTAMP".to_string(),
                message: msg,
                hint: Some("Use RFC 3339, e.g. 2024-03-01T00:00:00Z".to_string()),
            },
            WardCliError::EmptyRoster => CliError {
                code: "EMPTY_ROSTER".to_string(),
                message: "No usable roster entries".to_string(),
                hint: Some("Provide at least one {name, role} entry".to_string()),
            },
            WardCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    engine: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
