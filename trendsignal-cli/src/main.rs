//! trendsignal CLI: classify bar files and track signal confirmation.
//!
//! Commands:
//! - `evaluate`: classify one CSV bar file and record the signal
//! - `scan`: classify every CSV in a directory (in parallel) and record each
//! - `summary`: securities whose latest signal is actionable
//! - `cleanup`: trim every signal log to its newest entries
//! - `config`: print the indicator bundle for a timeframe / instrument class

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use trendsignal_core::{classify, IndicatorConfig, InstrumentClass, TrendSignal};
use trendsignal_runner::bars_csv::parse_datetime;
use trendsignal_runner::{
    load_bars_csv, ConfirmationSettings, ConfirmationTracker, ExecutionRecommendation,
    JsonFileStore, Persistence,
};

#[derive(Parser)]
#[command(
    name = "trendsignal",
    about = "trendsignal CLI: trend signal classification with multi-day confirmation"
)]
struct Cli {
    /// Confirmation settings TOML (history file, market close, retention).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one bar file and record the signal.
    Evaluate {
        /// CSV with header datetime,open,high,low,close,volume.
        #[arg(long)]
        bars: PathBuf,

        /// Security identifier. Defaults to the file stem.
        #[arg(long)]
        security: Option<String>,

        #[command(flatten)]
        profile: ProfileArgs,

        #[command(flatten)]
        run: RunArgs,

        /// Print the signal and recommendation as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Classify every *.csv in a directory; the file stem is the security id.
    Scan {
        #[arg(long)]
        dir: PathBuf,

        #[command(flatten)]
        profile: ProfileArgs,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Show securities whose latest logged signal is actionable.
    Summary,
    /// Keep only the newest entries of every signal log.
    Cleanup {
        /// Entries to keep. Defaults to the configured retention.
        #[arg(long)]
        keep: Option<usize>,
    },
    /// Print the indicator bundle for a profile as TOML.
    Config {
        #[command(flatten)]
        profile: ProfileArgs,
    },
}

#[derive(clap::Args)]
struct ProfileArgs {
    /// hourly | daily
    #[arg(long, default_value = "hourly")]
    timeframe: String,

    /// stock | warrant | option
    #[arg(long, default_value = "warrant")]
    instrument: String,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Persist even before market close.
    #[arg(long, default_value_t = false)]
    force: bool,

    /// Evaluation time ("YYYY-MM-DD HH:MM[:SS]"). Defaults to local now.
    #[arg(long)]
    now: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_deref())?;

    match cli.command {
        Commands::Evaluate {
            bars,
            security,
            profile,
            run,
            json,
        } => run_evaluate(&settings, &bars, security, &profile, &run, json),
        Commands::Scan { dir, profile, run } => run_scan(&settings, &dir, &profile, &run),
        Commands::Summary => run_summary(&settings),
        Commands::Cleanup { keep } => run_cleanup(&settings, keep),
        Commands::Config { profile } => run_config(&profile),
    }
}

fn load_settings(path: Option<&Path>) -> Result<ConfirmationSettings> {
    match path {
        Some(path) => ConfirmationSettings::from_file(path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Ok(ConfirmationSettings::default()),
    }
}

fn open_tracker(settings: &ConfirmationSettings) -> ConfirmationTracker<JsonFileStore> {
    ConfirmationTracker::new(JsonFileStore::new(&settings.history_file), settings)
}

impl ProfileArgs {
    fn indicator_config(&self) -> IndicatorConfig {
        IndicatorConfig::resolve_str(&self.timeframe, &self.instrument)
    }

    /// Unknown names fall back to warrant, matching the indicator fallback.
    fn instrument_class(&self) -> InstrumentClass {
        self.instrument.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to warrant");
            InstrumentClass::default()
        })
    }
}

impl RunArgs {
    fn evaluation_time(&self) -> Result<NaiveDateTime> {
        match self.now.as_deref() {
            Some(s) => match parse_datetime(s) {
                Some(now) => Ok(now),
                None => bail!("invalid --now {s:?} (expected YYYY-MM-DD HH:MM)"),
            },
            None => Ok(chrono::Local::now().naive_local()),
        }
    }
}

fn security_from_path(path: &Path) -> Result<String> {
    match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) if !stem.is_empty() => Ok(stem.to_string()),
        _ => bail!("cannot derive a security id from {}", path.display()),
    }
}

fn classify_file(path: &Path, config: &IndicatorConfig) -> Result<TrendSignal> {
    let bars = load_bars_csv(path)?;
    let signal = classify(&bars, config).with_context(|| format!("classifying {}", path.display()))?;
    Ok(signal)
}

fn run_evaluate(
    settings: &ConfirmationSettings,
    bars: &Path,
    security: Option<String>,
    profile: &ProfileArgs,
    run: &RunArgs,
    json: bool,
) -> Result<()> {
    let security = match security {
        Some(id) => id,
        None => security_from_path(bars)?,
    };
    let now = run.evaluation_time()?;
    let signal = classify_file(bars, &profile.indicator_config())?;

    let mut tracker = open_tracker(settings);
    let rec = tracker.record(
        &security,
        signal.action,
        signal.confidence,
        profile.instrument_class(),
        run.force,
        now,
    );

    if json {
        let out = serde_json::json!({
            "security_id": security,
            "signal": signal,
            "recommendation": rec,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_evaluation(&security, &signal, &rec);
    }
    Ok(())
}

fn run_scan(
    settings: &ConfirmationSettings,
    dir: &Path,
    profile: &ProfileArgs,
    run: &RunArgs,
) -> Result<()> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")))
        .collect();
    files.sort();

    if files.is_empty() {
        println!("No CSV files in {}", dir.display());
        return Ok(());
    }

    let now = run.evaluation_time()?;
    let config = profile.indicator_config();
    let class = profile.instrument_class();

    // Classification is independent per file; recording is sequential.
    let results: Vec<(PathBuf, Result<TrendSignal>)> = files
        .par_iter()
        .map(|path| (path.clone(), classify_file(path, &config)))
        .collect();

    let mut tracker = open_tracker(settings);
    let mut failures = 0usize;

    println!(
        "{:<12} {:<12} {:<7} {:>5}/{:<3} {:<8} Reason",
        "Security", "Action", "Conf", "Days", "Req", "Execute"
    );
    println!("{}", "-".repeat(72));
    for (path, result) in results {
        let security = security_from_path(&path)?;
        let signal = match result {
            Ok(signal) => signal,
            Err(e) => {
                failures += 1;
                tracing::warn!(security = %security, error = %e, "skipping");
                eprintln!("Error for {security}: {e:#}");
                continue;
            }
        };
        let rec = tracker.record(
            &security,
            signal.action,
            signal.confidence,
            class,
            run.force,
            now,
        );
        println!(
            "{:<12} {:<12} {:<7} {:>5}/{:<3} {:<8} {}",
            security,
            signal.action,
            signal.confidence,
            rec.consecutive_days,
            rec.required_days,
            if rec.should_execute { "YES" } else { "no" },
            rec.reason
        );
        warn_on_failed_save(&rec);
    }

    if failures > 0 {
        bail!("{failures} file(s) could not be classified");
    }
    Ok(())
}

fn run_summary(settings: &ConfirmationSettings) -> Result<()> {
    let tracker = open_tracker(settings);
    let rows = tracker.summary();
    if rows.is_empty() {
        println!("No actionable signals in {}", settings.history_file.display());
        return Ok(());
    }

    println!(
        "{:<12} {:<12} {:>5}/{:<3} {:<8} {:<10}",
        "Security", "Action", "Days", "Req", "Execute", "Latest"
    );
    println!("{}", "-".repeat(56));
    for row in &rows {
        println!(
            "{:<12} {:<12} {:>5}/{:<3} {:<8} {:<10}",
            row.security_id,
            row.action,
            row.consecutive_days,
            row.required_days,
            if row.should_execute { "YES" } else { "no" },
            row.latest_date
        );
    }
    Ok(())
}

fn run_cleanup(settings: &ConfirmationSettings, keep: Option<usize>) -> Result<()> {
    if keep == Some(0) {
        bail!("--keep must be at least 1");
    }
    let mut tracker = open_tracker(settings);
    match tracker.cleanup_old_signals(keep) {
        Persistence::Failed(msg) => bail!("failed to save signal history: {msg}"),
        _ => {
            println!(
                "Kept the newest {} entries per security in {}",
                keep.unwrap_or(settings.retention_days),
                settings.history_file.display()
            );
            Ok(())
        }
    }
}

fn run_config(profile: &ProfileArgs) -> Result<()> {
    let config = profile.indicator_config();
    println!("# timeframe = {}, instrument = {}", profile.timeframe, profile.instrument);
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn warn_on_failed_save(rec: &ExecutionRecommendation) {
    if let Persistence::Failed(msg) = &rec.persistence {
        eprintln!("WARNING: signal history not saved: {msg}");
    }
}

fn print_evaluation(security: &str, signal: &TrendSignal, rec: &ExecutionRecommendation) {
    let m = &signal.metrics;
    let fmt_opt = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));

    println!();
    println!("=== {security} @ {} ===", signal.evaluated_at);
    println!("Action:         {} ({})", signal.action, signal.confidence.as_str());
    println!("Reason:         {}", signal.reason);
    println!();
    println!("--- Metrics ---");
    println!("Price:          {:.4}", m.current_price);
    println!(
        "Supertrend:     {} ({})",
        fmt_opt(m.supertrend_value),
        m.supertrend_direction
            .map_or("n/a", |d| if d.as_f64() > 0.0 { "up" } else { "down" })
    );
    println!("ADX:            {}", fmt_opt(m.adx));
    println!("+DI / -DI:      {} / {}", fmt_opt(m.plus_di), fmt_opt(m.minus_di));
    println!("ATR %:          {}", fmt_opt(m.atr_pct));
    println!("Drawdown:       {:.2}%", m.drawdown_pct);
    println!("Rally:          {:.2}%", m.rally_pct);
    println!(
        "Thresholds:     {:.1}% / {:.1}%{}",
        m.min_threshold,
        m.severe_threshold,
        if m.volatility_adjusted { " (volatility adjusted)" } else { "" }
    );
    println!();
    println!("--- Confirmation ---");
    println!("Consecutive:    {}/{}", rec.consecutive_days, rec.required_days);
    println!("Persisted:      {}", if rec.will_persist { "yes" } else { "no" });
    println!("Execute:        {}", if rec.should_execute { "YES" } else { "no" });
    println!("                {}", rec.reason);
    warn_on_failed_save(rec);
    println!();
}
