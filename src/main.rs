use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use shortlist_copy::{
    AppConfig, CopyConfig, JobOutcome, JobReport, JobRequest, Orchestrator, ProgressEvent,
    ProgressSink,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Paths and switches for one run, straight from the command line
struct RunArgs {
    request: JobRequest,
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Shortlist Copy")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Copy the originals of client-shortlisted photos into a job folder")
        .arg(
            Arg::new("selection")
                .long("selection")
                .short('s')
                .value_name("PATH")
                .help("Folder of client-selected photos, or a text file listing their names")
                .required(true),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .value_name("DIR")
                .help("Folder holding the original (RAW) photos")
                .required(true),
        )
        .arg(
            Arg::new("destination")
                .long("destination")
                .short('d')
                .value_name("DIR")
                .help("Folder to copy the matching originals into")
                .required(true),
        )
        .arg(
            Arg::new("include-xmp")
                .long("include-xmp")
                .help("Also copy .xmp sidecar files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Set the log level (trace, debug, info, warn, error)")
                .default_value("info"),
        )
        .arg(
            Arg::new("progress-every")
                .long("progress-every")
                .value_name("FILES")
                .help("Report copy progress every N files")
                .default_value("5"),
        )
        .arg(
            Arg::new("error-preview")
                .long("error-preview")
                .value_name("COUNT")
                .help("Number of copy errors to list in the summary")
                .default_value("10"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the final report as JSON")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config = create_app_config(&matches)?;
    let run_args = create_run_args(&matches)?;

    let env_loaded = load_environment_variables();
    initialize_logging(&config.log_level)?;
    if !env_loaded {
        debug!("No .env file found, using system environment variables");
    }

    run_application(config, run_args).await
}

fn arg_value(matches: &clap::ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("Missing value for --{}", name))
}

/// Build the application configuration from CLI arguments
fn create_app_config(matches: &clap::ArgMatches) -> Result<AppConfig> {
    let log_level = arg_value(matches, "log-level")?;

    let progress_interval: usize = arg_value(matches, "progress-every")?
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid progress-every value"))?;

    let error_preview_limit: usize = arg_value(matches, "error-preview")?
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid error-preview value"))?;

    if progress_interval == 0 {
        anyhow::bail!("progress-every must be at least 1");
    }

    Ok(AppConfig {
        copy: CopyConfig {
            progress_interval,
            error_preview_limit,
            ..CopyConfig::default()
        },
        log_level,
    })
}

fn create_run_args(matches: &clap::ArgMatches) -> Result<RunArgs> {
    Ok(RunArgs {
        request: JobRequest::new(
            arg_value(matches, "selection")?,
            arg_value(matches, "source")?,
            arg_value(matches, "destination")?,
            matches.get_flag("include-xmp"),
        ),
        json: matches.get_flag("json"),
    })
}

/// Initialize structured logging with tracing
fn initialize_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}

/// Load a local .env (e.g. RUST_LOG) before the subscriber reads it
fn load_environment_variables() -> bool {
    dotenvy::dotenv().is_ok()
}

async fn run_application(config: AppConfig, args: RunArgs) -> Result<()> {
    info!("Starting Shortlist Copy");
    debug!("Configuration: {:#?}", config);

    let preview_limit = config.copy.error_preview_limit;
    let poll_interval = Duration::from_millis(config.copy.poll_interval_ms);
    let orchestrator = Orchestrator::with_observer(config.copy, Arc::new(ProgressLog));

    let handle = orchestrator.start(args.request)?;
    info!("Job {} started", handle.job_id());

    let cancel = orchestrator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling after the current file...");
            cancel.request();
        }
    });

    let mut ticker = tokio::time::interval(poll_interval);
    while !handle.is_finished() {
        ticker.tick().await;
        render_events(orchestrator.poll());
    }

    let result = handle.wait().await;
    render_events(orchestrator.poll());

    let report = result.context("Operation failed")?;
    print_report(&report, preview_limit, args.json)?;

    Ok(())
}

/// Logs the bar position as the worker moves, without waiting for a poll
struct ProgressLog;

impl ProgressSink for ProgressLog {
    fn emit(&self, event: ProgressEvent) {
        if let ProgressEvent::Progress { current, total } = event {
            let percent = event.fraction().unwrap_or(0.0) * 100.0;
            debug!("Progress {}/{} ({:.0}%)", current, total, percent);
        }
    }
}

fn render_events(events: Vec<ProgressEvent>) {
    for event in &events {
        match event {
            ProgressEvent::Status(message) if !message.is_empty() => info!("{}", message),
            _ => {}
        }
    }
}

fn print_report(report: &JobReport, preview_limit: usize, json: bool) -> Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(report).context("Failed to render report")?;
        println!("{}", rendered);
        return Ok(());
    }

    info!("=== COPY REPORT ===");
    info!("Files matched: {}", report.total);
    info!("Successfully copied: {}", report.successful_copies);
    info!("Copy errors: {}", report.failed_count());
    info!("Success rate: {:.2}%", report.success_rate() * 100.0);
    info!(
        "Elapsed: {:.1}s",
        (report.finished_at - report.started_at).num_milliseconds() as f64 / 1000.0
    );

    let summary = report.summary(preview_limit);
    match report.outcome() {
        JobOutcome::Completed => info!("{}", summary),
        JobOutcome::NothingToDo | JobOutcome::Cancelled | JobOutcome::PartialFailure => {
            for line in summary.lines() {
                warn!("{}", line);
            }
        }
        JobOutcome::AllFailed => {
            for line in summary.lines() {
                error!("{}", line);
            }
        }
    }

    Ok(())
}
