//! Fundscope - startup funding dashboard
//!
//! A CLI tool that loads a startup funding CSV once and renders
//! market, startup and investor views as Markdown or JSON.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, config, dataset load failure, etc.)

mod analysis;
mod cli;
mod config;
mod dashboard;
mod dataset;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, ListTarget, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use dashboard::{build_view, parse_command, Command, View, ViewSettings};
use dataset::{Dataset, DatasetCache, LoadOptions, Source};
use models::{Report, ReportMetadata, TrendMetric};
use report::ReportSettings;
use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args)?;

    info!("Fundscope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Dashboard failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .fundscope.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the data source, rankings and report style.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so stdout carries only the report.
fn init_logging(args: &Args) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Everything a rendering pass needs besides the table itself.
struct Session<'a> {
    cache: &'a DatasetCache,
    source: Source,
    view_settings: ViewSettings,
    report_settings: ReportSettings,
    default_trend: TrendMetric,
    format: OutputFormat,
}

impl Session<'_> {
    /// The table for this session; loaded on first call, cached afterwards.
    async fn dataset(&self) -> Result<std::sync::Arc<Dataset>> {
        self.cache
            .get_or_load(&self.source)
            .await
            .with_context(|| format!("Failed to load dataset from {}", self.source))
    }

    fn report(&self, dataset: &Dataset, view: &View) -> Report {
        let stats = dataset.stats();

        Report {
            metadata: ReportMetadata {
                source: dataset.source().to_string(),
                generated_at: Utc::now(),
                records_loaded: stats.records_loaded(),
                rows_skipped: stats.rows_skipped,
                unknown_dates: stats.unknown_dates,
                investor_match: self.view_settings.investor_match,
            },
            view: build_view(dataset.records(), view, &self.view_settings),
        }
    }
}

/// Run the dashboard. Errors bubble up to `main`.
async fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let mut load_options = LoadOptions::from(&config.data);
    load_options.show_progress = !args.quiet;
    let cache = DatasetCache::new(load_options);

    let session = Session {
        cache: &cache,
        source: Source::parse(&config.data.source),
        view_settings: ViewSettings::from(&config.dashboard),
        report_settings: ReportSettings::from(&config.report),
        default_trend: config.dashboard.trend,
        format: args.format,
    };

    // Load up front so a bad source fails before anything is rendered
    let dataset = session.dataset().await?;
    if dataset.is_empty() {
        warn!("Dataset {} has no records; every view will be empty", dataset.source());
    }

    let output_path = config.general.output.as_deref().map(Path::new);

    if let Some(target) = args.list {
        let content = render_name_list(&dataset, target, session.format)?;
        return emit(&content, output_path);
    }

    if args.interactive {
        if let Some(path) = output_path {
            warn!(
                "Ignoring output file {} in interactive mode; views print to stdout",
                path.display()
            );
        }
        return run_interactive(&session).await;
    }

    let view = args
        .requested_view(session.default_trend)
        .context("No name given for the selected view")?;

    let report = session.report(&dataset, &view);
    let content = match session.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&report, &session.report_settings)
        }
    };
    emit(&content, output_path)?;

    info!(
        "Rendered \"{}\" in {:.2}s",
        report.view.title,
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Read view commands from stdin and render each one.
async fn run_interactive(session: &Session<'_>) -> Result<()> {
    println!("📊 Fundscope interactive mode. Type 'help' for commands.");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("fundscope> ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("Failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line, session.default_trend) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        // Every command re-derives its output from the same cached table
        let dataset = session.dataset().await?;

        match command {
            Command::Show(view) => {
                let report = session.report(&dataset, &view);
                let content = match session.format {
                    OutputFormat::Json => serde_json::to_string_pretty(&report.view)?,
                    OutputFormat::Markdown => {
                        report::generate_view_markdown(&report.view, &session.report_settings)
                    }
                };
                println!("{}", content);
            }
            Command::ListStartups => {
                println!("{}", render_name_list(&dataset, ListTarget::Startups, session.format)?);
            }
            Command::ListInvestors => {
                println!("{}", render_name_list(&dataset, ListTarget::Investors, session.format)?);
            }
            Command::Help => println!("{}", dashboard::command::HELP),
            Command::Quit => break,
        }
    }

    debug!(
        "Interactive session ended with {} cached dataset(s)",
        session.cache.loaded_count()
    );
    Ok(())
}

/// The selection domain for the startup or investor view.
fn render_name_list(dataset: &Dataset, target: ListTarget, format: OutputFormat) -> Result<String> {
    let (title, names) = match target {
        ListTarget::Startups => ("Startups", analysis::list_startups(dataset.records())),
        ListTarget::Investors => (
            "Investors",
            analysis::list_investors(dataset.records())
                .into_iter()
                .collect(),
        ),
    };

    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&names)?,
        OutputFormat::Markdown => report::generate_name_list(title, &names),
    })
}

/// Write rendered output to a file, or to stdout when no file is set.
fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("✅ Report saved to: {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .context("Failed to write report to stdout")?;
            stdout.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
