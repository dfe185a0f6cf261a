//! CLI entry point for the EduStats grade dashboard.
//!
//! Provides subcommands for connecting a spreadsheet, listing its sheets
//! grouped by educational cycle, and analyzing one sheet into subject
//! statistics and cohort rankings.

mod infra;

use crate::infra::gemini::{DEFAULT_MODEL, GeminiClient};
use crate::infra::google_sheets::GoogleSheetsClient;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edustats::config::{AppConfig, DEFAULT_STATE_FILE};
use edustats::cycle::Cycle;
use edustats::output::{ClassReport, append_subject_rows, render_summary, render_table};
use edustats::rankings::rank_cohort;
use edustats::services::SheetSource;
use edustats::session::{LoadOutcome, Session};
use edustats::stats::aggregate;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "edustats")]
#[command(about = "Grade statistics for class sheets", long_about = None)]
struct Cli {
    /// State file holding the connected spreadsheet id
    #[arg(long, global = true, default_value = DEFAULT_STATE_FILE)]
    state_file: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify access to a spreadsheet and persist its id
    Connect {
        /// Google Sheets spreadsheet id
        #[arg(value_name = "SHEET_ID")]
        sheet_id: String,
    },
    /// List the connected spreadsheet's sheets, grouped by cycle
    Sheets,
    /// Load a sheet, extract its grade table and print the statistics
    Analyze {
        /// Name of the sheet tab (the class label, e.g. "10.º Ano A")
        #[arg(value_name = "SHEET_NAME")]
        sheet_name: String,

        /// Write the full JSON report to this path
        #[arg(long)]
        json: Option<String>,

        /// Append per-subject statistics rows to this CSV file
        #[arg(long)]
        csv: Option<String>,

        /// Also print the student grade table
        #[arg(long, default_value_t = false)]
        table: bool,
    },
    /// Forget the connected spreadsheet
    Disconnect,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/edustats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("edustats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Connect { sheet_id } => connect(&cli.state_file, sheet_id).await?,
        Commands::Sheets => list_sheets(&cli.state_file).await?,
        Commands::Analyze {
            sheet_name,
            json,
            csv,
            table,
        } => analyze(&cli.state_file, &sheet_name, json, csv, table).await?,
        Commands::Disconnect => {
            AppConfig::clear(&cli.state_file)?;
            info!("Spreadsheet disconnected");
        }
    }

    Ok(())
}

fn sheets_client(config: &AppConfig) -> Result<GoogleSheetsClient> {
    if config.sheet_id.is_empty() {
        anyhow::bail!("no spreadsheet connected; run `edustats connect <SHEET_ID>` first");
    }
    let api_key = std::env::var("GOOGLE_SHEETS_API_KEY")
        .context("GOOGLE_SHEETS_API_KEY must be set")?;
    Ok(GoogleSheetsClient::new(api_key, config.sheet_id.clone()))
}

/// Verifies the spreadsheet is reachable before persisting its id.
async fn connect(state_file: &str, sheet_id: String) -> Result<()> {
    let config = AppConfig { sheet_id };
    let client = sheets_client(&config)?;

    let sheets = client.list_sheets().await?;
    config.save(state_file)?;

    info!(total = sheets.len(), "Spreadsheet connected");
    for sheet in &sheets {
        info!(sheet = %sheet.name, group = Cycle::display_group(&sheet.name), "Sheet");
    }

    Ok(())
}

async fn list_sheets(state_file: &str) -> Result<()> {
    let config = AppConfig::load(state_file)?;
    let client = sheets_client(&config)?;
    let sheets = client.list_sheets().await?;

    for group in [
        "Pré-escolar",
        "1.º Ciclo",
        "2.º Ciclo",
        "3.º Ciclo",
        "Secundário",
        "Outras",
    ] {
        let names: Vec<&str> = sheets
            .iter()
            .filter(|s| Cycle::display_group(&s.name) == group)
            .map(|s| s.name.as_str())
            .collect();
        if names.is_empty() {
            continue;
        }
        println!("{group}:");
        for name in names {
            println!("  {name}");
        }
    }

    Ok(())
}

#[tracing::instrument(skip(state_file, json, csv, table), fields(sheet = %sheet_name))]
async fn analyze(
    state_file: &str,
    sheet_name: &str,
    json: Option<String>,
    csv: Option<String>,
    table: bool,
) -> Result<()> {
    let config = AppConfig::load(state_file)?;
    let source = sheets_client(&config)?;

    let gemini_key = std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?;
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    let extractor = GeminiClient::new(gemini_key, model);

    let session = Session::new();
    match session.load_sheet(&source, &extractor, sheet_name).await? {
        LoadOutcome::EmptySheet => {
            info!("Sheet has no rows, nothing to analyze");
            return Ok(());
        }
        LoadOutcome::Loaded => {}
    }

    let Some(snapshot) = session.snapshot().await else {
        error!("Load reported success but no snapshot is present");
        anyhow::bail!("internal error: missing snapshot after load");
    };

    let stats = aggregate(&snapshot.students, &snapshot.subjects, snapshot.cycle);
    let rankings = rank_cohort(&snapshot.students, &snapshot.subjects, &stats, snapshot.cycle);

    if let Some(path) = &csv {
        append_subject_rows(path, &snapshot.sheet_name, &stats)?;
        info!(path, "Subject statistics appended");
    }

    let report = ClassReport::new(&snapshot, stats, rankings);

    if let Some(path) = &json {
        std::fs::write(path, report.to_json()?)
            .with_context(|| format!("failed to write report to '{path}'"))?;
        info!(path, "JSON report written");
    }

    if table {
        println!("{}", render_table(&snapshot));
    }
    println!("{}", render_summary(&report));

    Ok(())
}
