use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use casetrack::{router, AppState};
use casetrack_core::ingestion::{
    prepare_import, read_upload, run_import, skipped_warning, LoadedUpload,
};
use casetrack_core::{PostgresCaseRepository, Settings};
use casetrack_import::CaseRecord;
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about = "Litigation case import tooling and API server", long_about = None)]
struct Cli {
    /// Path to a TOML settings file (defaults to ./casetrack.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a case register and print what would be imported
    Check(CheckArgs),
    /// Import a case register into the database
    Import(ImportArgs),
    /// Run database migrations
    Migrate,
    /// Start the HTTP API server
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Spreadsheet or CSV file to inspect
    path: PathBuf,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// Spreadsheet or CSV file to import
    path: PathBuf,
    /// Id of the user who will own the imported cases
    #[arg(long)]
    owner: Uuid,
    /// Skip running migrations before importing
    #[arg(long)]
    skip_migrations: bool,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Address to listen on (overrides configuration)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;

    match cli.command {
        Command::Check(args) => handle_check(&settings, args),
        Command::Import(args) => handle_import(&settings, args).await,
        Command::Migrate => {
            let repository = connect(&settings).await?;
            repository.run_migrations().await?;
            info!("Database migrations applied");
            Ok(())
        }
        Command::Serve(args) => handle_serve(&settings, args).await,
    }
}

async fn connect(settings: &Settings) -> Result<PostgresCaseRepository> {
    let database_url = settings.require_database_url()?;
    PostgresCaseRepository::connect(database_url, settings.max_connections)
        .await
        .context("failed to connect to database")
}

fn load_upload(path: &Path) -> Result<LoadedUpload> {
    read_upload(path).with_context(|| format!("failed to load {}", path.display()))
}

fn handle_check(settings: &Settings, args: CheckArgs) -> Result<()> {
    let upload = load_upload(&args.path)?;
    let prepared = prepare_import(upload.as_upload(), &settings.parse_options())?;

    println!("{}", preview_table(&prepared.batch.records));
    println!(
        "{} cases ready to import (file hash {})",
        prepared.batch.len(),
        prepared.file_hash
    );
    if let Some(warning) = skipped_warning(prepared.batch.skipped) {
        println!("{warning}");
    }
    Ok(())
}

async fn handle_import(settings: &Settings, args: ImportArgs) -> Result<()> {
    let upload = load_upload(&args.path)?;
    let repository = connect(settings).await?;
    if args.skip_migrations {
        warn!("Skipping migrations before import");
    } else {
        repository.run_migrations().await?;
    }

    let report = run_import(
        upload.as_upload(),
        args.owner,
        &repository,
        &settings.parse_options(),
    )
    .await?;

    println!("Imported {} cases from {}", report.inserted, report.file_name);
    if let Some(warning) = report.warning {
        println!("{warning}");
    }
    Ok(())
}

async fn handle_serve(settings: &Settings, args: ServeArgs) -> Result<()> {
    let repository = connect(settings).await?;
    repository.run_migrations().await?;

    let state = AppState::new(Arc::new(repository), settings.parse_options());
    let bind = args.bind.unwrap_or_else(|| settings.bind_address.clone());
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state).into_make_service()).await?;
    Ok(())
}

fn preview_table(records: &[CaseRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Sr. No.",
        "Parties",
        "Forum",
        "Start",
        "Next hearing",
        "Amount",
    ]);
    for record in records {
        table.add_row(vec![
            record.serial_number.to_string(),
            record.parties.clone(),
            record.forum.clone(),
            format_date(record.start_date),
            format_date(record.next_hearing_date),
            record
                .amount_involved
                .map(|amount| format!("{amount:.2}"))
                .unwrap_or_default(),
        ]);
    }
    table
}

fn format_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
