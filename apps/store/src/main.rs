//! MedicationRequest store - command line entry point
//!
//! Opens the configured PostgreSQL database, runs one repository operation and
//! prints the result as JSON on stdout. Failures are printed as a FHIR
//! OperationOutcome and reflected in the exit code.

use anyhow::Context;
use clap::{Parser, Subcommand};
use medreq_models::{FhirResource, MedicationRequest};
use medreq_store::{
    config::Config,
    db::{DocumentDatabase, MedicationRequestRepository, PgDatabase},
    logging, Error,
};
use serde_json::{json, Value as JsonValue};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "medreq-store", version, about = "MedicationRequest document store")]
struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply database migrations
    Migrate,
    /// Count stored MedicationRequests
    Count,
    /// Read a MedicationRequest by id
    Get { id: String },
    /// Search with name=value parameters (e.g. status=active patient=p1)
    Search { params: Vec<String> },
    /// Create a MedicationRequest from a JSON file
    Create {
        /// Id to store under; defaults to the resource's id or a new UUID
        #[arg(long)]
        id: Option<String>,
        file: PathBuf,
    },
    /// Create or replace a MedicationRequest from a JSON file
    Update { id: String, file: PathBuf },
    /// Delete a MedicationRequest
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config =
        Config::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let _log_guard =
        logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        collection = %config.store.collection,
        "Starting medreq-store"
    );

    // `migrate` always migrates; other commands follow configuration
    if matches!(cli.command, Command::Migrate) {
        config.database.run_migrations = true;
    }

    let db = PgDatabase::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    let repo = MedicationRequestRepository::with_collection(db.clone(), &config.store.collection);
    let result = run(&repo, cli.command).await;

    db.close().await;

    match result {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!(error = %e, status = e.status_code(), "Command failed");
            println!("{}", serde_json::to_string_pretty(&e.operation_outcome())?);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run<D: DocumentDatabase>(
    repo: &MedicationRequestRepository<D>,
    command: Command,
) -> medreq_store::Result<JsonValue> {
    match command {
        Command::Migrate => Ok(json!({ "migrated": true })),
        Command::Count => Ok(json!({ "count": repo.count().await? })),
        Command::Get { id } => match repo.search_by_id(&id).await? {
            Some(resource) => Ok(resource.to_document()?),
            None => Ok(JsonValue::Null),
        },
        Command::Search { params } => {
            let params = parse_params(&params)?;
            let found = repo.search(&params).await?;
            let documents = found
                .iter()
                .map(|r| r.to_document())
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(json!({ "total": documents.len(), "entry": documents }))
        }
        Command::Create { id, file } => {
            let resource = read_resource(&file).await?;
            let id = id
                .or_else(|| resource.id().map(str::to_string))
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let id = repo.create(&id, resource).await?;
            Ok(json!({ "id": id }))
        }
        Command::Update { id, file } => {
            let resource = read_resource(&file).await?;
            let outcome = repo.update(&id, resource).await?;
            Ok(serde_json::to_value(outcome)?)
        }
        Command::Delete { id } => {
            repo.remove(&id).await?;
            Ok(json!({ "deleted": id }))
        }
    }
}

fn parse_params(raw: &[String]) -> medreq_store::Result<Vec<(String, String)>> {
    raw.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| Error::InvalidSearch(format!("expected name=value, got '{pair}'")))
        })
        .collect()
}

async fn read_resource(path: &Path) -> medreq_store::Result<MedicationRequest> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::InvalidResource(format!("cannot read {}: {e}", path.display())))?;
    let document: JsonValue = serde_json::from_str(&content)?;
    Ok(MedicationRequest::from_document(document)?)
}
