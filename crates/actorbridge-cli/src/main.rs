//! Actorbridge - run provider-hosted actors from the command line
//!
//! ## Commands
//!
//! - `actors`: list actors available to the credential
//! - `schema`: show an actor's input schema and seeded default values
//! - `run`: execute an actor run and print its dataset

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use actorbridge_core::{
    Credential, FormCompiler, HttpExecutionClient, InputValueMap, PollConfig, ProviderConfig,
    RunLifecycleManager, SchemaModel,
};

#[derive(Parser)]
#[command(name = "actorbridge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run provider-hosted actors from the command line", long_about = None)]
struct Cli {
    /// Provider API token
    #[arg(long, env = "ACTORBRIDGE_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Provider API base URL
    #[arg(long, env = "ACTORBRIDGE_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List actors available to the credential
    Actors,

    /// Show an actor's input schema and seeded defaults
    Schema {
        /// Actor id, e.g. `acme~web-crawler`
        actor_id: String,
    },

    /// Execute an actor run and print its dataset as JSON
    Run {
        /// Actor id, e.g. `acme~web-crawler`
        actor_id: String,

        /// JSON file with input values; omitted fields fall back to schema
        /// defaults
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Wall-clock budget for the run, in seconds
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,

        /// Delay between status checks, in milliseconds
        #[arg(long, default_value_t = 2000)]
        poll_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let credential = Credential::new(cli.token.as_deref().unwrap_or_default())
        .context("a provider token is required (--token or ACTORBRIDGE_TOKEN)")?;
    let config = match &cli.base_url {
        Some(base_url) => ProviderConfig::new(base_url),
        None => ProviderConfig::default(),
    };
    let client = HttpExecutionClient::new(config, credential);

    match cli.command {
        Commands::Actors => list_actors(&client).await,
        Commands::Schema { actor_id } => show_schema(&client, &actor_id).await,
        Commands::Run {
            actor_id,
            input,
            timeout_secs,
            poll_ms,
        } => {
            let poll = PollConfig {
                timeout_budget: Duration::from_secs(timeout_secs),
                poll_interval: Duration::from_millis(poll_ms),
            };
            run_actor(client, &actor_id, input, poll).await
        }
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn list_actors(client: &HttpExecutionClient) -> Result<()> {
    let actors = client.list_actors().await?;
    if actors.is_empty() {
        println!("No actors available to this credential.");
        return Ok(());
    }
    for actor in actors {
        let source = match actor.source {
            actorbridge_core::ActorSource::User => "user",
            actorbridge_core::ActorSource::Public => "public",
        };
        let deprecated = if actor.is_deprecated {
            " (deprecated)"
        } else {
            ""
        };
        println!(
            "{:<20} {:<30} [{source}]{deprecated}",
            actor.id, actor.name
        );
        if let Some(description) = actor.description {
            println!("    {description}");
        }
    }
    Ok(())
}

async fn show_schema(client: &HttpExecutionClient, actor_id: &str) -> Result<()> {
    let raw = client.get_actor_schema(actor_id).await?;
    let schema = SchemaModel::from_value(&raw)?;

    println!("Input schema for {actor_id}:");
    for (name, descriptor) in schema.properties() {
        let required = if schema.is_required(name) { " *" } else { "" };
        let title = descriptor.title.as_deref().unwrap_or(name);
        println!(
            "  {name}{required}  ({})  {title}",
            descriptor.kind.type_name()
        );
        if let Some(description) = &descriptor.description {
            println!("      {description}");
        }
    }

    let defaults = FormCompiler::default_values(&schema);
    println!("\nSeeded defaults:");
    println!("{}", serde_json::to_string_pretty(&defaults)?);
    Ok(())
}

async fn run_actor(
    client: HttpExecutionClient,
    actor_id: &str,
    input_file: Option<PathBuf>,
    poll: PollConfig,
) -> Result<()> {
    let raw = client.get_actor_schema(actor_id).await?;
    let schema = SchemaModel::from_value(&raw)?;

    // Schema defaults first, then the user's file on top.
    let mut input = FormCompiler::default_values(&schema);
    if let Some(path) = input_file {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read input file {}", path.display()))?;
        let supplied: InputValueMap = serde_json::from_str(&text)
            .with_context(|| format!("input file {} must be a JSON object", path.display()))?;
        for (key, value) in supplied {
            input.insert(key, value);
        }
    }

    let errors = FormCompiler::validate(&schema, &input);
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("  {}: {}", error.field, error.detail);
        }
        bail!("input validation failed with {} error(s)", errors.len());
    }

    let manager = RunLifecycleManager::with_config(client, poll);
    let items = manager.execute(actor_id, input).await?;
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}
