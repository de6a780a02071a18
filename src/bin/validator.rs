//! Schema Validator CLI
//!
//! Works directly on a registry database file: inspect schemas, manage
//! versions and validate values without running the server.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use schema_registry::{Definition, RegistryConfig, SchemaStore, Service};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-validator")]
#[command(about = "Inspect, edit and validate against a schema registry database")]
struct Cli {
    /// Path to a config file
    #[arg(short, long)]
    config: Option<String>,

    /// Path to database (overrides config)
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered schema types
    Types,

    /// List schema ids
    List,

    /// Print a schema
    Get {
        id: String,
        /// Specific version (default: latest)
        #[arg(short, long)]
        version: Option<u64>,
    },

    /// List the stored versions of a schema
    History { id: String },

    /// Create a schema from a JSON definition file
    Create {
        id: String,
        #[arg(value_name = "TYPE")]
        schema_type: String,
        def: PathBuf,
    },

    /// Append a new version from a JSON definition file
    Update { id: String, def: PathBuf },

    /// Delete a schema and its history
    Delete { id: String },

    /// Validate an encoded value file against the latest version
    Validate { id: String, input: PathBuf },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn read_def(path: &Path) -> anyhow::Result<Definition> {
    let content = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_slice(&content).with_context(|| format!("parse {}", path.display()))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = RegistryConfig::load_from(cli.config.as_deref())?;
    let db_path = cli.db.unwrap_or(config.storage.path.clone());
    let store = SchemaStore::open(&db_path)?;
    let service = Service::with_compilers(store, config.dialects.compilers());

    match cli.command {
        Commands::Types => {
            for t in service.types() {
                println!("{}", t);
            }
        }

        Commands::List => {
            for id in service.list()? {
                println!("{}", id);
            }
        }

        Commands::Get { id, version } => {
            let schema = match version {
                Some(v) => service.get_version(&id, v)?,
                None => service.get(&id)?,
            };
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }

        Commands::History { id } => {
            for v in service.versions(&id)? {
                let schema = service.get_version(&id, v)?;
                println!("v{}  {}", schema.version, schema.time.to_rfc3339());
            }
        }

        Commands::Create { id, schema_type, def } => {
            let schema = service.create(&id, &schema_type, read_def(&def)?)?;
            println!("✅ Created {} v{} ({})", schema.id, schema.version, schema.schema_type);
        }

        Commands::Update { id, def } => {
            let schema = service.update(&id, read_def(&def)?)?;
            println!("✅ Updated {} to v{}", schema.id, schema.version);
        }

        Commands::Delete { id } => {
            service.delete(&id)?;
            println!("✅ Deleted {}", id);
        }

        Commands::Validate { id, input } => {
            let value = std::fs::read(&input).with_context(|| format!("read {}", input.display()))?;
            let violations = service.validate(&id, &value)?;

            if violations.is_empty() {
                println!("✅ Value conforms to {}", id);
            } else {
                println!("❌ {} violation(s):", violations.len());
                for v in &violations {
                    println!("   └─ {}", v);
                }
                bail!("value does not conform to {}", id);
            }
        }
    }

    Ok(())
}
