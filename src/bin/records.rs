//! Records CLI
//!
//! Inspect declared schemas and print their default records.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use familiar_records::{Declarations, Instance, RecordsConfig, SchemaRegistry};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "records")]
#[command(about = "Inspect record schemas and their default data")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Declaration files (.json or .toml), loaded after the configured ones
    #[arg(short, long = "declarations", global = true)]
    declarations: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered schemas
    List,

    /// Show a schema's fields
    Show {
        /// Schema name
        schema: String,
    },

    /// Print the default data of a schema
    Defaults {
        /// Schema name
        schema: String,
    },

    /// Search schema names
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// View and manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration as TOML
    Show,

    /// Write a default config file
    Init {
        /// Output path
        #[arg(default_value = "records.toml")]
        output: String,
    },
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

fn run(cli: Cli) -> Result<()> {
    let config = RecordsConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    let registry = || load_registry(&config, &cli.declarations);

    match cli.command {
        Commands::List => {
            let registry = registry()?;
            if registry.is_empty() {
                println!("No schemas declared");
            }
            for schema in registry.schemas() {
                println!("{} ({} fields)", schema.name(), schema.len());
            }
        }

        Commands::Show { schema } => {
            let registry = registry()?;
            let schema = registry.require(&schema)?;
            println!("{}", schema.name());
            for (name, spec) in schema.fields() {
                println!("  {}: {}", name, spec);
            }
        }

        Commands::Defaults { schema } => {
            let registry = registry()?;
            let instance = Instance::create(registry.require(&schema)?);
            let data = instance.export(&config.export_options());
            println!("{}", config.export.output_format.render(&data)?);
        }

        Commands::Search { query, limit } => {
            let registry = registry()?;
            let results = registry.search(&query, limit);
            if results.is_empty() {
                println!("No schemas match '{}'", query);
            }
            for schema in results {
                println!("{}", schema.name());
            }
        }

        Commands::Config { command } => run_config(&command, &config)?,
    }

    Ok(())
}

fn run_config(command: &ConfigCommands, config: &RecordsConfig) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            println!("{}", toml::to_string_pretty(config)?);
        }
        ConfigCommands::Init { output } => {
            RecordsConfig::default()
                .save(output)
                .with_context(|| format!("writing {}", output))?;
            println!("Created config file: {}", output);
        }
    }
    Ok(())
}

fn load_registry(config: &RecordsConfig, extra: &[PathBuf]) -> Result<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    for path in config.declaration_paths().iter().chain(extra) {
        Declarations::from_path(path)
            .and_then(|decls| decls.register_into(&mut registry))
            .with_context(|| format!("loading declarations from {}", path.display()))?;
    }
    Ok(registry)
}
