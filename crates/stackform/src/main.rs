//! stackform CLI
//!
//! Thin wrapper over `stackform-cloud`: loads a topology, builds the plan,
//! optionally executes it. All the interesting work happens in the library
//! crates.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use stackform_cloud::{
    build_plan, synthesize, CancellationToken, CloudError, CloudProvider, DryRunProvider,
    SynthesisOutcome,
};
use stackform_core::ResourceDescriptor;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stackform")]
#[command(about = "Compile a declarative topology into ordered provider calls", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the topology and build the plan without executing anything
    Validate {
        /// Topology file (default: discovered topology.kdl)
        topology: Option<PathBuf>,
    },
    /// Show the ordered synthesis plan
    Plan {
        /// Topology file (default: discovered topology.kdl)
        topology: Option<PathBuf>,
    },
    /// Execute the plan, rolling back created resources on failure
    Up {
        /// Topology file (default: discovered topology.kdl)
        topology: Option<PathBuf>,
        /// Provider to execute against
        #[arg(short, long, env = "STACKFORM_PROVIDER", default_value = "dry-run")]
        provider: String,
        /// Print the handle mapping as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout stays clean for plan/handle output
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Validate { topology } => cmd_validate(topology),
        Commands::Plan { topology } => cmd_plan(topology),
        Commands::Up {
            topology,
            provider,
            json,
        } => cmd_up(topology, &provider, json).await,
    }
}

fn load_descriptors(topology: Option<PathBuf>) -> anyhow::Result<Vec<ResourceDescriptor>> {
    let path = match topology {
        Some(path) => path,
        None => stackform_core::find_topology_file()?,
    };
    stackform_core::load_topology(&path)
        .with_context(|| format!("failed to load {}", path.display()))
}

fn select_provider(name: &str) -> Result<Box<dyn CloudProvider>, CloudError> {
    match name {
        "dry-run" => Ok(Box::new(DryRunProvider::new())),
        other => Err(CloudError::ProviderNotFound(other.to_string())),
    }
}

fn cmd_validate(topology: Option<PathBuf>) -> anyhow::Result<()> {
    let descriptors = load_descriptors(topology)?;
    let plan = build_plan(&descriptors)?;
    println!(
        "{} topology is valid: {}",
        "✓".green(),
        plan.summary()
    );
    Ok(())
}

fn cmd_plan(topology: Option<PathBuf>) -> anyhow::Result<()> {
    let descriptors = load_descriptors(topology)?;
    let plan = build_plan(&descriptors)?;

    for (index, step) in plan.iter().enumerate() {
        let refs = if step.references.is_empty() {
            String::new()
        } else {
            format!(
                " (after {})",
                step.references
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        };
        println!(
            "{:>3}. {} {}{}",
            index + 1,
            step.kind.to_string().cyan(),
            step.name.bold(),
            refs.dimmed()
        );
    }
    println!("\n{}", plan.summary().to_string().green());
    Ok(())
}

async fn cmd_up(topology: Option<PathBuf>, provider: &str, json: bool) -> anyhow::Result<()> {
    let descriptors = load_descriptors(topology)?;
    let provider = select_provider(provider)?;
    let cancel = CancellationToken::new();

    match synthesize(&descriptors, provider.as_ref(), &cancel).await? {
        SynthesisOutcome::Completed { handles } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&handles.as_map())?);
            } else {
                for handle in handles.iter() {
                    println!(
                        "{} {} {} {}",
                        "✓".green(),
                        handle.kind.to_string().cyan(),
                        handle.name.bold(),
                        handle.id.dimmed()
                    );
                }
                println!("\n{}", format!("{} resources created", handles.len()).green());
            }
            Ok(())
        }
        SynthesisOutcome::RolledBack { error, report } => {
            eprintln!("{} {}", "✗".red(), error.to_string().red());
            eprintln!("rollback: {report}");
            for entry in report.failed_entries() {
                eprintln!(
                    "  {} {} ({}) was not cleaned up",
                    "!".yellow(),
                    entry.name,
                    entry.handle_id
                );
            }
            anyhow::bail!("synthesis failed and was rolled back");
        }
    }
}
