use clap::{Parser, Subcommand};
use graft_core::{DemoPlugin, PluginError, PluginHost, PluginManifest};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "graft-cli", version)]
struct Cli {
    /// Plugin manifests to load before running the command
    #[arg(long = "manifest", value_name = "PATH", global = true)]
    manifests: Vec<PathBuf>,

    /// Skip the built-in demo plugin
    #[arg(long, global = true)]
    no_demo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List loaded plugins
    Plugins,
    /// Print the merged command grammar
    Grammar,
    /// Run the init pass and print plugin announcements
    Init,
    /// Dispatch a command line to the owning plugin
    Run {
        /// The command line, as words
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Validate a plugin manifest without loading it
    Check {
        /// Path to the manifest
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        manifests,
        no_demo,
        command,
    } = cli;

    match command {
        Commands::Check { path } => {
            let content = tokio::fs::read_to_string(&path).await?;
            let manifest: PluginManifest = toml::from_str(&content)?;
            manifest.validate().map_err(PluginError::InvalidManifest)?;
            println!("{} {}: ok", manifest.name, manifest.version);
            Ok(())
        }
        command => {
            let host = build_host(&manifests, no_demo).await?;
            execute(&host, command).await
        }
    }
}

async fn build_host(manifests: &[PathBuf], no_demo: bool) -> Result<PluginHost, PluginError> {
    let host = PluginHost::new();
    if !no_demo {
        host.register_plugin(Arc::new(DemoPlugin::new()))?;
    }
    for path in manifests {
        host.load_plugin(path).await?;
    }
    Ok(host)
}

async fn execute(host: &PluginHost, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Plugins => {
            let plugins = host.list_plugins();
            if plugins.is_empty() {
                println!("No plugins loaded.");
            } else {
                for entry in plugins {
                    println!(
                        "{}  {} {}  [{}]",
                        entry.id, entry.manifest.name, entry.manifest.version, entry.state
                    );
                }
            }
        }
        Commands::Grammar => {
            let grammar = host.grammar()?;
            if grammar.is_empty() {
                println!("No commands registered.");
            } else {
                for entry in grammar.entries() {
                    println!("{}  {}", entry.plugin_id, entry.spec);
                }
            }
        }
        Commands::Init => {
            for line in host.announce().await? {
                println!("{}", line);
            }
        }
        Commands::Run { words } => {
            let line = words.join(" ");
            let outcome = host.dispatch(&line).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if !outcome.success {
                std::process::exit(1);
            }
        }
        // Handled in run() before the host is built.
        Commands::Check { .. } => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_host_with_demo() {
        let host = build_host(&[], false).await.unwrap();
        let plugins = host.list_plugins();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].manifest.name, "demo");

        // The demo plugin contributes an empty grammar.
        assert!(host.grammar().unwrap().is_empty());

        let lines = host.announce().await.unwrap();
        assert_eq!(lines, vec!["demo 1.0.0 loaded.".to_string()]);
    }

    #[tokio::test]
    async fn test_build_host_without_demo() {
        let host = build_host(&[], true).await.unwrap();
        assert!(host.list_plugins().is_empty());
    }
}
