use anyhow::Context;
use clap::{Parser, Subcommand};
use figment::providers::Serialized;
use rankboard_server::logging::configure_logging;
use rankboard_server::{open_context, serve, ServerConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "rankboard", version, about = "Kanban boards with drag-and-drop ordering")]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Enable trace logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Create the database and its schema, then exit
    InitDb,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<ServerConfig> {
        let mut figment = ServerConfig::figment(self.config.as_deref())?;
        if let Some(database) = &self.database {
            figment = figment.merge(Serialized::default("database", database));
        }
        if let Some(Commands::Serve { host, port }) = &self.command {
            if let Some(host) = host {
                figment = figment.merge(Serialized::default("host", host));
            }
            if let Some(port) = port {
                figment = figment.merge(Serialized::default("port", port));
            }
        }
        figment.extract().context("invalid configuration")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    configure_logging(cli.verbose, cli.debug, cli.quiet);

    let config = cli.load_config()?;

    match cli.command {
        Some(Commands::InitDb) => {
            open_context(&config)
                .with_context(|| format!("failed to open {}", config.database.display()))?;
            info!(database = %config.database.display(), "database ready");
            Ok(())
        }
        Some(Commands::Serve { .. }) | None => serve(&config).await,
    }
}
