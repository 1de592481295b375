use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use location_explorer::api::AppState;
use location_explorer::models::decode_data_uri;
use location_explorer::{
    ExplorerConfig, GeminiClient, GenerationClient, SearchController, SearchState, logging, web,
};

#[derive(Parser)]
#[command(name = "explorer")]
#[command(about = "Discover the world, one search at a time")]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "EXPLORER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the single-page explorer and its JSON API
    Serve {
        /// Port to listen on, overrides the configuration
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Look up one location and print the result
    Search {
        /// Place to explore, defaults to the configured initial query
        query: Option<String>,

        /// Print the session state as JSON
        #[arg(long)]
        json: bool,

        /// Write the generated image to this file
        #[arg(long)]
        save_image: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config =
        ExplorerConfig::load_from_path(cli.config).context("Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose)?;

    let client: Arc<dyn GenerationClient> = Arc::new(
        GeminiClient::new(&config.gemini).context("Failed to create Gemini client")?,
    );

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let state = AppState::new(client, config.defaults.clone());
            web::run(&config.server, state).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Search {
            query,
            json,
            save_image,
        } => {
            let query = query.unwrap_or_else(|| config.defaults.initial_query.clone());
            let controller = SearchController::new(client);

            if !json && !query.trim().is_empty() {
                eprint!("{}", SearchState::Loading { query: query.trim().to_string() });
            }
            let state = controller.submit(&query).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                print!("{state}");
            }

            if let (Some(path), Some(data)) = (save_image, state.data()) {
                let (_, bytes) = decode_data_uri(&data.image_url)?;
                std::fs::write(&path, bytes)
                    .with_context(|| format!("Failed to write image to {}", path.display()))?;
                eprintln!("Image saved to {}", path.display());
            }

            Ok(if state.error_message().is_some() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}
