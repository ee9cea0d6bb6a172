//! Chat router (v1)
//!
//! Serves the chat application's route table with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ axum server ─▶ request ID ─▶ dispatcher     │
//!                           │                                   │          │
//!                           │                                   ▼          │
//!                           │                          RouteTable.resolve  │
//!                           │                                   │          │
//!                           │                                   ▼          │
//!     Client Response       │                           View::call (room)  │
//!     ◀─────────────────────┼──────────── Respond | Defer ─────┘           │
//!                           │                                              │
//!                           │  config · observability · lifecycle          │
//!                           └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use chat_router::chat;
use chat_router::config::{load_config, ServerConfig};
use chat_router::lifecycle::startup;

#[derive(Parser)]
#[command(name = "chat-router")]
#[command(about = "Serve the chat application's URL routes", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Print the route table
    Routes {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct RouteEntry<'a> {
    pattern: &'a str,
    view: &'a str,
    name: Option<&'a str>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => startup::start(config).await?,
        Commands::Routes { json } => print_routes(json)?,
    }

    Ok(())
}

fn print_routes(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let table = chat::url_patterns()?;
    let entries: Vec<RouteEntry<'_>> = table
        .routes()
        .iter()
        .map(|r| RouteEntry {
            pattern: r.pattern().as_str(),
            view: r.view().name(),
            name: r.name(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for e in &entries {
            println!("{:<24} {:<16} {}", e.pattern, e.view, e.name.unwrap_or("-"));
        }
    }
    Ok(())
}
