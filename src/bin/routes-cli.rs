use std::path::PathBuf;

use axum::http::Method;
use clap::{Parser, Subcommand};
use serde_json::json;

use radix_router::config::load_config;
use radix_router::context::Params;
use radix_router::lifecycle::build_router;
use radix_router::routing::Lookup;

#[derive(Parser)]
#[command(name = "routes-cli")]
#[command(about = "Inspect a radix-router route table", long_about = None)]
struct Cli {
    /// Route table to load
    #[arg(short, long, default_value = "router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every route as {method, path, name} JSON
    Export,
    /// Show which route a request would reach
    Resolve {
        /// HTTP method, e.g. GET
        method: String,
        /// Request path, e.g. /users/42
        path: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let router = build_router(&config.routes)?;

    match cli.command {
        Commands::Export => {
            println!("{}", router.export_json()?);
        }
        Commands::Resolve { method, path } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let mut params = Params::new();
            let report = match router.find(&method, &path, &mut params) {
                Lookup::Found(found) => json!({
                    "outcome": "found",
                    "method": found.route().method().as_str(),
                    "pattern": found.route().pattern(),
                    "name": found.name(),
                    "params": params
                        .iter()
                        .map(|(k, v)| (k.to_string(), json!(v)))
                        .collect::<serde_json::Map<_, _>>(),
                }),
                Lookup::MethodNotAllowed { allowed } => json!({
                    "outcome": "method_not_allowed",
                    "allowed": allowed.iter().map(Method::as_str).collect::<Vec<_>>(),
                }),
                Lookup::NotFound => json!({ "outcome": "not_found" }),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
