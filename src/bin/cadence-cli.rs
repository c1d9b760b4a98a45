use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use cadence_demo::config::{load_config, ConfigurationSet, DemoConfig};
use cadence_demo::http::{HealthResponse, X_REQUEST_ID};

#[derive(Parser)]
#[command(name = "cadence-cli")]
#[command(about = "Management CLI for the Enhanced CADENCE demo", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the health endpoint of a running demo
    Health {
        #[arg(short, long, default_value = "http://localhost:8000")]
        url: String,
    },
    /// Print the provisioned option table
    Options {
        /// Config file whose `[environment]` overrides are applied
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Health { url } => {
            let res = reqwest::Client::new()
                .get(format!("{}/health", url.trim_end_matches('/')))
                .send()
                .await?;
            print_health(res).await?;
        }
        Commands::Options { config } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => DemoConfig::default(),
            };
            let options = ConfigurationSet::provision(&config.environment);
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
    }

    Ok(())
}

async fn print_health(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let request_id = res
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if !status.is_success() {
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Err(format!("health endpoint returned status {}", status).into());
    }

    let health: HealthResponse = res.json().await?;
    let mut json: Value = serde_json::to_value(&health)?;
    if let (Some(id), Some(map)) = (request_id, json.as_object_mut()) {
        map.insert("request_id".to_string(), Value::String(id));
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
