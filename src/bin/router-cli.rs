use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;

use scope_router::http::X_REQUEST_ID;

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Management CLI for the scope-aware router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Correlation id sent as the request id header
    #[arg(short, long)]
    request_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered route groups
    Routes,
    /// Show server build information
    Version,
    /// Run liveness checks
    Live {
        #[arg(long)]
        full: bool,
    },
    /// Run readiness checks
    Ready {
        #[arg(long)]
        full: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(id) = &cli.request_id {
        headers.insert(X_REQUEST_ID, HeaderValue::from_str(id)?);
    }

    let path = match cli.command {
        Commands::Routes => "/debug/routes".to_string(),
        Commands::Version => "/version".to_string(),
        Commands::Live { full } => probe_path("/live", full),
        Commands::Ready { full } => probe_path("/ready", full),
    };

    let res = client
        .get(format!("{}{}", cli.url.trim_end_matches('/'), path))
        .headers(headers)
        .send()
        .await?;
    print_response(res).await
}

fn probe_path(path: &str, full: bool) -> String {
    if full {
        format!("{path}?full=true")
    } else {
        path.to_string()
    }
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if let Some(id) = res.headers().get(X_REQUEST_ID).and_then(|v| v.to_str().ok()) {
        eprintln!("request id: {}", id);
    }

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }

    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        std::process::exit(1);
    }
    Ok(())
}
