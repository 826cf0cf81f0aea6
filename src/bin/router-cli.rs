use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Management CLI for the API router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, env = "ROUTER_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show route table status
    Status,
    /// List the route table, grouped by method and path length
    Routes,
    /// Rediscover routes and replace the cached table
    Rebuild,
    /// Show which handler a request would reach
    Resolve {
        /// HTTP method, e.g. GET
        method: String,
        /// Path below the API prefix, e.g. /Users/123
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let res = match cli.command {
        Commands::Status => {
            client.get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Routes => {
            client.get(format!("{}/admin/routes", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Rebuild => {
            client.post(format!("{}/admin/routes/rebuild", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Resolve { method, path } => {
            client.get(format!("{}/admin/routes/resolve", cli.url))
                .query(&[("method", method), ("path", path)])
                .headers(headers)
                .send()
                .await?
        }
    };
    print_response(res).await?;

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
