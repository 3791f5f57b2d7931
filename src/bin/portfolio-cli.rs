use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "portfolio-cli")]
#[command(about = "Query a running portfolio aggregator", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Value one or more wallets, given as CHAIN:ADDRESS
    Query {
        #[arg(required = true)]
        wallets: Vec<String>,
    },
    /// Check aggregator liveness
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Query { wallets } => {
            let wallets = wallets
                .iter()
                .map(|w| parse_wallet(w))
                .collect::<Result<Vec<_>, _>>()?;
            let res = client
                .post(format!("{}/api/portfolio", cli.url))
                .json(&json!({ "wallets": wallets }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn parse_wallet(arg: &str) -> Result<Value, String> {
    match arg.split_once(':') {
        Some((chain, address)) if !chain.is_empty() && !address.is_empty() => {
            Ok(json!({ "chain": chain, "address": address }))
        }
        _ => Err(format!("expected CHAIN:ADDRESS, got '{}'", arg)),
    }
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: aggregator returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
