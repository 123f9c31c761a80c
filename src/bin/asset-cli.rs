use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use asset_manager::blockchain::Account;

#[derive(Parser)]
#[command(name = "asset-cli")]
#[command(about = "Command line client for the asset manager", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an asset
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        unit: String,
        #[arg(long)]
        total: u64,
        #[arg(long, default_value_t = 0)]
        decimals: u32,
        #[arg(long)]
        default_frozen: bool,
        #[arg(long, default_value = "")]
        asset_url: String,
        #[arg(long, default_value = "")]
        metadata_hash: String,
        /// Manager address; empty leaves the asset without a manager
        #[arg(long, default_value = "")]
        manager: String,
        #[arg(long, default_value = "")]
        reserve: String,
        #[arg(long, default_value = "")]
        freeze: String,
        #[arg(long, default_value = "")]
        clawback: String,
    },
    /// Destroy an asset
    Destroy {
        asset_id: u64,
        #[arg(long, default_value = "")]
        manager: String,
    },
    /// List assets recorded for an address
    List { address: String },
    /// Check service and dependency health
    Health,
    /// Print the address of the mnemonic in an environment variable
    Address {
        #[arg(long, default_value = "ASSET_MANAGER_MNEMONIC")]
        mnemonic_env: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Create {
            name,
            unit,
            total,
            decimals,
            default_frozen,
            asset_url,
            metadata_hash,
            manager,
            reserve,
            freeze,
            clawback,
        } => {
            let body = json!({
                "assetName": name,
                "unitName": unit,
                "totalIssuance": total,
                "decimals": decimals,
                "defaultFrozen": default_frozen,
                "url": asset_url,
                "metadataHash": metadata_hash,
                "managerAddr": manager,
                "reserveAddr": reserve,
                "freezeAddr": freeze,
                "clawbackAddr": clawback,
            });
            let res = client
                .post(format!("{}/assets", cli.url))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Destroy { asset_id, manager } => {
            let body = json!({ "assetId": asset_id, "managerAddr": manager });
            let res = client
                .post(format!("{}/assets/destroy", cli.url))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::List { address } => {
            let res = client
                .get(format!("{}/assets/{}", cli.url, address))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Address { mnemonic_env } => {
            let phrase = std::env::var(&mnemonic_env)
                .map_err(|_| format!("environment variable '{}' is not set", mnemonic_env))?;
            let account = Account::from_mnemonic(&phrase)?;
            println!("{}", account.address());
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
    } else {
        eprintln!("Error: asset manager returned status {}", status);
        eprintln!("{}", rendered);
        std::process::exit(1);
    }
    Ok(())
}
