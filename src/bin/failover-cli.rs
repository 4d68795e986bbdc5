use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::json;

use floating_failover::config::{ConfigArgs, Validated};
use floating_failover::health::{EndpointSet, HealthProbe, HttpProbe};
use floating_failover::ownership::{DigitalOceanClient, OwnershipClient};

#[derive(Parser)]
#[command(name = "failover-cli")]
#[command(about = "Operator tooling for the floating IP failover controller", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one health check against a '|'-separated URL list
    Probe {
        urls: String,

        /// Host header override
        #[arg(long)]
        host: Option<String>,

        #[arg(long, default_value_t = 20)]
        timeout_secs: u64,
    },
    /// Report whether this droplet holds the floating IP
    Owner,
    /// Validate the configuration and print the effective settings
    Validate,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Probe {
            urls,
            host,
            timeout_secs,
        } => {
            let endpoints = EndpointSet::parse(&urls, host)?;
            let probe = HttpProbe::new(Duration::from_secs(timeout_secs))?;
            let healthy = probe.check(&endpoints).await;
            print_json(json!({ "endpoints": endpoints.to_string(), "healthy": healthy }))?;
            Ok(if healthy { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Owner => {
            let Validated::Enabled(config) = cli.config.resolve()? else {
                eprintln!("Error: failover mode is not set");
                return Ok(ExitCode::FAILURE);
            };
            let client = DigitalOceanClient::new(&config.authority, config.api_key.clone())?;
            let floating_ip = &config.controller.resource_id;
            let droplet_id = client.droplet_id().await?;
            let owned = client.is_owned_by_this_node(floating_ip).await?;
            print_json(json!({
                "floating_ip": floating_ip,
                "droplet_id": droplet_id,
                "owned": owned,
            }))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate => match cli.config.resolve() {
            Ok(Validated::Disabled) => {
                println!("failover disabled (mode not set)");
                Ok(ExitCode::SUCCESS)
            }
            Ok(Validated::Enabled(config)) => {
                println!("{:#?}", config);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                Ok(ExitCode::FAILURE)
            }
        },
    }
}

fn print_json(value: serde_json::Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
