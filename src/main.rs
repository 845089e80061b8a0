// SPDX-License-Identifier: MIT

use anyhow::Context;
use campaign_rs::adk::agent::Agent;
use campaign_rs::adk::run::Run;
use campaign_rs::adk::tool::describe;
use campaign_rs::campaign::app::Campaign;
use campaign_rs::campaign::config::Settings;
use campaign_rs::campaign::server;
use campaign_rs::campaign::workflow::PromotionState;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the tools with their input and output schemas
    Tools,
    /// Invoke one tool directly
    Call {
        /// Tool id, e.g. search-products
        tool: String,

        /// JSON argument object
        #[arg(short, long, default_value = "{}")]
        input: String,
    },
    /// Run the promotion workflow
    Workflow {
        /// JSON trigger, e.g. {"promotionName": "...", "productIds": [...]}
        #[arg(short, long)]
        input: String,
    },
    /// Send one prompt to an agent and print its answer and scores
    Agent {
        /// Agent name, e.g. promotion-agent
        name: String,

        /// The prompt to send
        #[arg(short, long)]
        prompt: String,
    },
    /// Score a saved run transcript with an agent's scorers
    Score {
        #[arg(short, long)]
        agent: String,

        /// Path to a JSON run transcript
        #[arg(short, long)]
        run: String,
    },
    /// Start the HTTP server
    Serve {
        /// Overrides server.port from settings
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn parse_json(label: &str, text: &str) -> anyhow::Result<Value> {
    serde_json::from_str(text).with_context(|| format!("--{} is not valid JSON", label))
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let settings = Settings::load().context("failed to load settings")?;
    let campaign = Campaign::from_settings(settings).await?;

    match args.command {
        Commands::Tools => {
            let tools: Vec<Value> = campaign
                .registry()
                .list()
                .await
                .iter()
                .map(|t| describe(t.as_ref()))
                .collect();
            print_json(&json!(tools))?;
        }
        Commands::Call { tool, input } => {
            let input = parse_json("input", &input)?;
            let result = campaign.call_tool(&tool, input).await?;
            print_json(&result)?;
        }
        Commands::Workflow { input } => {
            let input = parse_json("input", &input)?;
            let result = campaign.run_workflow(input).await;
            println!("State: {:?}", PromotionState::of(&result));
            let result = result?;
            print_json(&serde_json::to_value(&result)?)?;
        }
        Commands::Agent { name, prompt } => {
            let agent = campaign.agent(&name)?;
            log::info!("Sending prompt to {}", agent.name());
            let mut response = agent.run(prompt).await?;
            println!("{}\n", response.text);
            let scores = response.scores().await;
            print_json(&serde_json::to_value(&scores)?)?;
        }
        Commands::Score { agent, run } => {
            let content = std::fs::read_to_string(&run)
                .with_context(|| format!("cannot read run transcript {}", run))?;
            let run: Run = serde_json::from_str(&content).context("malformed run transcript")?;
            let outcomes = campaign.score(&agent, &run).await?;
            print_json(&serde_json::to_value(&outcomes)?)?;
        }
        Commands::Serve { port } => {
            let listen = &campaign.settings().server;
            let host: std::net::IpAddr = listen
                .host
                .parse()
                .with_context(|| format!("invalid server.host '{}'", listen.host))?;
            let addr = SocketAddr::new(host, port.unwrap_or(listen.port));
            server::serve(Arc::new(campaign), addr).await?;
        }
    }

    Ok(())
}
