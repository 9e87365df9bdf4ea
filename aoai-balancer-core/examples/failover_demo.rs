//! Failover Demo - one chat message through the configured deployments
//!
//! Reads `AZURE_OPENAI_ENDPOINTS`, `AZURE_OPENAI_KEYS` and the optional
//! deployment settings from the environment, then sends a single message.
//! Set `RUST_LOG=aoai_balancer_core=debug` to watch each attempt.
//!
//! Run with: cargo run --example failover_demo -- "Tell me a joke"

use anyhow::Context;
use aoai_balancer_core::config;
use aoai_balancer_core::{ChatCompletionRequest, ChatMessage, ChatService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Say hello in one short sentence.".to_string());

    let config = config::load_from_env().context("Failed to load configuration")?;
    println!("Deployment: {}", config.deployment_name);
    for endpoint in config.describe_endpoints() {
        println!("  endpoint: {}", endpoint);
    }

    let service = ChatService::from_config(&config)?;
    let request = ChatCompletionRequest::new(vec![
        ChatMessage::system("You are a concise assistant."),
        ChatMessage::user(prompt),
    ])
    .with_max_tokens(200);

    match service.post_message(&request).await {
        Ok(content) => println!("\n{}", content),
        Err(err) => {
            println!("\nRequest failed ({:?}): {}", err.classification(), err);
            if let Some(code) = err.application_code() {
                println!("  application code: {}", code);
            }
            if let Some(status) = err.status_code() {
                println!("  status: {}", status);
            }
        }
    }

    Ok(())
}
