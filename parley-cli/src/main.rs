// ABOUTME: One-shot command that sends a prompt to a provider and prints the answer.
// ABOUTME: Reads credentials from the environment (and .env), logs to stderr.

use anyhow::Result;
use clap::Parser;

use parley::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "parley-cli")]
#[command(version, about = "Send one prompt to an LLM provider and print the answer", long_about = None)]
struct Args {
    /// Provider identifier: openai, anthropic, gemini or openrouter
    provider: String,

    /// Model to use instead of the provider default
    #[arg(long)]
    model: Option<String>,

    /// System prompt
    #[arg(long)]
    system: Option<String>,

    /// Output token limit
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f64>,

    /// Print the normalized response as JSON
    #[arg(long)]
    json: bool,

    /// Prompt text; words are joined with spaces
    #[arg(required = true)]
    prompt: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Loads .env once, before logging reads its variables.
    let config = ClientConfig::from_env()?;
    init_logging(&LoggingConfig::from_env()?);

    let mut request = Request::for_provider(&args.provider, args.prompt.join(" "))?;
    if let Some(model) = args.model {
        request = request.model(model);
    }
    if let Some(system) = args.system {
        request = request.system(system);
    }
    if let Some(max_tokens) = args.max_tokens {
        request = request.max_tokens(max_tokens);
    }
    if let Some(temperature) = args.temperature {
        request = request.temperature(temperature);
    }

    let client = ApiClient::new(config)?;

    let response = client.complete(&request).await?;
    if response.status != Status::Ok {
        tracing::warn!(status = ?response.status, "response did not finish normally");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.text);
    }

    Ok(())
}
