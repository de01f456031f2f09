//! llm-batch - send chat prompts, optionally through the batching engine

#![allow(missing_docs)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use futures::future::join_all;
use llm_batch::{ChatMessage, ChatOptions, Config, LlmBatch, system_message, user_message};
use serde_json::json;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "llm-batch", version, about = "Send chat prompts with transparent batching")]
struct Cli {
    /// Provider to send prompts to
    #[arg(short, long, default_value = "openai")]
    provider: String,

    /// Model override; the provider's default model is used otherwise
    #[arg(short, long)]
    model: Option<String>,

    /// Route all prompts through the batching engine concurrently
    #[arg(short, long)]
    batch: bool,

    /// YAML configuration file
    #[arg(short, long, env = "LLM_BATCH_CONFIG")]
    config: Option<PathBuf>,

    /// System message prepended to every prompt
    #[arg(long)]
    system: Option<String>,

    #[arg(long)]
    temperature: Option<f32>,

    #[arg(long)]
    max_tokens: Option<u32>,

    /// Prompts to send, one request each
    #[arg(required = true)]
    prompts: Vec<String>,
}

impl Cli {
    fn options(&self) -> ChatOptions {
        let mut options = ChatOptions::new().with_batch(self.batch);
        options.model = self.model.clone();
        options.temperature = self.temperature;
        options.max_tokens = self.max_tokens;
        options
    }

    fn messages(&self, prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system {
            messages.push(system_message(system.as_str()));
        }
        messages.push(user_message(prompt));
        messages
    }
}

async fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::from_env()?);
    };
    let mut config = Config::from_file(path)
        .await
        .with_context(|| format!("loading {}", path.display()))?;
    config.apply_env()?;
    config.validate()?;
    Ok(config)
}

/// Returns whether every prompt succeeded
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = load_config(cli.config.as_ref()).await?;
    llm_batch::utils::init_logging(&config.logging)?;

    let client = LlmBatch::new(&config).context("building client")?;
    info!(
        provider = %cli.provider,
        prompts = cli.prompts.len(),
        batch = cli.batch,
        "Sending prompts"
    );

    let options = cli.options();
    let provider = cli.provider.as_str();
    let client = &client;
    let requests = cli.prompts.iter().map(|prompt| {
        let options = options.clone();
        let messages = cli.messages(prompt);
        async move {
            let result = client.chat(provider, messages, options).await;
            (prompt, result)
        }
    });

    // batched prompts must be in flight together to share a batch
    let results = if cli.batch {
        join_all(requests).await
    } else {
        let mut results = Vec::with_capacity(cli.prompts.len());
        for request in requests {
            results.push(request.await);
        }
        results
    };

    let mut all_ok = true;
    for (prompt, result) in results {
        let line = match result {
            Ok(response) => json!({ "prompt": prompt, "response": response }),
            Err(e) if e.is_configuration() => return Err(e.into()),
            Err(e) => {
                all_ok = false;
                json!({ "prompt": prompt, "error": e.to_string() })
            }
        };
        println!("{}", serde_json::to_string_pretty(&line)?);
    }

    if cli.batch {
        let metrics = client.metrics();
        info!(
            batches = metrics.batches_dispatched,
            avg_batch_size = metrics.avg_batch_size(),
            fallback_requests = metrics.fallback_requests,
            "Batching summary"
        );
    }
    Ok(all_ok)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            // Print error using Display (not Debug) to preserve newlines
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
