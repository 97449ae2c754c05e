// terminal-summary-rs/src/main.rs
// Main Entry Point for the terminal-summary binary

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use log::{error, info};

use terminal_summary_sdk::config::{AgentConfig, ModelConfig, DEFAULT_PROVIDER};
use terminal_summary_sdk::openai::OpenAIModel;
use terminal_summary_sdk::{
    LanguageModel, PromptTemplateStore, ServiceConfig, StaticModelRegistry, Summary,
    SummaryService, TerminalActivityTracker, TerminalSummaryAgent,
};

mod cli;
mod input;

use cli::Cli;
use input::{read_capture, CapturedTerminal};

/// Exit status when the pipeline produced no summary
const NO_SUMMARY: u8 = 2;

fn build_agent(cli: &Cli) -> Result<TerminalSummaryAgent> {
    let provider = &**DEFAULT_PROVIDER;

    let mut model_config =
        ModelConfig::from_provider(provider).context("Model backend is not configured")?;
    if let Some(ref model) = cli.model {
        model_config.model = model.clone();
    }
    if let Some(ref base_url) = cli.base_url {
        model_config.base_url = base_url.clone();
    }
    let model = OpenAIModel::new(model_config)?;

    let mut agent_config = AgentConfig::from_provider(provider)?;
    agent_config.model_identifier = model.id().to_string();
    if let Some(max_lines) = cli.max_lines {
        agent_config.max_terminal_lines = max_lines;
    }
    agent_config.validate()?;

    info!("Using model {} at {}", model.id(), model.config().base_url);

    Ok(TerminalSummaryAgent::new(
        agent_config,
        Arc::new(StaticModelRegistry::new().with_model(Arc::new(model))),
        Arc::new(PromptTemplateStore::with_defaults()),
    ))
}

fn print_summary(summary: &Summary, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(summary)?
    } else {
        serde_json::to_string_pretty(summary)?
    };
    println!("{}", json);
    Ok(())
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let agent = build_agent(&cli)?;

    let capture = read_capture(cli.input.as_deref()).await?;
    let cwd = match cli.cwd.clone() {
        Some(cwd) => cwd,
        None => std::env::current_dir()
            .context("Failed to determine the working directory")?
            .display()
            .to_string(),
    };
    let host = CapturedTerminal::new(cwd, cli.shell_or_default(), &capture);

    let service = SummaryService::new(
        Arc::new(agent),
        Arc::new(host),
        Arc::new(TerminalActivityTracker::new([CapturedTerminal::ID])),
    );

    match service.send_summary_request_for_last_used_terminal().await? {
        Some(summary) => {
            print_summary(&summary, cli.compact)?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            error!("No summary could be produced; see the log for the cause");
            Ok(ExitCode::from(NO_SUMMARY))
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    run(cli).await
}
