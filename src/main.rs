mod analysis;
mod cli;
mod commands;
mod config;
mod mcp;
mod pdf;
mod report;
mod toc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::PipelineConfig;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Logs go to stderr; stdout carries command output and the MCP transport
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Mcp => {
            mcp::run_server(config).await?;
        }
        Commands::Combine { dir, output } => {
            commands::combine::run(&dir, output.as_deref(), &config)?;
        }
        Commands::Analyze {
            input,
            text_output,
            json,
        } => {
            let input = input.unwrap_or_else(|| config.files.combined.clone().into());
            let text_output = text_output.unwrap_or_else(|| config.files.text.clone().into());
            commands::analyze::run(&input, &text_output, json.as_deref(), &config.analysis)?;
        }
        Commands::Report { output, analysis } => {
            let output = output.unwrap_or_else(|| config.files.report.clone().into());
            commands::report::run(&output, analysis.as_deref())?;
        }
        Commands::Toc { path } => {
            commands::toc::run(&path)?;
        }
    }

    Ok(())
}
