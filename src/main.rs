use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use agentflow::app::App;
use agentflow::config::Config;
use agentflow::headless::{self, ConfirmationSource, FixedCode, OutputMode, StdinPrompt};
use agentflow::logging;
use agentflow::workflow::TokioClock;

#[derive(Parser)]
#[command(name = "agentflow")]
#[command(about = "Simulated agentic workflow with security verification")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the workflow without the TUI
    Run {
        /// Confirmation code for the security step (prompted on stdin if omitted)
        #[arg(long)]
        otp: Option<String>,

        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// List the workflow steps and their delays
    Steps,

    /// Write the effective configuration to .agentflow/config.toml
    InitConfig {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let is_tui_mode = cli.command.is_none();

    // Initialize logging (file-based for TUI, stderr for CLI)
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Run { otp, json }) => {
            cmd_run(&config, otp, json).await?;
        }
        Some(Commands::Steps) => {
            headless::print_steps(&config, &mut io::stdout().lock())?;
        }
        Some(Commands::InitConfig { force }) => {
            cmd_init_config(&config, force)?;
        }
        None => {
            run_tui(config, logging_handle.log_file_path).await?;
        }
    }

    Ok(())
}

async fn cmd_run(config: &Config, otp: Option<String>, json: bool) -> Result<()> {
    let mut source: Box<dyn ConfirmationSource> = match otp {
        Some(code) => Box::new(FixedCode::new(code)),
        None => Box::new(StdinPrompt),
    };
    let mode = if json {
        OutputMode::Json
    } else {
        OutputMode::Plain
    };

    let mut stdout = io::stdout();
    headless::run_workflow(
        config,
        Arc::new(TokioClock::new()),
        source.as_mut(),
        &mut stdout,
        mode,
    )
    .await
}

fn cmd_init_config(config: &Config, force: bool) -> Result<()> {
    let path = Config::local_config_path();
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    config.save()?;
    println!("Wrote {}", path.display());
    Ok(())
}

async fn run_tui(config: Config, log_file_path: Option<PathBuf>) -> Result<()> {
    let mut app = App::new(config);
    let result = app.run().await;

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}
