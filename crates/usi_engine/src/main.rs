//! ShogiLLM USI engine.
//!
//! Speaks USI on stdin/stdout. Logs go to stderr so they never interleave
//! with protocol output.

mod config;

use anyhow::{Context, Result};
use bridge::BridgeRules;
use clap::Parser;
use llm_engine::{LlmOracle, ProcessGenerator};
use std::io;
use std::path::PathBuf;
use tracing::info;
use usi_core::Session;

use crate::config::EngineConfig;

#[derive(Parser, Debug)]
#[command(name = "shogi_llm")]
#[command(about = "USI shogi engine driven by a fine-tuned language model")]
struct Cli {
    /// Engine configuration (TOML)
    config: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_ansi(false))
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let config = EngineConfig::load(&cli.config)?;
    info!(
        name = %config.engine.name,
        mate_horizon = config.policy.mate_horizon,
        n_think = config.oracle.n_think,
        max_new_tokens = config.oracle.max_new_tokens,
        "Configuration loaded"
    );

    let mut rules = BridgeRules::new(config.rules.clone());
    rules.start().context("Failed to start rules helper")?;

    let mut generator = ProcessGenerator::new(config.oracle.process.clone());
    generator.start().context("Failed to start model server")?;
    let oracle = LlmOracle::new(generator, config.llm_config());

    let mut session = Session::new(rules, oracle, config.session_config());

    let stdin = io::stdin();
    let stdout = io::stdout();
    session.run(stdin.lock(), &mut stdout.lock())?;

    Ok(())
}
