//! TERMINAL.EXIT terminal front end.
//!
//! Explore a broken machine with an AI companion and fight what lives there.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a plain line protocol suitable for scripted play:
//!
//! ```bash
//! printf 'north\n1\n12\n' | cargo run -p terminal-exit -- --headless --seed 7
//! ```

mod headless;
mod terminal;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use terminal_exit_core::{GameConfig, GameSession};

/// Environment variable that overrides the RNG seed.
const SEED_VAR: &str = "TERMINAL_EXIT_SEED";

#[derive(Debug, Parser)]
#[command(name = "terminal-exit", version)]
#[command(about = "A text adventure with a real-time strike minigame and an AI companion")]
struct Args {
    /// Plain line protocol on stdin/stdout instead of the terminal UI
    #[arg(long)]
    headless: bool,

    /// Seed for every random decision (overrides the config and TERMINAL_EXIT_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// JSON game config
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Minigame tick interval in milliseconds
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();

    let args = Args::parse();
    let config = build_config(&args)?;
    log::debug!("config: {config:?}");

    let mut session = GameSession::new(config).context("failed to start game session")?;

    if args.headless {
        headless::run_headless(&mut session);
        return Ok(());
    }

    terminal::run_terminal(&mut session)
}

/// Config file, then environment, then command line.
fn build_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => GameConfig::default(),
    };

    if let Ok(raw) = std::env::var(SEED_VAR) {
        let seed = raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{SEED_VAR} is not a number: {raw:?}"))?;
        config = config.with_seed(seed);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(ms) = args.tick_ms {
        config = config.with_tick_interval_ms(ms);
    }

    config.validate().context("invalid game config")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "terminal-exit",
            "--headless",
            "--seed",
            "7",
            "--tick-ms",
            "5",
        ]);
        assert!(args.headless);
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.tick_ms, Some(5));
        assert!(args.config.is_none());
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from(["terminal-exit", "--seed", "99", "--tick-ms", "15"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.strike.tick_interval_ms, 15);
    }
}
