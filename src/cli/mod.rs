//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::core::config::{Config, ConfigKey};
use crate::ui::chat_loop::run_chat;
use crate::utils::url::normalize_base_url;

const DEFAULT_LOG_FILTER: &str = "companion_chat=debug";

#[derive(Parser)]
#[command(name = "companion")]
#[command(about = "A terminal client for companion chat servers")]
#[command(
    long_about = "Companion is a full-screen terminal client for a companion chat server. \
Replies stream in as they are typed, the companion can reach out on its own, \
and images can be generated on request.\n\n\
Controls:\n\
  Enter             Send the message\n\
  Alt+Enter         Insert a new line\n\
  Up/Down/PgUp/PgDn Scroll through the conversation\n\
  Ctrl+S            Open or close settings (press c there to clear memory)\n\
  Ctrl+C            Quit the application\n\n\
Commands:\n\
  /imagine <prompt> Generate an image from a prompt"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server base URL for this run (overrides the configured one)
    #[arg(short = 's', long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Seconds between checks for messages the companion sends on its own
    #[arg(long, global = true, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: Option<u64>,

    /// Write debug logs to this file (filter with RUST_LOG)
    #[arg(long, global = true, value_name = "FILE")]
    pub debug_log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Set configuration values (server-url, poll-interval)
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set; omit to print the current configuration
        value: Option<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(path) = &args.debug_log {
        init_debug_log(Path::new(path))?;
    }

    match args.command {
        None | Some(Commands::Chat) => {
            let config = Config::load()?;
            let (server_url, poll_interval) = chat_settings(&args, &config);
            run_chat(server_url, poll_interval).await
        }
        Some(Commands::Set { key, value }) => {
            let mut config = Config::load()?;
            match value {
                Some(value) => {
                    let key = parse_key(&key)?;
                    config.set_value(key, &value)?;
                    config.save()?;
                    println!("✅ Set {} to: {}", key.as_str(), value.trim());
                }
                None => config.print_all(),
            }
            Ok(())
        }
        Some(Commands::Unset { key }) => {
            let key = parse_key(&key)?;
            let mut config = Config::load()?;
            config.unset_value(key);
            config.save()?;
            println!("✅ Unset {}", key.as_str());
            Ok(())
        }
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, String> {
    ConfigKey::parse(key).ok_or_else(|| {
        format!("Unknown config key: {key}. Available keys: server-url, poll-interval")
    })
}

/// Server URL and poll interval for a chat session; flags win over config.
fn chat_settings(args: &Args, config: &Config) -> (String, Duration) {
    let server_url = args
        .server
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(normalize_base_url)
        .unwrap_or_else(|| config.effective_server_url());
    let poll_interval = args
        .poll_interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.poll_interval());
    (server_url, poll_interval)
}

/// The terminal belongs to the chat screen, so logs go to a file.
fn init_debug_log(path: &Path) -> Result<(), Box<dyn Error>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .try_init()?;
    Ok(())
}
