// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mynah - a bilingual WhatsApp chat-relay agent.
//!
//! This is the binary entry point for the Mynah agent.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};
use mynah_config::MynahConfig;

mod serve;

/// Mynah - a bilingual WhatsApp chat-relay agent.
#[derive(Parser, Debug)]
#[command(name = "mynah", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Mynah agent.
    Serve,
    /// Inspect and validate configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Load the configuration and report any problems.
    Validate,
    /// Print the effective configuration as TOML.
    Show,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => {
            let config = load_or_exit();
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("mynah: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Validate => {
                let config = load_or_exit();
                println!("mynah: config ok (agent.name={})", config.agent.name);
            }
            ConfigAction::Show => {
                let config = load_or_exit();
                match toml::to_string_pretty(&config) {
                    Ok(rendered) => print!("{rendered}"),
                    Err(e) => {
                        eprintln!("mynah: failed to render config: {e}");
                        std::process::exit(1);
                    }
                }
            }
        },
        None => {
            println!("mynah: use --help for available commands");
        }
    }
}

/// Loads and validates configuration, rendering diagnostics and exiting
/// on failure.
fn load_or_exit() -> MynahConfig {
    match mynah_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            mynah_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}
