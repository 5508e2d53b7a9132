//! # binmeta
//!
//! Command-line front end for the binmeta metadata protocol.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            apps/binmeta (THE BINARY)         │
//! │                                              │
//! │   ┌────────────┐        ┌────────────────┐   │
//! │   │    CLI     │        │  Config (TOML) │   │
//! │   │  (clap)    │        │                │   │
//! │   └─────┬──────┘        └───────┬────────┘   │
//! │         └──────────┬────────────┘            │
//! │                    ▼                         │
//! │            ┌───────────────┐                 │
//! │            │ binmeta-core  │                 │
//! │            │ (THE LOGIC)   │                 │
//! │            └───────────────┘                 │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! binmeta emit -d decls.json -k file-class -n MainKt -o MainKt.json
//! binmeta inspect MainKt.json
//! binmeta members --json-mode MainKt.json
//! binmeta markers
//! ```

use binmeta::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // BINMETA_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("BINMETA_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "binmeta=debug,binmeta_core=debug"
    } else {
        "binmeta=info,binmeta_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr; stdout carries command output.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
