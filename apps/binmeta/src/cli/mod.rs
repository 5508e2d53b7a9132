//! # binmeta CLI Module
//!
//! This module implements the CLI interface for binmeta.
//!
//! ## Available Commands
//!
//! - `emit` - Write a metadata record for a declaration list
//! - `inspect` - Show the header reconstructed from an artifact
//! - `members` - Show the decoded members of an artifact
//! - `markers` - List the marker registry

mod commands;

use crate::config::Config;
use binmeta_core::BinmetaError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// binmeta - versioned metadata records for compiled artifacts
///
/// Emits and inspects the chunked metadata record attached to an artifact.
#[derive(Parser, Debug)]
#[command(name = "binmeta")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ./binmeta.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the writer over a declaration list and save the artifact
    Emit {
        /// JSON file holding an array of declarations
        #[arg(short, long)]
        declarations: PathBuf,

        /// Artifact kind (class, package-facade, file-class, multifile-class,
        /// multifile-class-part, synthetic-class)
        #[arg(short, long)]
        kind: String,

        /// Artifact name
        #[arg(short, long)]
        name: String,

        /// Output artifact file
        #[arg(short, long)]
        output: PathBuf,

        /// Override the configured ABI version
        #[arg(long)]
        abi_version: Option<i32>,

        /// Class flavor for `class` (class, local-class, anonymous-object)
        #[arg(long, default_value = "class")]
        class_kind: String,

        /// Synthetic flavor for `synthetic-class` (e.g. sam-lambda)
        #[arg(long)]
        synthetic_kind: Option<String>,

        /// Facade name for `multifile-class-part`
        #[arg(long)]
        facade: Option<String>,

        /// Part class names for `multifile-class` (comma-separated)
        #[arg(long)]
        parts: Option<String>,
    },

    /// Show the header of an artifact file
    Inspect {
        /// Artifact file
        artifact: PathBuf,
    },

    /// Show the decoded members of an artifact file
    Members {
        /// Artifact file; multifile parts are looked up next to it
        artifact: PathBuf,
    },

    /// List known metadata markers
    Markers,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), BinmetaError> {
    let config = Config::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode || config.output.json;

    match cli.command {
        Commands::Emit {
            declarations,
            kind,
            name,
            output,
            abi_version,
            class_kind,
            synthetic_kind,
            facade,
            parts,
        } => {
            let request = EmitRequest {
                kind: kind.parse()?,
                name,
                abi_version: abi_version.unwrap_or(config.writer.abi_version),
                chunk_limit: config.writer.max_chunk_length,
                class_kind: class_kind.parse()?,
                synthetic_kind: synthetic_kind.map(|s| s.parse()).transpose()?,
                facade,
                parts: parts.map(|p| split_list(&p)),
            };
            cmd_emit(&declarations, &output, &request, json_mode)
        }
        Commands::Inspect { artifact } => cmd_inspect(&artifact, json_mode),
        Commands::Members { artifact } => cmd_members(&artifact, json_mode),
        Commands::Markers => cmd_markers(json_mode),
    }
}

/// Split a comma-separated list, dropping blanks.
fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
