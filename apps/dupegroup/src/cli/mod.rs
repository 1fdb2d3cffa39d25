//! # dupegroup CLI Module
//!
//! ## Available Commands
//!
//! - `init` - Initialize a new photo database
//! - `import` - Insert or update photo records from a file
//! - `detect` - Group near-duplicate photos and mark leads
//! - `status` - Show photo and group counts
//! - `groups` - List stored groups with their leads
//! - `checksum` - BLAKE3 hash of the stored grouping
//! - `compact` - Compact the database file

mod commands;

use crate::error::AppError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// dupegroup - near-duplicate photo grouping
///
/// Groups photos whose 64-bit perceptual hashes are within a Hamming
/// distance threshold and marks the best-quality photo of each group.
#[derive(Parser, Debug)]
#[command(name = "dupegroup")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the photo database
    #[arg(short = 'D', long, global = true, default_value = "dupegroup.redb")]
    pub database: PathBuf,

    /// Path to a TOML configuration file (default: ./dupegroup.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },

    /// Import photo records (JSON array or JSON Lines)
    Import {
        /// Path to the input file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Detect duplicate groups and persist them
    Detect {
        /// Similarity threshold in percent (0-100)
        #[arg(short, long, allow_negative_numbers = true)]
        similarity: Option<i32>,

        /// Rows compared per batch
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Compute the grouping without writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show photo and group counts
    Status,

    /// List stored groups
    Groups,

    /// Compute BLAKE3 hash of the stored grouping
    Checksum,

    /// Compact the database file
    Compact,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), AppError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Init { force }) => cmd_init(&cli.database, force),
        Some(Commands::Import { file }) => cmd_import(&cli.database, json_mode, &file),
        Some(Commands::Detect {
            similarity,
            chunk_size,
            dry_run,
        }) => cmd_detect(
            &cli.database,
            json_mode,
            cli.config.as_deref(),
            similarity,
            chunk_size,
            dry_run,
        ),
        Some(Commands::Status) => cmd_status(&cli.database, json_mode),
        Some(Commands::Groups) => cmd_groups(&cli.database, json_mode),
        Some(Commands::Checksum) => cmd_checksum(&cli.database, json_mode),
        Some(Commands::Compact) => cmd_compact(&cli.database),
        None => {
            // No subcommand - show status by default
            cmd_status(&cli.database, json_mode)
        }
    }
}
