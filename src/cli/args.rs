//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// pdf-preview - PDF preview host
///
/// Serves PDF documents to a render surface over JSON lines on
/// stdin/stdout, with caching and a save handshake.
#[derive(Parser, Debug)]
#[command(name = "pdf-preview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PDF_PREVIEW_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve a document to a render surface over stdin/stdout
    Serve(ServeArgs),

    /// Load a document through the cache and report on it
    Info(InfoArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// PDF file to preview
    pub file: PathBuf,

    /// Send the document location instead of its bytes
    #[arg(long)]
    pub uri_mode: bool,

    /// Enforce the size limit for restricted environments
    #[arg(long)]
    pub restricted: bool,

    /// Save automatically whenever the surface reports changes
    #[arg(long)]
    pub autosave: bool,
}

/// Arguments for the info command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// PDF file to inspect
    pub file: PathBuf,

    /// Enforce the size limit for restricted environments
    #[arg(long)]
    pub restricted: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., cache.capacity)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for the info command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}
