//! Configuration management for Tile Mosaic.
//!
//! The command line is split into subcommands:
//!
//! - `assemble <SOURCE> <DEST>` - stitch every tile of a directory into one TIFF
//! - `plan <SOURCE>` - report the output layout without allocating it
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use tile_mosaic::config::{Cli, Command};
//!
//! match Cli::parse().into_command() {
//!     Command::Assemble(config) => println!("{} -> {}", config.source.display(), config.dest.display()),
//!     Command::Plan(config) => println!("planning {}", config.source.display()),
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `MOSAIC_SOURCE` - Tile directory
//! - `MOSAIC_DEST` - Output file (`assemble` only)

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Tile mosaic command line.
#[derive(Parser, Debug, Clone)]
#[command(name = "tile-mosaic")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Assemble all tiles of a directory into one TIFF volume
    Assemble(AssembleConfig),

    /// Print the output layout without assembling
    Plan(PlanConfig),
}

/// Arguments of `assemble`.
#[derive(Args, Debug, Clone)]
pub struct AssembleConfig {
    /// Directory holding the `X_Y_name.tif` / `X_Y_Z_name.tif` tiles
    #[arg(env = "MOSAIC_SOURCE")]
    pub source: PathBuf,

    /// Output TIFF file
    #[arg(env = "MOSAIC_DEST")]
    pub dest: PathBuf,

    /// Process tiles in lexicographic name order instead of directory order
    #[arg(long, default_value_t = false)]
    pub sort: bool,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl AssembleConfig {
    /// Validate the configuration.
    ///
    /// Returns an error message if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        validate_source(&self.source)?;

        if self.dest.as_os_str().is_empty() {
            return Err("Destination path is required. Set <DEST> or MOSAIC_DEST".to_string());
        }
        if self.dest.is_dir() {
            return Err(format!(
                "Destination {} is a directory, expected a file path",
                self.dest.display()
            ));
        }

        // A bare file name has an empty parent, meaning the working directory
        let parent = self
            .dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if !parent.is_dir() {
            return Err(format!(
                "Destination directory {} does not exist",
                parent.display()
            ));
        }

        Ok(())
    }
}

/// Output format of `plan`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanOutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// JSON object
    Json,
}

/// Arguments of `plan`.
#[derive(Args, Debug, Clone)]
pub struct PlanConfig {
    /// Directory holding the tiles
    #[arg(env = "MOSAIC_SOURCE")]
    pub source: PathBuf,

    /// Process tiles in lexicographic name order instead of directory order
    #[arg(long, default_value_t = false)]
    pub sort: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = PlanOutputFormat::Text)]
    pub format: PlanOutputFormat,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl PlanConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_source(&self.source)
    }
}

fn validate_source(source: &Path) -> Result<(), String> {
    if source.as_os_str().is_empty() {
        return Err("Source directory is required. Set <SOURCE> or MOSAIC_SOURCE".to_string());
    }
    if !source.exists() {
        return Err(format!("Source directory {} does not exist", source.display()));
    }
    if !source.is_dir() {
        return Err(format!("Source {} is not a directory", source.display()));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
