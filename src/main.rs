//! Tile Mosaic - stitches positioned TIFF tiles into one volume.
//!
//! This binary parses the command line and runs one subcommand.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tile_mosaic::{
    assemble_directory,
    config::{AssembleConfig, Cli, Command, PlanConfig, PlanOutputFormat},
    plan_directory, MosaicPlan,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Assemble(config) => run_assemble(config),
        Command::Plan(config) => run_plan(config),
    }
}

// =============================================================================
// Assemble Command
// =============================================================================

fn run_assemble(config: AssembleConfig) -> ExitCode {
    init_logging(config.verbose);

    info!("Source: {}", config.source.display());
    info!("Destination: {}", config.dest.display());
    if config.sort {
        info!("Tile order: lexicographic");
    }

    match assemble_directory(&config) {
        Ok(report) => {
            info!(
                "Wrote {} ({} tiles, {} bytes, {})",
                config.dest.display(),
                report.tiles_placed,
                report.byte_size,
                report.variant.name()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Plan Command
// =============================================================================

fn run_plan(config: PlanConfig) -> ExitCode {
    init_logging(config.verbose);

    let plan = match plan_directory(&config) {
        Ok(plan) => plan,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match config.format {
        PlanOutputFormat::Text => print_plan(&plan),
        PlanOutputFormat::Json => match serde_json::to_string_pretty(&plan) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize plan: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}

fn print_plan(plan: &MosaicPlan) {
    let layout = &plan.layout;

    println!("Mosaic Plan");
    println!("═══════════");
    println!();
    println!("Tiles:        {}", plan.tile_count);
    println!("Designated:   {} at {}", layout.designated, layout.origin);
    println!("Tile shape:   {}", layout.tile_shape);
    println!("Extent:       {}", layout.extent);
    println!("Element type: {}", layout.element_type);
    println!("Size:         {} bytes", plan.byte_size);
    println!("Variant:      {}", plan.variant.name());

    if !plan.tiles_outside.is_empty() {
        println!();
        println!("✗ {} tile(s) start outside the extent:", plan.tiles_outside.len());
        for identifier in &plan.tiles_outside {
            println!("  {}", identifier);
        }
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tile_mosaic=debug"
    } else {
        "tile_mosaic=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
