//! Demo binary that generates a terrain grid and reports what was built.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p strata-demo` for one default tile.
//! Run with `cargo run -p strata-demo -- --tiles-x 3 --tiles-y 2 --mesh volume` for a grid.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use strata_config::{CliArgs, Config, default_config_dir};
use strata_world::TileOutput;
use tracing::{error, info};

fn report(config: &Config, tile: &TileOutput) {
    info!(
        "Tile {}: {} vertices, {} triangles, field [{}, {}]",
        tile.coord,
        tile.mesh.vertices.len(),
        tile.mesh.triangle_count(),
        tile.field.min_value(),
        tile.field.max_value()
    );
    for (index, masses) in &tile.landmasses {
        let Some(category) = config.classification.get(*index) else {
            continue;
        };
        let Some(largest) = masses.iter().max_by_key(|mass| mass.area()) else {
            continue;
        };
        info!(
            "  {}: {} landmasses, largest {} cells seeded at ({}, {})",
            category.name,
            masses.len(),
            largest.area(),
            largest.seed_point.x,
            largest.seed_point.y
        );
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(|| {
        default_config_dir().unwrap_or_else(|e| {
            eprintln!("{e}, using ./strata");
            PathBuf::from("strata")
        })
    });

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    info!(
        "Generating {}x{} tiles of {} cells (seed {})",
        config.tiling.grid_extent.0,
        config.tiling.grid_extent.1,
        config.tiling.tile_dimensions,
        config.noise.seed
    );

    match strata_world::rebuild(&config) {
        Ok(tiles) => {
            for tile in &tiles {
                report(&config, tile);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Terrain generation failed: {e}");
            ExitCode::FAILURE
        }
    }
}
