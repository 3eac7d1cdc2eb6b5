//! Command-line argument parsing for Strata.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, MeshKind};

/// Mesh kinds accepted on the command line.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshKindArg {
    Heightmap,
    Volume,
}

impl From<MeshKindArg> for MeshKind {
    fn from(arg: MeshKindArg) -> Self {
        match arg {
            MeshKindArg::Heightmap => MeshKind::Heightmap,
            MeshKindArg::Volume => MeshKind::Volume,
        }
    }
}

/// Strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "strata", about = "Procedural terrain generator")]
pub struct CliArgs {
    /// Noise seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Cells per tile side.
    #[arg(long)]
    pub tile_dimensions: Option<usize>,

    /// Tiles along x.
    #[arg(long)]
    pub tiles_x: Option<u32>,

    /// Tiles along y.
    #[arg(long)]
    pub tiles_y: Option<u32>,

    /// Mesh kind.
    #[arg(long, value_enum)]
    pub mesh: Option<MeshKindArg>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.noise.seed = seed;
        }
        if let Some(n) = args.tile_dimensions {
            self.tiling.tile_dimensions = n;
        }
        if let Some(x) = args.tiles_x {
            self.tiling.grid_extent.0 = x;
        }
        if let Some(y) = args.tiles_y {
            self.tiling.grid_extent.1 = y;
        }
        if let Some(kind) = args.mesh {
            self.mesh.kind = kind.into();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs::parse_from([
            "strata",
            "--seed",
            "9",
            "--tiles-x",
            "3",
            "--mesh",
            "volume",
        ]);
        config.apply_cli_overrides(&args);
        assert_eq!(config.noise.seed, 9);
        assert_eq!(config.tiling.grid_extent, (3, 1));
        assert_eq!(config.mesh.kind, MeshKind::Volume);
        // Non-overridden fields retain defaults
        assert_eq!(config.tiling.tile_dimensions, 241);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::parse_from(["strata"]));
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_rejects_unknown_mesh_kind() {
        let result = CliArgs::try_parse_from(["strata", "--mesh", "voxels"]);
        assert!(result.is_err(), "only heightmap and volume are accepted");
    }
}
