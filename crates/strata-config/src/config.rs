//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use strata_field::{FractalParams, MIN_SCALE, Rank};
use strata_mesh::{HeightCurve, HeightmapMesher, VolumeMesher, fit_level_of_detail};
use strata_noise::{FadeMode, InterpolationMode, NoiseMode};
use strata_terrain::{Color, TerrainCategory};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Smallest level of detail the volume mesher is configured with.
const MIN_LEVEL_OF_DETAIL: usize = 5;

/// Top-level generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Fractal noise settings.
    pub noise: NoiseConfig,
    /// Tile size and grid layout.
    pub tiling: TilingConfig,
    /// Terrain categories, checked in order.
    pub classification: Vec<TerrainCategory>,
    /// Mesh synthesis settings.
    pub mesh: MeshConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Fractal noise configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseConfig {
    /// Seed for the per-octave offsets.
    pub seed: u64,
    /// Sampling scale; larger values stretch features over more cells.
    pub scale: f32,
    /// Number of noise layers (>= 1).
    pub octaves: u32,
    /// Per-octave amplitude decay (0.0 - 1.0).
    pub persistence: f32,
    /// Per-octave frequency growth (>= 1.0).
    pub lacunarity: f32,
    pub interpolation: InterpolationMode,
    pub fade: FadeMode,
    pub mode: NoiseMode,
    /// World-space feature points, used by Worley mode only.
    pub seed_points: Vec<[f32; 3]>,
}

/// Tile grid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TilingConfig {
    /// Cells per tile side. Neighbouring tiles share one row or column.
    pub tile_dimensions: usize,
    /// Number of tiles along x and y.
    pub grid_extent: (u32, u32),
    /// World-space origin of tile (0, 0).
    pub world_offset: [f32; 3],
}

/// Which mesher turns a tile into geometry.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MeshKind {
    #[default]
    Heightmap,
    Volume,
}

/// Mesh synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshConfig {
    pub kind: MeshKind,
    /// Remaps normalized heights before scaling (heightmap only).
    pub height_curve: HeightCurve,
    /// Vertical scale of heightmap meshes (>= 0).
    pub height_scale: f32,
    /// Density threshold of the volume surface (0.0 - 1.0).
    pub iso_threshold: f32,
    /// Cubes per volume axis; must divide `tile_dimensions - 1`.
    pub level_of_detail: usize,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

/// Water, sand, grass, rock and snow bands over `[0, 1]`.
///
/// The top band ends above 1.0 so normalized maxima are classified.
pub fn default_categories() -> Vec<TerrainCategory> {
    vec![
        TerrainCategory::new("Water", 0.0, 0.3, Color::rgb(0.21, 0.38, 0.8)),
        TerrainCategory::new("Sand", 0.3, 0.4, Color::rgb(0.82, 0.78, 0.49)),
        TerrainCategory::new("Grass", 0.4, 0.6, Color::rgb(0.34, 0.6, 0.2)),
        TerrainCategory::new("Rock", 0.6, 0.8, Color::rgb(0.4, 0.35, 0.3)),
        TerrainCategory::new("Snow", 0.8, 1.01, Color::WHITE),
    ]
}

/// Per-user directory holding `config.ron`.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("strata"))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Default implementations ---

impl Default for Config {
    fn default() -> Self {
        Self {
            noise: NoiseConfig::default(),
            tiling: TilingConfig::default(),
            classification: default_categories(),
            mesh: MeshConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            scale: 20.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            interpolation: InterpolationMode::default(),
            fade: FadeMode::default(),
            mode: NoiseMode::default(),
            seed_points: Vec::new(),
        }
    }
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            tile_dimensions: 241,
            grid_extent: (1, 1),
            world_offset: [0.0; 3],
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            kind: MeshKind::Heightmap,
            height_curve: HeightCurve::identity(),
            height_scale: 50.0,
            iso_threshold: 0.5,
            level_of_detail: MIN_LEVEL_OF_DETAIL,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Validation and conversion ---

impl Config {
    /// Copy with out-of-range values clamped to the nearest usable one.
    ///
    /// The level of detail is raised to at least 5 and then to the next
    /// value dividing `tile_dimensions - 1`.
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        let noise = &mut config.noise;
        if noise.scale.is_nan() || noise.scale <= 0.0 {
            noise.scale = MIN_SCALE;
        }
        noise.octaves = noise.octaves.max(1);
        noise.lacunarity = noise.lacunarity.max(1.0);
        noise.persistence = if noise.persistence.is_nan() {
            0.0
        } else {
            noise.persistence.clamp(0.0, 1.0)
        };

        config.tiling.tile_dimensions = config.tiling.tile_dimensions.max(2);

        let mesh = &mut config.mesh;
        mesh.height_scale = if mesh.height_scale.is_nan() {
            0.0
        } else {
            mesh.height_scale.max(0.0)
        };
        mesh.iso_threshold = if mesh.iso_threshold.is_nan() {
            0.5
        } else {
            mesh.iso_threshold.clamp(0.0, 1.0)
        };
        mesh.level_of_detail = fit_level_of_detail(
            config.tiling.tile_dimensions,
            mesh.level_of_detail.max(MIN_LEVEL_OF_DETAIL),
        );
        config
    }

    /// Field parameters for tile (0, 0): a height field for heightmap
    /// meshes, a density volume for volume meshes.
    pub fn fractal_params(&self) -> FractalParams {
        FractalParams {
            seed: self.noise.seed,
            scale: self.noise.scale,
            dimensions: self.tiling.tile_dimensions,
            offset: Vec3::from(self.tiling.world_offset),
            lacunarity: self.noise.lacunarity,
            persistence: self.noise.persistence,
            octaves: self.noise.octaves,
            rank: match self.mesh.kind {
                MeshKind::Heightmap => Rank::Two,
                MeshKind::Volume => Rank::Three,
            },
            noise_mode: self.noise.mode,
            interpolation: self.noise.interpolation,
            fade: self.noise.fade,
        }
    }

    pub fn seed_points(&self) -> Vec<Vec3> {
        self.noise.seed_points.iter().copied().map(Vec3::from).collect()
    }

    pub fn heightmap_mesher(&self) -> HeightmapMesher {
        HeightmapMesher::new(self.mesh.height_scale, self.mesh.height_curve.clone())
    }

    pub fn volume_mesher(&self) -> VolumeMesher {
        VolumeMesher::new(self.mesh.iso_threshold, self.mesh.level_of_detail)
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = read_config(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        let path = config_dir.join(CONFIG_FILE);
        std::fs::write(&path, serialized).map_err(|source| ConfigError::Write { path, source })
    }

    /// Re-read `config.ron`: `Some(new_config)` if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = read_config(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
