//! Configuration for Strata terrain generation.
//!
//! Settings persist to disk as `config.ron` and can be overridden from the
//! command line. [`Config::sanitized`] clamps out-of-range values before the
//! pipeline consumes them.

mod cli;
mod config;
mod error;

pub use cli::{CliArgs, MeshKindArg};
pub use config::{
    Config, DebugConfig, MeshConfig, MeshKind, NoiseConfig, TilingConfig, default_categories,
    default_config_dir,
};
pub use error::ConfigError;
