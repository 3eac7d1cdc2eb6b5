//! Logging setup for Strata binaries.
//!
//! Library crates log through the `log` facade; this crate installs a
//! `tracing` subscriber that receives those records. Console output carries
//! uptime stamps and thread names (tile workers are named). Debug builds also
//! write JSON lines to `strata.log` for post-mortem analysis.

use std::path::{Path, PathBuf};

use strata_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_FILTER: &str = "info";

const LOG_FILE: &str = "strata.log";

/// Filter directives from the config's `debug.log_level`, or the default.
pub fn filter_directives(config: Option<&Config>) -> String {
    config
        .map(|config| config.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the config's log level. Returns the JSON log file
/// path when file logging was enabled.
///
/// ```no_run
/// use strata_config::Config;
///
/// let config = Config::default();
/// strata_log::init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(
    log_dir: Option<&Path>,
    debug_build: bool,
    config: Option<&Config>,
) -> Option<PathBuf> {
    let directives = filter_directives(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        let path = log_dir.join(LOG_FILE);
        tracing::debug!("Logging to {} with filter `{}`", path.display(), directives);
        return Some(path);
    }

    subscriber.init();
    tracing::debug!("Logging to console with filter `{}`", directives);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_without_config() {
        assert_eq!(filter_directives(None), "info");
    }

    #[test]
    fn test_config_level_overrides_default() {
        let mut config = Config::default();
        config.debug.log_level = "strata_terrain=debug,warn".to_string();
        assert_eq!(filter_directives(Some(&config)), "strata_terrain=debug,warn");
    }

    #[test]
    fn test_blank_config_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level = "  ".to_string();
        assert_eq!(
            filter_directives(Some(&config)),
            DEFAULT_FILTER,
            "blank level should not produce an empty filter"
        );
    }

    #[test]
    fn test_directives_parse_as_env_filter() {
        for directives in ["info", "debug,strata_mesh=trace", "warn,strata_dispatch=debug"] {
            let filter = EnvFilter::try_new(directives);
            assert!(filter.is_ok(), "failed to parse filter: {directives}");
        }
    }
}
