//! Logging utilities
//!
//! This module provides standardized logging functions for operations.

use std::time::Duration;

/// Initialise an `env_logger` logger reading `RUST_LOG`
///
/// Falls back to `default_filter` when `RUST_LOG` is unset. Calling it more
/// than once is harmless; only the first call installs a logger.
///
/// # Arguments
/// * `default_filter` - Filter used when `RUST_LOG` is not set, e.g. `"info"`
pub fn init_logging(default_filter: &str) {
    let initialised =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
            .try_init();
    if initialised.is_err() {
        log::trace!("logger already initialised");
    }
}

/// Log a criteria compilation completion with consistent format
///
/// # Arguments
/// * `rules` - Number of rules compiled
/// * `elapsed` - Time spent building the predicate
pub fn log_compile_complete(rules: usize, elapsed: Duration) {
    log::debug!("Successfully compiled {rules} rule(s) in {elapsed:?}");
}

/// Log a store selection with consistent format
///
/// # Arguments
/// * `selected` - Number of households selected
/// * `total` - Number of households considered
/// * `elapsed` - Optional elapsed time
pub fn log_store_selection(selected: usize, total: usize, elapsed: Option<Duration>) {
    if let Some(duration) = elapsed {
        log::info!(
            "Selected {} of {} households in {:?}",
            selected,
            total,
            duration
        );
    } else {
        log::info!("Selected {} of {} households", selected, total);
    }
}
