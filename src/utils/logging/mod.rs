//! Logging utilities
//!
//! This module provides logger initialisation and standardized messages for
//! compile operations.

pub mod log;

pub use self::log::{init_logging, log_compile_complete, log_store_selection};
