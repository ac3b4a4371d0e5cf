//! Host module - everything that touches the real environment
//!
//! This module contains:
//! - FactorioPlugin: session bound to the real position file
//! - Filesystem record source and system clock
//! - Configuration loading
//! - Logging setup
//! - Plugin metadata

pub mod config;
pub mod fs_source;
pub mod info;
pub mod logging;
pub mod plugin;

pub use config::PluginConfig;
pub use fs_source::{FsRecordSource, SystemClock};
pub use logging::{init_from_settings, init_logging, TracingLog};
pub use plugin::FactorioPlugin;
