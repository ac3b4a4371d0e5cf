//! Plugin constants - process name, file location, staleness window
//!
//! Every value here is the default for the matching `PluginConfig` field.

use std::time::Duration;

// =============================================================================
// GAME PROCESS
// =============================================================================

/// Executable name the host reports while Factorio is running
pub const FACTORIO_EXE: &str = "factorio.exe";

// =============================================================================
// POSITION FILE
// =============================================================================

/// Directory (under the user's config dir) the companion mod writes into
pub const SCRIPT_OUTPUT_DIR: [&str; 2] = ["Factorio", "script-output"];

/// File name written by the companion mod
pub const POSITION_FILE_NAME: &str = "mumble_positional-audio_information.txt";

/// Maximum age of the position file before its contents are distrusted
pub const STALE_AFTER: Duration = Duration::from_secs(4);

// =============================================================================
// COORDINATES
// =============================================================================

/// Vertical distance between two adjacent surfaces in target space
pub const SURFACE_SPACING: f32 = 1000.0;

/// Largest |z| for which surfaces are guaranteed not to overlap
///
/// An assumption about in-game coordinate magnitudes, not a computed bound.
pub const SEPARATION_BOUND: f32 = 500.0;

/// Seed of the debug-fluctuation generator
pub const FLUCTUATION_SEED: u64 = 81731;

// =============================================================================
// RECORD GRAMMAR
// =============================================================================

/// Default field delimiter
pub const FIELD_DELIMITER: char = ',';

/// Default key/value separator
pub const KEY_VALUE_SEPARATOR: char = '=';

/// Number of fields in a complete record
pub const RECORD_FIELD_COUNT: usize = 6;
