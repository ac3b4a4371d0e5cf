//! Core traits - abstractions over the filesystem, time and the host
//!
//! The real implementations live in the `host` module. Tests use the
//! mock implementations below, so every poll path runs without touching
//! the disk.

use std::io;

use chrono::{DateTime, Utc};

use super::types::{FileSnapshot, FileStat};

// =============================================================================
// RECORD SOURCE
// =============================================================================

/// Access to the position file written by the companion mod
///
/// Implementations must not keep handles open between calls: the mod
/// deletes and recreates the file at will.
pub trait RecordSource {
    /// Stat the file
    ///
    /// Returns None if the file does not exist or cannot be statted.
    fn stat(&self) -> Option<FileStat>;

    /// Read the whole file
    ///
    /// The declared length comes from a stat taken immediately before the
    /// read, so a concurrent rewrite shows up as a torn snapshot.
    fn snapshot(&self) -> io::Result<FileSnapshot>;
}

// =============================================================================
// CLOCK
// =============================================================================

/// Wall clock used to judge file staleness
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

// =============================================================================
// HOST LOG
// =============================================================================

/// Log sink provided by the host (its chat/console log)
///
/// Fire-and-forget: implementations swallow their own failures.
pub trait HostLog {
    fn log(&self, message: &str);
}

// =============================================================================
// TEST MOCKS
// =============================================================================
