//! Core types - platform-independent data structures
//!
//! A `ParsedRecord` lives for one poll; it is transformed into a
//! `SpatialFrame` and dropped.

use chrono::{DateTime, Utc};

// =============================================================================
// FILE STATE
// =============================================================================

/// Result of statting the position file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileStat {
    pub modified: DateTime<Utc>,
    pub len: u64,
}

/// Bytes read from the position file, with the length reported by stat
/// just before the read
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSnapshot {
    pub declared_len: u64,
    pub bytes: Vec<u8>,
}

impl FileSnapshot {
    pub fn new(declared_len: u64, bytes: Vec<u8>) -> Self {
        Self {
            declared_len,
            bytes,
        }
    }

    /// Snapshot whose declared length matches its contents
    pub fn complete(text: &str) -> Self {
        Self::new(text.len() as u64, text.as_bytes().to_vec())
    }

    /// True if the file was rewritten while it was being read
    pub fn is_torn(&self) -> bool {
        self.bytes.len() as u64 != self.declared_len
    }
}

// =============================================================================
// PARSED RECORD
// =============================================================================

/// Latest player state as written by the companion mod (Factorio axes)
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedRecord {
    /// East- / west+
    pub x: f32,
    /// North- / south+
    pub y: f32,
    /// Height within the surface
    pub z: f32,
    /// Surface (world) index
    pub surface: i32,
    /// Player index
    pub player: i32,
    /// Server or save name
    pub server: String,
}

// =============================================================================
// SPATIAL FRAME
// =============================================================================

/// Position and orientation of one listener, in host axes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observer {
    pub position: [f32; 3],
    pub front: [f32; 3],
    pub top: [f32; 3],
}

/// Everything the host needs for one positional audio update
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialFrame {
    pub avatar: Observer,
    pub camera: Observer,
    /// Players only hear each other when their contexts match
    pub context: String,
    pub identity: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_complete_is_not_torn() {
        let snap = FileSnapshot::complete("x=1,y=2");
        assert_eq!(snap.declared_len, 7);
        assert!(!snap.is_torn());
    }

    #[test]
    fn test_snapshot_short_read_is_torn() {
        let snap = FileSnapshot::new(40, b"x=1,y=2".to_vec());
        assert!(snap.is_torn());

        // File grew between stat and read
        let snap = FileSnapshot::new(2, b"x=1,y=2".to_vec());
        assert!(snap.is_torn());
    }
}
