// Factorio positional audio core
//
// Reads the position file written by the Factorio positional audio mod and
// turns it into listener data for a voice chat host.

pub mod core;
pub mod host;
