//! Position file freshness check

use std::time::Duration;

use super::traits::{Clock, RecordSource};

/// How trustworthy the position file currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The file cannot be statted (mod not installed, or no game loaded)
    Missing,
    /// The mod stopped rewriting the file (game paused, menu, crash)
    Stale,
    Fresh,
}

/// Classify the file by its last modification time.
///
/// A modification time in the future (clock skew) counts as fresh.
pub fn check_freshness<S: RecordSource, C: Clock>(
    source: &S,
    clock: &C,
    stale_after: Duration,
) -> Freshness {
    let Some(stat) = source.stat() else {
        return Freshness::Missing;
    };

    let age = clock.now() - stat.modified;
    match age.to_std() {
        Ok(age) if age > stale_after => Freshness::Stale,
        _ => Freshness::Fresh,
    }
}
