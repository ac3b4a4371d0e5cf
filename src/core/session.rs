//! Positional session - the per-poll availability policy
//!
//! PositionalSession is the context object the host owns for the plugin's
//! lifetime. Each host callback maps to one method:
//!
//! 1. `check_availability` when the host looks for a supported game
//! 2. `fetch_position` on every positional audio tick
//!
//! The session keeps no positional data between polls. Its only memory is a
//! pair of one-shot warning latches (and the jitter generator when built with
//! `debug-fluctuation`).

use std::io;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::constants::{FACTORIO_EXE, SEPARATION_BOUND, STALE_AFTER, SURFACE_SPACING};
use super::freshness::{check_freshness, Freshness};
use super::record::{parse_snapshot, MalformedReason, RecordError, RecordGrammar};
use super::traits::{Clock, HostLog, RecordSource};
use super::transform::{transform, within_separation_bound};
use super::types::{ParsedRecord, SpatialFrame};

/// Shown once per session when the game runs but the mod's file is absent
pub const INSTALL_MOD_MESSAGE: &str = "I can't find the position file in %APPDATA%/Factorio/script-output, \
which is needed for positional audio. Either the Factorio positional audio mod is not installed \
(install it from the mod portal), or no game has been loaded with the mod enabled yet.";

pub const LOADED_MESSAGE: &str = "PA plugin loaded!";

pub const SHUTDOWN_MESSAGE: &str = "PA plugin shut down successfully!";

// =============================================================================
// OUTCOMES
// =============================================================================

/// Why positional data cannot be delivered right now. Always recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    ProcessNotRunning,
    FileMissing,
    FileStale,
}

/// Answer to the host's "is the game there?" query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Ok,
    /// The host should ask again later
    TempUnavailable(UnavailableReason),
}

/// Hard failure of a fetch; logged to the host
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Malformed(#[from] MalformedReason),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result of one positional audio tick
#[derive(Debug)]
pub enum Fetch {
    /// New data
    Updated(SpatialFrame),
    /// Nothing new this poll; keep showing the previous frame
    Reuse,
    /// Data is not trustworthy; leave the previous frame untouched
    Unavailable(UnavailableReason),
    Failed(FetchError),
}

impl Fetch {
    /// The value the host callback returns
    pub fn is_success(&self) -> bool {
        matches!(self, Fetch::Updated(_) | Fetch::Reuse)
    }

    pub fn frame(&self) -> Option<&SpatialFrame> {
        match self {
            Fetch::Updated(frame) => Some(frame),
            _ => None,
        }
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Tunables of the polling policy
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub stale_after: Duration,
    /// Executable names that count as "the game is running"
    pub process_names: Vec<String>,
    pub grammar: RecordGrammar,
    pub surface_spacing: f32,
    pub separation_bound: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stale_after: STALE_AFTER,
            process_names: vec![FACTORIO_EXE.to_string()],
            grammar: RecordGrammar::default(),
            surface_spacing: SURFACE_SPACING,
            separation_bound: SEPARATION_BOUND,
        }
    }
}

// =============================================================================
// POSITIONAL SESSION
// =============================================================================

pub struct PositionalSession {
    config: SessionConfig,
    /// Whether the install-mod message was already shown
    mod_missing_notified: bool,
    /// Whether the surface overlap warning was already logged
    separation_warned: bool,
    #[cfg(feature = "debug-fluctuation")]
    rng: rand::rngs::StdRng,
}

impl PositionalSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            mod_missing_notified: false,
            separation_warned: false,
            #[cfg(feature = "debug-fluctuation")]
            rng: rand::SeedableRng::seed_from_u64(super::constants::FLUCTUATION_SEED),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mod_missing_notified(&self) -> bool {
        self.mod_missing_notified
    }

    /// Host loaded the plugin
    pub fn on_load<L: HostLog>(&self, log: &L) {
        info!("[session] Positional audio session started");
        log.log(LOADED_MESSAGE);
    }

    /// Host is unloading the plugin
    pub fn on_shutdown<L: HostLog>(&self, log: &L) {
        info!("[session] Positional audio session stopped");
        log.log(SHUTDOWN_MESSAGE);
    }

    /// Check whether positional data can be delivered.
    ///
    /// `running` is the list of process names reported by the host.
    pub fn check_availability<N, S, C, L>(
        &mut self,
        running: &[N],
        source: &S,
        clock: &C,
        log: &L,
    ) -> Availability
    where
        N: AsRef<str>,
        S: RecordSource,
        C: Clock,
        L: HostLog,
    {
        if !self.is_game_running(running) {
            return Availability::TempUnavailable(UnavailableReason::ProcessNotRunning);
        }

        match check_freshness(source, clock, self.config.stale_after) {
            Freshness::Missing => {
                if !self.mod_missing_notified {
                    info!("[session] Position file missing, asking the user to install the mod");
                    log.log(INSTALL_MOD_MESSAGE);
                    self.mod_missing_notified = true;
                }
                Availability::TempUnavailable(UnavailableReason::FileMissing)
            }
            Freshness::Stale => Availability::TempUnavailable(UnavailableReason::FileStale),
            Freshness::Fresh => Availability::Ok,
        }
    }

    /// Read, parse and transform the current position.
    pub fn fetch_position<S, C, L>(&mut self, source: &S, clock: &C, log: &L) -> Fetch
    where
        S: RecordSource,
        C: Clock,
        L: HostLog,
    {
        match check_freshness(source, clock, self.config.stale_after) {
            Freshness::Missing => return Fetch::Unavailable(UnavailableReason::FileMissing),
            Freshness::Stale => return Fetch::Unavailable(UnavailableReason::FileStale),
            Freshness::Fresh => {}
        }

        let parsed = source
            .snapshot()
            .map_err(FetchError::from)
            .map(|snapshot| parse_snapshot(&snapshot, &self.config.grammar));

        match parsed {
            Ok(Ok(record)) => Fetch::Updated(self.frame_for(&record)),
            Ok(Err(e @ (RecordError::NoCoordinates | RecordError::ReadLengthMismatch { .. }))) => {
                debug!(reason = %e, "[session] No new position data");
                Fetch::Reuse
            }
            Ok(Err(RecordError::Malformed(reason))) => self.fail(reason.into(), log),
            Err(e) => self.fail(e, log),
        }
    }

    fn is_game_running<N: AsRef<str>>(&self, running: &[N]) -> bool {
        running.iter().any(|name| {
            self.config
                .process_names
                .iter()
                .any(|target| target == name.as_ref())
        })
    }

    fn fail<L: HostLog>(&self, err: FetchError, log: &L) -> Fetch {
        error!(error = %err, "[session] Position file read error");
        log.log(&format!("File read error: {}", err));
        Fetch::Failed(err)
    }

    fn frame_for(&mut self, record: &ParsedRecord) -> SpatialFrame {
        if !self.separation_warned && !within_separation_bound(record, self.config.separation_bound)
        {
            warn!(
                z = record.z,
                surface = record.surface,
                "[session] Height exceeds {}, surfaces may overlap",
                self.config.separation_bound
            );
            self.separation_warned = true;
        }

        #[allow(unused_mut)]
        let mut frame = transform(record, self.config.surface_spacing);

        #[cfg(feature = "debug-fluctuation")]
        {
            use rand::Rng;
            frame.camera.top[2] = 0.01 + self.rng.random::<f32>() * 0.01;
        }

        frame
    }
}

impl Default for PositionalSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
