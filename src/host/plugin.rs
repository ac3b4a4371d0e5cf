//! Factorio plugin - wires the session to the real file, clock and host log
//!
//! This is the object a host adapter keeps for the plugin's lifetime and
//! calls from its positional audio callbacks.

use tracing::info;

use crate::core::session::{Availability, Fetch, PositionalSession};
use crate::core::traits::HostLog;

use super::config::{ConfigError, PluginConfig};
use super::fs_source::{FsRecordSource, SystemClock};
use super::info::{plugin_version, PLUGIN_NAME};
use super::logging::init_from_settings;

// =============================================================================
// FACTORIO PLUGIN
// =============================================================================

pub struct FactorioPlugin<L: HostLog> {
    session: PositionalSession,
    source: FsRecordSource,
    clock: SystemClock,
    log: L,
}

impl<L: HostLog> FactorioPlugin<L> {
    /// Build the plugin and announce it on the host log
    pub fn new(config: &PluginConfig, log: L) -> Result<Self, ConfigError> {
        config.validate()?;
        init_from_settings(&config.logging);
        let path = config.position_file()?;
        info!(
            path = %path.display(),
            version = %plugin_version(),
            "[plugin] {} plugin initialised",
            PLUGIN_NAME
        );

        let plugin = Self {
            session: PositionalSession::new(config.session_config()),
            source: FsRecordSource::new(path),
            clock: SystemClock,
            log,
        };
        plugin.session.on_load(&plugin.log);
        Ok(plugin)
    }

    /// Plugin with stock settings
    pub fn with_defaults(log: L) -> Result<Self, ConfigError> {
        Self::new(&PluginConfig::default(), log)
    }

    pub fn source(&self) -> &FsRecordSource {
        &self.source
    }

    pub fn session(&self) -> &PositionalSession {
        &self.session
    }

    /// Host asks whether positional data can be provided
    pub fn check_availability<N: AsRef<str>>(&mut self, running: &[N]) -> Availability {
        self.session
            .check_availability(running, &self.source, &self.clock, &self.log)
    }

    /// Host asks for the current position
    pub fn fetch_position(&mut self) -> Fetch {
        self.session
            .fetch_position(&self.source, &self.clock, &self.log)
    }

    /// Host is unloading the plugin
    pub fn shutdown(self) {
        self.session.on_shutdown(&self.log);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::{
        UnavailableReason, INSTALL_MOD_MESSAGE, LOADED_MESSAGE, SHUTDOWN_MESSAGE,
    };
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Host log whose messages outlive the plugin
    #[derive(Clone, Default)]
    struct SharedLog(Rc<RefCell<Vec<String>>>);

    impl HostLog for SharedLog {
        fn log(&self, message: &str) {
            self.0.borrow_mut().push(message.to_string());
        }
    }

    fn plugin_for(temp: &TempDir, log: SharedLog) -> FactorioPlugin<SharedLog> {
        let mut config = PluginConfig::default();
        config.source.position_file = Some(temp.path().join("pos.txt"));
        FactorioPlugin::new(&config, log).unwrap()
    }

    #[test]
    fn test_lifecycle_messages() {
        let temp = TempDir::new().unwrap();
        let log = SharedLog::default();
        let plugin = plugin_for(&temp, log.clone());
        plugin.shutdown();

        assert_eq!(
            *log.0.borrow(),
            vec![LOADED_MESSAGE.to_string(), SHUTDOWN_MESSAGE.to_string()]
        );
    }

    #[test]
    fn test_game_running_without_mod() {
        let temp = TempDir::new().unwrap();
        let log = SharedLog::default();
        let mut plugin = plugin_for(&temp, log.clone());

        for _ in 0..3 {
            assert_eq!(
                plugin.check_availability(&["factorio.exe"]),
                Availability::TempUnavailable(UnavailableReason::FileMissing)
            );
        }
        let installs = log
            .0
            .borrow()
            .iter()
            .filter(|m| m.as_str() == INSTALL_MOD_MESSAGE)
            .count();
        assert_eq!(installs, 1);
    }

    #[test]
    fn test_poll_real_file() {
        let temp = TempDir::new().unwrap();
        let mut plugin = plugin_for(&temp, SharedLog::default());
        fs::write(
            plugin.source().path(),
            r#"x=10.0,y=20.0,z=0,surface=1,player=7,server="saveA""#,
        )
        .unwrap();

        assert_eq!(plugin.check_availability(&["factorio.exe"]), Availability::Ok);
        let fetch = plugin.fetch_position();
        let frame = fetch.frame().unwrap();
        assert_eq!(frame.avatar.position, [10.0, 1000.0, -20.0]);
        assert_eq!(frame.identity, "7");
        assert_eq!(frame.context, "saveA");
    }

    #[test]
    fn test_logging_section_applied() {
        let temp = TempDir::new().unwrap();
        let log_file = temp.path().join("plugin.log");
        let mut config = PluginConfig::default();
        config.source.position_file = Some(temp.path().join("pos.txt"));
        config.logging.log_file = Some(log_file.clone());

        let _plugin = FactorioPlugin::new(&config, SharedLog::default()).unwrap();
        assert!(log_file.exists());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PluginConfig::default();
        config.game.process_names.clear();
        assert!(FactorioPlugin::new(&config, SharedLog::default()).is_err());
    }
}
