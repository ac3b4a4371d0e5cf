// Logging configuration for the positional audio plugin

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::{self, format::DefaultFields, format::Format};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::core::traits::HostLog;

use super::config::LoggingSettings;

const CRATE_DIRECTIVE: &str = "factorio_positional_audio=debug";

/// Flush guards of the installed subscriber's writers
static LOG_GUARD: OnceLock<Vec<WorkerGuard>> = OnceLock::new();

/// Install the diagnostics subscriber.
///
/// Every output gets its own non-blocking writer. Only the first call in a
/// process installs anything; the host may load the plugin more than once.
pub fn init_logging(enable_console: bool, log_file_path: Option<PathBuf>) {
    let mut writers = Vec::new();
    if let Some(appender) = log_file_path.as_deref().and_then(file_appender) {
        writers.push(tracing_appender::non_blocking(appender));
    }
    if enable_console {
        writers.push(tracing_appender::non_blocking(std::io::stdout()));
    }

    let (layers, guards): (Vec<_>, Vec<_>) = writers
        .into_iter()
        .map(|(writer, guard)| (plain_layer(writer), guard))
        .unzip();

    if tracing_subscriber::registry()
        .with(crate_filter())
        .with(layers)
        .try_init()
        .is_ok()
    {
        let _ = LOG_GUARD.set(guards);
    }
}

/// Apply the `[logging]` config section; does nothing when every output is off
pub fn init_from_settings(settings: &LoggingSettings) {
    if settings.console || settings.log_file.is_some() {
        init_logging(settings.console, settings.log_file.clone());
    }
}

/// `RUST_LOG` if set, INFO otherwise, with this crate at DEBUG
fn crate_filter() -> EnvFilter {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    match CRATE_DIRECTIVE.parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

fn file_appender(path: &Path) -> Option<tracing_appender::rolling::RollingFileAppender> {
    let dir = path.parent()?;
    let name = path.file_name()?;
    Some(tracing_appender::rolling::never(dir, name))
}

fn plain_layer<S>(writer: NonBlocking) -> fmt::Layer<S, DefaultFields, Format, NonBlocking> {
    fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
}

/// Host log that forwards to tracing
///
/// For hosts without a log of their own, and for running the session
/// outside a host.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl HostLog for TracingLog {
    fn log(&self, message: &str) {
        tracing::info!(target: "host", "{}", message);
    }
}
