//! Logging (C23): one-time `tracing_subscriber` initialization using a
//! configurable timer, grounded directly on the teacher's
//! `ConfigurableTimer`.

use std::fmt;
use std::sync::Once;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

static INIT: Once = Once::new();

/// Which clock a log line's timestamp is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTimezone {
    #[default]
    Local,
    Utc,
}

/// A single [`FormatTime`] implementation that switches between local and
/// UTC at runtime, avoiding the type-system awkwardness of two distinct
/// timer types per subscriber-builder branch.
#[derive(Debug, Clone)]
pub struct ConfigurableTimer {
    timezone: LogTimezone,
}

impl ConfigurableTimer {
    pub fn new(timezone: LogTimezone) -> Self {
        Self { timezone }
    }
}

impl FormatTime for ConfigurableTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        match self.timezone {
            LogTimezone::Local => {
                let now = chrono::Local::now();
                write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S%.3f"))
            }
            LogTimezone::Utc => {
                let now = chrono::Utc::now();
                write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S%.3fZ"))
            }
        }
    }
}

/// Process-wide logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive string, e.g. `"info"` or `"relay_core=debug"`.
    pub level: String,
    pub location: bool,
    pub target: bool,
    pub timezone: LogTimezone,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            location: false,
            target: false,
            timezone: LogTimezone::Local,
        }
    }
}

/// Installs a global `tracing_subscriber` once. Subsequent calls in the
/// same process are no-ops, guarded by [`Once`], so the CLI and its
/// integration tests may both call this safely.
pub fn init(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_file(config.location)
            .with_line_number(config.location)
            .with_target(config.target)
            .with_ansi(is_terminal())
            .with_timer(ConfigurableTimer::new(config.timezone))
            .init();
    });
}

fn is_terminal() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal()
}
