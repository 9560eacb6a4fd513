//! Leveled stderr logging through an explicit [`Logger`] handle.
//!
//! The binary creates one logger at startup and hands clones to the
//! components that log. Use the `info!`, `warn!` and `error!` macros, which
//! take the logger as their first argument.

use std::fmt::Display;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Log level for filtering messages.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Info => f.pad("INFO"),
            Level::Warn => f.pad("WARN"),
            Level::Error => f.pad("ERROR"),
        }
    }
}

/// Converts days since Unix epoch to (year, month, day).
fn days_to_date(days: u64) -> (u32, u32, u32) {
    // Howard Hinnant's civil_from_days
    let z = days as i64 + 719468;
    let era = z.div_euclid(146097);
    let doe = z.rem_euclid(146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y as u32, m, d)
}

/// UTC `YYYY-MM-DD HH:MM:SS.mmm` for the current instant.
fn timestamp() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = now.as_secs();
    let (year, month, day) = days_to_date(secs / 86400);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
        year,
        month,
        day,
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60,
        now.subsec_millis()
    )
}

/// Cloneable logging handle.
#[derive(Debug, Clone)]
pub struct Logger {
    name: String,
    min_level: Level,
    show_timestamp: bool,
    show_type: bool,
}

impl Logger {
    /// Logger for component `name`, printing every level with timestamps.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_level: Level::Info,
            show_timestamp: true,
            show_type: true,
        }
    }

    /// Same settings under a different component name.
    pub fn named(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_timestamp(mut self, show: bool) -> Self {
        self.show_timestamp = show;
        self
    }

    pub fn with_type(mut self, show: bool) -> Self {
        self.show_type = show;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    /// Prefix written before the message, without color.
    fn prefix(&self, level: Level) -> String {
        let mut out = String::new();
        if self.show_timestamp {
            out.push_str(&timestamp());
            out.push(' ');
        }
        if self.show_type {
            out.push_str(&format!("[{:5}] ", level));
        }
        if !self.name.is_empty() {
            out.push_str(&format!("{}: ", self.name));
        }
        out
    }

    /// Internal logging function. Use the `info!`, `warn!`, or `error!` macros instead.
    #[doc(hidden)]
    pub fn log(&self, level: Level, message: &str) {
        if !self.enabled(level) {
            return;
        }

        let mut stderr = StandardStream::stderr(ColorChoice::Auto);
        let mut spec = ColorSpec::new();
        match level {
            Level::Warn => {
                spec.set_fg(Some(Color::Yellow)).set_bold(true);
            }
            Level::Error => {
                spec.set_fg(Some(Color::Red)).set_bold(true);
            }
            Level::Info => {
                spec.clear();
            }
        }
        let _ = stderr.set_color(&spec);
        let _ = writeln!(stderr, "{}{}", self.prefix(level), message);
        let _ = stderr.reset();
    }
}

/// Logs an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)*) => {{
        if cfg!(not(test)) {
            $logger.log($crate::utils::log::Level::Info, &format!($($arg)*));
        }
    }};
}

/// Logs a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)*) => {{
        if cfg!(not(test)) {
            $logger.log($crate::utils::log::Level::Warn, &format!($($arg)*));
        }
    }};
}

/// Logs an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)*) => {{
        if cfg!(not(test)) {
            $logger.log($crate::utils::log::Level::Error, &format!($($arg)*));
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering() {
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn level_display() {
        assert_eq!(format!("{}", Level::Info), "INFO");
        assert_eq!(format!("{}", Level::Warn), "WARN");
        assert_eq!(format!("{}", Level::Error), "ERROR");
        assert_eq!(format!("{:5}|", Level::Info), "INFO |");
        assert_eq!(format!("{:5}|", Level::Error), "ERROR|");
    }

    #[test]
    fn min_level_filters() {
        let logger = Logger::new("chain").with_min_level(Level::Warn);
        assert!(!logger.enabled(Level::Info));
        assert!(logger.enabled(Level::Warn));
        assert!(logger.enabled(Level::Error));
    }

    #[test]
    fn prefix_respects_flags() {
        let logger = Logger::new("pool").with_timestamp(false);
        assert_eq!(logger.prefix(Level::Warn), "[WARN ] pool: ");
        assert_eq!(logger.prefix(Level::Error), "[ERROR] pool: ");

        let bare = logger.with_type(false);
        assert_eq!(bare.prefix(Level::Info), "pool: ");
        assert_eq!(bare.named("").prefix(Level::Info), "");
    }

    #[test]
    fn named_keeps_settings() {
        let logger = Logger::new("node")
            .with_min_level(Level::Error)
            .with_timestamp(false);
        let child = logger.named("chain");
        assert_eq!(child.name(), "chain");
        assert!(!child.enabled(Level::Warn));
        assert!(!child.prefix(Level::Error).contains('-'));
    }

    #[test]
    fn macros_accept_handle() {
        let logger = Logger::new("test");
        crate::info!(logger, "value {}", 1);
        crate::warn!(&logger, "value {}", 2);
        crate::error!(logger, "done");
    }

    #[test]
    fn days_to_date_epoch() {
        assert_eq!(days_to_date(0), (1970, 1, 1));
    }

    #[test]
    fn days_to_date_known_date() {
        // 2024-01-01 is 19723 days after epoch
        assert_eq!(days_to_date(19723), (2024, 1, 1));
    }

    #[test]
    fn days_to_date_leap_year() {
        assert_eq!(days_to_date(19782), (2024, 2, 29));
    }
}
