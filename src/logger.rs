//! Logging for the crate.
//!
//! Library code logs through the [log] macros. Components that own a named [Logger]
//! get their name prefixed to every line. [init] installs `env_logger`, writing to
//! stderr and keeping the most recent lines in memory.

use std::{collections::VecDeque, fmt::Display, io::Write, sync::Mutex};

use env_logger::{Builder, Target};
use log::{Level, LevelFilter, Record};
use once_cell::sync::Lazy;

/// How many formatted lines [Logger::recent] can return.
const LOG_STORE_CAPACITY: usize = 256;

static LOG_STORE: Lazy<Mutex<VecDeque<String>>> =
    Lazy::new(|| Mutex::new(VecDeque::with_capacity(LOG_STORE_CAPACITY)));

fn add_to_log_store(message: String) {
    // A poisoned store only means another thread panicked mid-push
    let mut store = match LOG_STORE.lock() {
        Ok(v) => v,
        Err(e) => e.into_inner(),
    };

    if store.len() == LOG_STORE_CAPACITY {
        store.pop_front();
    }
    store.push_back(message);
}

fn format_record(record: &Record) -> String {
    format!(
        "{} {:<5} [{}] {}",
        chrono::Local::now().format("%H:%M:%S%.3f"),
        record.level(),
        record.target(),
        record.args()
    )
}

/// Install the logging backend at `level`. `RUST_LOG` can still override per target.
///
/// Calling this more than once only changes the level.
pub fn init(level: LevelFilter) {
    let result = Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(Target::Stderr)
        .format(|buf, record| {
            let line = format_record(record);
            writeln!(buf, "{line}")?;
            add_to_log_store(line);

            Ok(())
        })
        .try_init();

    if result.is_err() {
        log::set_max_level(level);
        log::debug!("Logger already installed");
    }
}

/// A named logger handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logger {
    name: String,
}

impl Logger {
    pub fn create<S: Into<String>>(name: S) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The most recent lines written by the backend, oldest first.
    pub fn recent() -> Vec<String> {
        match LOG_STORE.lock() {
            Ok(v) => v.iter().cloned().collect(),
            Err(e) => e.into_inner().iter().cloned().collect(),
        }
    }

    fn log(&self, level: Level, message: impl Display) {
        log::log!(target: self.name.as_str(), level, "{message}");
    }

    pub fn trace(&self, message: impl Display) {
        self.log(Level::Trace, message);
    }

    pub fn debug(&self, message: impl Display) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl Display) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl Display) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: impl Display) {
        self.log(Level::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Both tests below fill or read the shared store.
    static STORE_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn store_is_bounded() {
        let _guard = STORE_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        for i in 0..LOG_STORE_CAPACITY + 10 {
            add_to_log_store(format!("line {i}"));
        }

        let recent = Logger::recent();
        assert_eq!(recent.len(), LOG_STORE_CAPACITY);
        assert!(recent.iter().any(|v| v == &format!("line {}", LOG_STORE_CAPACITY + 9)));
        assert!(!recent.iter().any(|v| v == "line 0"));
    }

    #[test]
    fn record_format() {
        let line = format_record(
            &Record::builder()
                .args(format_args!("hello"))
                .level(Level::Warn)
                .target("LipSync")
                .build(),
        );

        assert!(line.ends_with("WARN  [LipSync] hello"), "{line}");
    }

    #[test]
    fn init_captures_lines() {
        let _guard = STORE_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        init(LevelFilter::Info);
        init(LevelFilter::Info);

        Logger::create("LoggerTest").info("captured line");

        assert!(Logger::recent()
            .iter()
            .any(|v| v.ends_with("[LoggerTest] captured line")));
    }

    #[test]
    fn named_logger() {
        let logger = Logger::create("LipSync");

        assert_eq!(logger.name(), "LipSync");
        // Without a backend installed these are no-ops
        logger.debug("debug");
        logger.error(format!("error {}", 1));
    }
}
