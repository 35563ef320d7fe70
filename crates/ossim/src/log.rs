//! Diagnostic logging to stderr.
//!
//! Simulation output goes to stdout and never passes through here.

use core::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU8, Ordering},
};
use std::{sync::LazyLock, time::Instant};

use ansi_term::{Color, WithFg};
use snafu::Snafu;

macro_rules! log {
    ($level:expr, $($arg:tt)*) => {
        $crate::log::log($level, format_args!($($arg)*));
    };
}

macro_rules! trace {
    ($($arg:tt)*) => {
        log!($crate::log::LogLevel::Trace, $($arg)*);
    };
}

macro_rules! debug {
    ($($arg:tt)*) => {
        log!($crate::log::LogLevel::Debug, $($arg)*);
    };
}

macro_rules! info {
    ($($arg:tt)*) => {
        log!($crate::log::LogLevel::Info, $($arg)*);
    };
}

macro_rules! warn {
    ($($arg:tt)*) => {
        log!($crate::log::LogLevel::Warn, $($arg)*);
    };
}

#[expect(unused_macros)]
macro_rules! error {
    ($($arg:tt)*) => {
        log!($crate::log::LogLevel::Error, $($arg)*);
    };
}

static START: LazyLock<Instant> = LazyLock::new(Instant::now);
static MAX_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Warn as u8);

/// Sets the least severe level that is still written.
pub fn set_max_level(level: LogLevel) {
    LazyLock::force(&START);
    MAX_LEVEL.store(level as u8, Ordering::Relaxed);
}

#[must_use]
pub fn enabled(level: LogLevel) -> bool {
    level as u8 >= MAX_LEVEL.load(Ordering::Relaxed)
}

pub fn log(level: LogLevel, message: fmt::Arguments) {
    if !enabled(level) {
        return;
    }
    let elapsed = START.elapsed();
    eprintln!("{elapsed:?} {} {message}", LevelFormat(level));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Snafu)]
#[snafu(display("unknown log level `{input}`, expected one of trace, debug, info, warn, error"))]
pub struct ParseLogLevelError {
    input: String,
}

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.to_ascii_lowercase().as_str() {
            "trace" => Self::Trace,
            "debug" => Self::Debug,
            "info" => Self::Info,
            "warn" => Self::Warn,
            "error" => Self::Error,
            _ => return ParseLogLevelSnafu { input: s }.fail(),
        };
        Ok(level)
    }
}

struct LevelFormat(LogLevel);

impl fmt::Display for LevelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (color, msg) = match self.0 {
            LogLevel::Trace => (Color::Magenta, "TRACE"),
            LogLevel::Debug => (Color::Blue, "DEBUG"),
            LogLevel::Info => (Color::Green, " INFO"),
            LogLevel::Warn => (Color::Yellow, " WARN"),
            LogLevel::Error => (Color::Red, "ERROR"),
        };
        write!(f, "{}", WithFg::new(color, msg))
    }
}
