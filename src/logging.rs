//! Log setup for the command-line tool.
//!
//! Logs go to stderr so that JSON written to stdout stays parseable. `RUST_LOG` takes precedence over the level
//! chosen on the command line.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
  Error,
  #[default]
  Warn,
  Info,
  Debug,
  Trace,
}

impl LogLevel {
  /// `-v` count to level: none is `Warn`, then `Info`, `Debug`, and `Trace` for three or more.
  pub fn from_verbosity(count: u8) -> Self {
    match count {
      0 => Self::Warn,
      1 => Self::Info,
      2 => Self::Debug,
      _ => Self::Trace,
    }
  }

  fn as_str(&self) -> &'static str {
    match self {
      Self::Error => "error",
      Self::Warn => "warn",
      Self::Info => "info",
      Self::Debug => "debug",
      Self::Trace => "trace",
    }
  }
}

/// Installs the global subscriber; fails if one is already set.
pub fn try_init(level: LogLevel) -> Result<(), TryInitError> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

  tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).finish().try_init()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_log_level_from_verbosity() {
    assert_eq!(LogLevel::Warn, LogLevel::from_verbosity(0));
    assert_eq!(LogLevel::Info, LogLevel::from_verbosity(1));
    assert_eq!(LogLevel::Debug, LogLevel::from_verbosity(2));
    assert_eq!(LogLevel::Trace, LogLevel::from_verbosity(3));
    assert_eq!(LogLevel::Trace, LogLevel::from_verbosity(200));
  }

  #[test]
  fn test_second_init_is_reported() {
    // the first call may race with other tests in this binary; only the second must fail
    let _ = try_init(LogLevel::Warn);
    assert!(try_init(LogLevel::Debug).is_err());
  }

  #[test]
  fn test_log_level_default() {
    assert_eq!(LogLevel::Warn, LogLevel::default());
    assert_eq!("warn", LogLevel::default().as_str());
  }
}
