//! Log subscriber setup.
//!
//! macrus emits through `tracing`; installing a subscriber is the
//! application's call. [`init`] is the short path: an `EnvFilter`, plus
//! human-readable text or one JSON object per line.
//!
//! ```rust,no_run
//! # fn main() -> Result<(), macrus::Error> {
//! macrus::logging::init(&macrus::logging::LoggingConfig::from_env()?)?;
//! # Ok(())
//! # }
//! ```

use std::str::FromStr;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::Error;

/// Environment variable holding the filter directives.
pub const FILTER_ENV: &str = "RUST_LOG";
/// Environment variable selecting the output format (`text` or `json`).
pub const FORMAT_ENV: &str = "MACRUS_LOG_FORMAT";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(Error::Format(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `info,macrus=debug`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".to_owned(), format: LogFormat::Text }
    }
}

impl LoggingConfig {
    /// Reads [`FILTER_ENV`] and [`FORMAT_ENV`], falling back to the defaults
    /// for unset or empty variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();
        if let Some(filter) = lookup(FILTER_ENV).filter(|f| !f.is_empty()) {
            config.filter = filter;
        }
        if let Some(format) = lookup(FORMAT_ENV).filter(|f| !f.is_empty()) {
            config.format = format.parse()?;
        }
        Ok(config)
    }
}

/// Installs the global subscriber described by `config`.
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<(), Error> {
    let filter = EnvFilter::try_new(&config.filter)?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Text => registry.with(fmt::layer()).try_init()?,
        LogFormat::Json => registry.with(fmt::layer().json()).try_init()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = LoggingConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, LoggingConfig::default());
        assert_eq!(config.filter, "info");
        assert_eq!(config.format, LogFormat::Text);
    }

    #[test]
    fn reads_filter_and_format() {
        let config = LoggingConfig::from_lookup(lookup(&[
            (FILTER_ENV, "warn,macrus=info"),
            (FORMAT_ENV, "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.filter, "warn,macrus=info");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = LoggingConfig::from_lookup(lookup(&[(FORMAT_ENV, "xml")])).unwrap_err();
        assert!(matches!(err, Error::Format(ref f) if f == "xml"));
    }

    #[test]
    fn invalid_filter_fails_before_installing() {
        let config = LoggingConfig { filter: "macrus=loud".to_owned(), format: LogFormat::Text };
        assert!(matches!(init(&config), Err(Error::Filter(_))));
    }
}
