//! Configuration for execution strategies and blocking waits.
//!
//! Layering, lowest precedence first:
//! 1. [`Config::default`]
//! 2. Environment variables via [`Config::from_env`]
//! 3. A TOML document via [`Config::from_toml_str`] / [`Config::from_file`]
//!    (requires the `config-file` feature)
//!
//! Every loader finishes with [`Config::validate`].

use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "config-file")]
use std::path::Path;

/// Environment variable selecting the executor kind.
pub const ENV_EXECUTOR: &str = "ACCRETE_EXECUTOR";
/// Environment variable setting the worker count for pooled executors.
pub const ENV_THREADS: &str = "ACCRETE_THREADS";
/// Environment variable setting the worker thread name prefix.
pub const ENV_THREAD_NAME: &str = "ACCRETE_THREAD_NAME";
/// Environment variable setting the default wait timeout in milliseconds.
pub const ENV_DEFAULT_TIMEOUT_MS: &str = "ACCRETE_DEFAULT_TIMEOUT_MS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_THREAD_NAME: &str = "accrete-worker";

/// Errors produced while loading or validating configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A pooled executor was configured with zero threads.
    #[error("executor thread count must be at least 1")]
    ZeroThreads,
    /// The default timeout was zero.
    #[error("default timeout must be non-zero")]
    ZeroTimeout,
    /// The worker thread name prefix was empty.
    #[error("executor thread name must not be empty")]
    EmptyThreadName,
    /// The executor kind was not recognised.
    #[error("unknown executor kind `{0}` (expected inline, single, pool or global)")]
    UnknownExecutor(String),
    /// A numeric setting could not be parsed.
    #[error("invalid value `{value}` for {key}")]
    InvalidNumber {
        /// Setting name.
        key: &'static str,
        /// Raw value.
        value: String,
    },
    /// The TOML document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    /// The configuration file could not be read.
    #[error("failed to read configuration file: {0}")]
    Io(String),
}

/// Which execution strategy runs spawned computations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-file", serde(rename_all = "snake_case"))]
pub enum ExecutorKind {
    /// Run computations on the calling thread.
    Inline,
    /// One dedicated worker thread; computations run in submission order.
    #[cfg_attr(feature = "config-file", serde(alias = "single"))]
    SingleThread,
    /// A dedicated pool of worker threads.
    Pool,
    /// The process-wide rayon pool.
    #[default]
    Global,
}

impl ExecutorKind {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::SingleThread => "single",
            Self::Pool => "pool",
            Self::Global => "global",
        }
    }
}

impl FromStr for ExecutorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "single" | "single_thread" | "single-thread" => Ok(Self::SingleThread),
            "pool" => Ok(Self::Pool),
            "global" => Ok(Self::Global),
            other => Err(ConfigError::UnknownExecutor(other.to_string())),
        }
    }
}

/// Execution strategy settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct ExecutorConfig {
    /// Strategy kind.
    pub kind: ExecutorKind,
    /// Worker count for [`ExecutorKind::Pool`]. `None` uses available parallelism.
    pub threads: Option<usize>,
    /// Worker thread name prefix for dedicated pools.
    pub thread_name: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            kind: ExecutorKind::default(),
            threads: None,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl ExecutorConfig {
    /// A strategy running everything on one dedicated thread.
    #[must_use]
    pub fn single_thread() -> Self {
        Self {
            kind: ExecutorKind::SingleThread,
            ..Self::default()
        }
    }

    /// A dedicated pool with `threads` workers.
    #[must_use]
    pub fn pool(threads: usize) -> Self {
        Self {
            kind: ExecutorKind::Pool,
            threads: Some(threads),
            ..Self::default()
        }
    }

    /// Run computations on the calling thread.
    #[must_use]
    pub fn inline() -> Self {
        Self {
            kind: ExecutorKind::Inline,
            ..Self::default()
        }
    }

    /// Sets the worker thread name prefix.
    #[must_use]
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Validates the executor settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        if self.thread_name.trim().is_empty() {
            return Err(ConfigError::EmptyThreadName);
        }
        Ok(())
    }
}

/// Top-level configuration.
///
/// # Example
///
/// ```
/// use accrete::config::{Config, ExecutorConfig, ExecutorKind};
/// use std::time::Duration;
///
/// let config = Config::default()
///     .with_executor(ExecutorConfig::pool(4))
///     .with_default_timeout(Duration::from_secs(2));
/// assert!(config.validate().is_ok());
/// assert_eq!(config.executor.kind, ExecutorKind::Pool);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct Config {
    /// Default execution strategy for [`AsyncCell::spawn`](crate::cell::AsyncCell::spawn).
    pub executor: ExecutorConfig,
    /// Timeout used by [`AsyncCell::result_default`](crate::cell::AsyncCell::result_default).
    #[cfg_attr(feature = "config-file", serde(with = "millis", rename = "default_timeout_ms"))]
    pub default_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            executor: ExecutorConfig::default(),
            default_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Replaces the executor settings.
    #[must_use]
    pub fn with_executor(mut self, executor: ExecutorConfig) -> Self {
        self.executor = executor;
        self
    }

    /// Replaces the default timeout.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.executor.validate()?;
        if self.default_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Loads defaults overlaid with `ACCRETE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads defaults overlaid with values from `lookup`.
    ///
    /// `lookup` receives the environment variable names; unset keys return `None`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(kind) = lookup(ENV_EXECUTOR) {
            config.executor.kind = kind.parse()?;
        }
        if let Some(threads) = lookup(ENV_THREADS) {
            config.executor.threads = Some(parse_number(ENV_THREADS, &threads)?);
        }
        if let Some(name) = lookup(ENV_THREAD_NAME) {
            config.executor.thread_name = name;
        }
        if let Some(ms) = lookup(ENV_DEFAULT_TIMEOUT_MS) {
            config.default_timeout =
                Duration::from_millis(parse_number(ENV_DEFAULT_TIMEOUT_MS, &ms)?);
        }
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document.
    ///
    /// ```toml
    /// default_timeout_ms = 5000
    ///
    /// [executor]
    /// kind = "pool"
    /// threads = 4
    /// thread_name = "validators"
    /// ```
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(document).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    #[cfg(feature = "config-file")]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let document =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml_str(&document)
    }
}

fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        })
}

#[cfg(feature = "config-file")]
mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_is_valid() {
        init_test_logging();
        crate::test_phase!("default_is_valid");
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.executor.kind, ExecutorKind::Global);
        assert_eq!(config.default_timeout, Duration::from_secs(10));
    }

    #[test]
    fn env_overlay() {
        init_test_logging();
        crate::test_phase!("env_overlay");
        let config = Config::from_lookup(lookup_from(&[
            (ENV_EXECUTOR, "pool"),
            (ENV_THREADS, "3"),
            (ENV_THREAD_NAME, "checks"),
            (ENV_DEFAULT_TIMEOUT_MS, "250"),
        ]))
        .expect("valid env");
        assert_eq!(config.executor.kind, ExecutorKind::Pool);
        assert_eq!(config.executor.threads, Some(3));
        assert_eq!(config.executor.thread_name, "checks");
        assert_eq!(config.default_timeout, Duration::from_millis(250));
    }

    #[test]
    fn env_rejects_bad_values() {
        init_test_logging();
        crate::test_phase!("env_rejects_bad_values");
        assert_eq!(
            Config::from_lookup(lookup_from(&[(ENV_EXECUTOR, "fibers")])),
            Err(ConfigError::UnknownExecutor("fibers".to_string()))
        );
        assert!(matches!(
            Config::from_lookup(lookup_from(&[(ENV_THREADS, "many")])),
            Err(ConfigError::InvalidNumber { key: ENV_THREADS, .. })
        ));
        assert_eq!(
            Config::from_lookup(lookup_from(&[(ENV_THREADS, "0")])),
            Err(ConfigError::ZeroThreads)
        );
        assert_eq!(
            Config::from_lookup(lookup_from(&[(ENV_DEFAULT_TIMEOUT_MS, "0")])),
            Err(ConfigError::ZeroTimeout)
        );
    }

    #[test]
    fn executor_kind_parsing() {
        init_test_logging();
        crate::test_phase!("executor_kind_parsing");
        assert_eq!("Single".parse::<ExecutorKind>(), Ok(ExecutorKind::SingleThread));
        assert_eq!("single-thread".parse::<ExecutorKind>(), Ok(ExecutorKind::SingleThread));
        assert_eq!(" inline ".parse::<ExecutorKind>(), Ok(ExecutorKind::Inline));
        assert_eq!(ExecutorKind::Pool.as_str(), "pool");
    }

    #[test]
    fn empty_thread_name_rejected() {
        init_test_logging();
        crate::test_phase!("empty_thread_name_rejected");
        let config = ExecutorConfig::single_thread().thread_name("  ");
        assert_eq!(config.validate(), Err(ConfigError::EmptyThreadName));
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn toml_document() {
        init_test_logging();
        crate::test_phase!("toml_document");
        let config = Config::from_toml_str(
            r#"
            default_timeout_ms = 1500

            [executor]
            kind = "single_thread"
            thread_name = "serial"
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.executor.kind, ExecutorKind::SingleThread);
        assert_eq!(config.executor.thread_name, "serial");
        assert_eq!(config.executor.threads, None);
        assert_eq!(config.default_timeout, Duration::from_millis(1500));
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn toml_parse_error() {
        init_test_logging();
        crate::test_phase!("toml_parse_error");
        assert!(matches!(
            Config::from_toml_str("executor = 5"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn toml_file_round_trip() {
        use std::io::Write as _;

        init_test_logging();
        crate::test_phase!("toml_file_round_trip");
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[executor]\nkind = \"pool\"\nthreads = 3").expect("write");
        let config = Config::from_file(file.path()).expect("valid file");
        assert_eq!(config.executor.kind, ExecutorKind::Pool);
        assert_eq!(config.executor.threads, Some(3));

        let missing = Config::from_file(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
