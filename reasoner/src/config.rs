//! Defines [`ReasonerConfig`], the settings of a [`Reasoner`](crate::Reasoner).
use std::path::{Path, PathBuf};

pub use chaser_api::backend::{Algorithm, LogLevel, RuleRewriteStrategy};

use crate::error::ConfigurationError;

/// The settings of a [`Reasoner`](crate::Reasoner).
///
/// Settings are passed to the backend at every load or materialization,
/// so changing them while a session is open only affects subsequent calls.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReasonerConfig {
    algorithm: Algorithm,
    timeout: Option<u32>,
    rule_rewrite_strategy: RuleRewriteStrategy,
    log_level: LogLevel,
    log_file: Option<PathBuf>,
}

impl ReasonerConfig {
    /// Build the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// The chase variant used for materialization.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The maximum duration of a materialization, in seconds
    /// (`None` means unbounded).
    pub fn timeout(&self) -> Option<u32> {
        self.timeout
    }

    /// How rules are rewritten before being passed to the backend.
    pub fn rule_rewrite_strategy(&self) -> RuleRewriteStrategy {
        self.rule_rewrite_strategy
    }

    /// The verbosity of the backend log.
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// The file the backend appends its log to, if any.
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Change the [`algorithm`](Self::algorithm)
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Change the [`timeout`](Self::timeout)
    ///
    /// NB: a zero timeout is rejected when the configuration is used.
    ///
    /// See also [`with_no_timeout`](Self::with_no_timeout)
    pub fn with_timeout(mut self, seconds: u32) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Change the [`timeout`](Self::timeout)
    ///
    /// See also [`with_timeout`](Self::with_timeout)
    pub fn with_no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Change the [`rule_rewrite_strategy`](Self::rule_rewrite_strategy)
    pub fn with_rule_rewrite_strategy(mut self, strategy: RuleRewriteStrategy) -> Self {
        self.rule_rewrite_strategy = strategy;
        self
    }

    /// Change the [`log_level`](Self::log_level)
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Change the [`log_file`](Self::log_file)
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Change the [`log_file`](Self::log_file)
    pub fn with_no_log_file(mut self) -> Self {
        self.log_file = None;
        self
    }

    /// Check that this configuration is valid.
    pub fn check(&self) -> Result<(), ConfigurationError> {
        if self.timeout == Some(0) {
            return Err(ConfigurationError::InvalidTimeout);
        }
        Ok(())
    }

    pub(crate) fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.algorithm = algorithm;
    }

    pub(crate) fn set_timeout(&mut self, timeout: Option<u32>) -> Result<(), ConfigurationError> {
        if timeout == Some(0) {
            return Err(ConfigurationError::InvalidTimeout);
        }
        self.timeout = timeout;
        Ok(())
    }

    pub(crate) fn set_rule_rewrite_strategy(&mut self, strategy: RuleRewriteStrategy) {
        self.rule_rewrite_strategy = strategy;
    }

    pub(crate) fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
    }

    pub(crate) fn set_log_file(&mut self, path: Option<PathBuf>) {
        self.log_file = path;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = ReasonerConfig::new();
        assert_eq!(config.algorithm(), Algorithm::RestrictedChase);
        assert_eq!(config.timeout(), None);
        assert_eq!(config.rule_rewrite_strategy(), RuleRewriteStrategy::None);
        assert_eq!(config.log_level(), LogLevel::Warning);
        assert_eq!(config.log_file(), None);
        assert!(config.check().is_ok());
    }

    #[test]
    fn builder() {
        let config = ReasonerConfig::new()
            .with_algorithm(Algorithm::SkolemChase)
            .with_timeout(3)
            .with_rule_rewrite_strategy(RuleRewriteStrategy::SplitHeadPieces)
            .with_log_level(LogLevel::Debug)
            .with_log_file("/tmp/chase.log");
        assert_eq!(config.algorithm(), Algorithm::SkolemChase);
        assert_eq!(config.timeout(), Some(3));
        assert_eq!(config.log_file(), Some(Path::new("/tmp/chase.log")));
        let config = config.with_no_timeout().with_no_log_file();
        assert_eq!(config.timeout(), None);
        assert_eq!(config.log_file(), None);
    }

    #[test]
    fn zero_timeout() {
        let config = ReasonerConfig::new().with_timeout(0);
        assert!(matches!(
            config.check(),
            Err(ConfigurationError::InvalidTimeout)
        ));
        let mut config = ReasonerConfig::new();
        assert!(config.set_timeout(Some(0)).is_err());
        assert!(config.set_timeout(Some(1)).is_ok());
        assert_eq!(config.timeout(), Some(1));
    }
}
