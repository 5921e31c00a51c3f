//! Configuration for the retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrievalError};

/// Configuration parameters for the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Number of top results to return per collection query.
    pub top_k: usize,
    /// Minimum relevance score for reranked results. A value of `0.0`
    /// disables threshold filtering entirely.
    pub min_score: f32,
    /// Whether to attempt hybrid (lexical + vector) search before falling
    /// back to plain vector search.
    pub hybrid_search: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5, min_score: 0.0, hybrid_search: false }
    }
}

impl RetrievalConfig {
    /// Create a new builder for constructing a [`RetrievalConfig`].
    pub fn builder() -> RetrievalConfigBuilder {
        RetrievalConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RetrievalConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetrievalConfigBuilder {
    config: RetrievalConfig,
}

impl RetrievalConfigBuilder {
    /// Set the number of top results to return per collection query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum relevance score for reranked results.
    pub fn min_score(mut self, score: f32) -> Self {
        self.config.min_score = score;
        self
    }

    /// Enable or disable hybrid search.
    pub fn hybrid_search(mut self, enabled: bool) -> Self {
        self.config.hybrid_search = enabled;
        self
    }

    /// Build the [`RetrievalConfig`], validating that parameters are
    /// consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::ConfigError`] if:
    /// - `top_k == 0`
    /// - `min_score` is not a finite number
    pub fn build(self) -> Result<RetrievalConfig> {
        if self.config.top_k == 0 {
            return Err(RetrievalError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if !self.config.min_score.is_finite() {
            return Err(RetrievalError::ConfigError(format!(
                "min_score must be finite, got {}",
                self.config.min_score
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_zero_top_k() {
        let result = RetrievalConfig::builder().top_k(0).build();
        assert!(matches!(result, Err(RetrievalError::ConfigError(_))));
    }

    #[test]
    fn builder_rejects_non_finite_min_score() {
        let result = RetrievalConfig::builder().min_score(f32::NAN).build();
        assert!(matches!(result, Err(RetrievalError::ConfigError(_))));
    }

    #[test]
    fn builder_accepts_defaults() {
        let config = RetrievalConfig::builder().build().unwrap();
        assert_eq!(config, RetrievalConfig::default());
    }
}
