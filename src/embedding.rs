//! Embedding provider trait and engine selection.

use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrievalError};

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. The default [`embed_batch`](EmbeddingProvider::embed_batch)
/// implementation calls [`embed`](EmbeddingProvider::embed) sequentially;
/// backends that support native batching should override it.
///
/// Engines that distinguish query embeddings from passage embeddings
/// (NVIDIA-style retrieval models) override
/// [`embed_query`](EmbeddingProvider::embed_query); for everyone else it
/// is the same as [`embed`](EmbeddingProvider::embed).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially for each input. Override this method if the backend
    /// supports native batch embedding for better throughput.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Generate an embedding for text that will be used as a search query.
    ///
    /// Defaults to [`embed`](EmbeddingProvider::embed); query-aware engines
    /// override this to request query-side embeddings.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(text).await
    }
}

/// The embedding backend family, resolved once at configuration time.
///
/// Replaces per-call dispatch on engine name strings: parse the configured
/// name with [`FromStr`] during setup and construct the matching
/// [`EmbeddingProvider`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingEngine {
    /// A locally loaded sentence-embedding model.
    Local,
    /// An Ollama server's embedding endpoint.
    Ollama,
    /// The OpenAI embeddings API (or any compatible endpoint).
    OpenAi,
    /// NVIDIA retrieval embedding endpoints, which distinguish query
    /// embeddings from passage embeddings.
    Nvidia,
}

impl EmbeddingEngine {
    /// Whether this engine produces different embeddings for queries and
    /// passages.
    pub fn is_query_aware(&self) -> bool {
        matches!(self, Self::Nvidia)
    }
}

impl FromStr for EmbeddingEngine {
    type Err = RetrievalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "local" => Ok(Self::Local),
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            "nvidia" => Ok(Self::Nvidia),
            other => {
                Err(RetrievalError::ConfigError(format!("unsupported embedding engine: {other}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_engines_parse() {
        assert_eq!("".parse::<EmbeddingEngine>().unwrap(), EmbeddingEngine::Local);
        assert_eq!("ollama".parse::<EmbeddingEngine>().unwrap(), EmbeddingEngine::Ollama);
        assert_eq!("openai".parse::<EmbeddingEngine>().unwrap(), EmbeddingEngine::OpenAi);
        assert_eq!("nvidia".parse::<EmbeddingEngine>().unwrap(), EmbeddingEngine::Nvidia);
    }

    #[test]
    fn unknown_engine_is_a_config_error() {
        let err = "hal9000".parse::<EmbeddingEngine>().unwrap_err();
        assert!(matches!(err, RetrievalError::ConfigError(_)));
    }

    #[test]
    fn only_nvidia_is_query_aware() {
        assert!(EmbeddingEngine::Nvidia.is_query_aware());
        assert!(!EmbeddingEngine::OpenAi.is_query_aware());
        assert!(!EmbeddingEngine::Local.is_query_aware());
    }
}
