//! Embedding client abstraction and adapters.
//!
//! The ranker only needs "text in, fixed-size vector out". Two adapters are provided: an
//! Ollama-backed client that issues HTTP requests to a local runtime, and a deterministic hashing
//! client for offline runs. Either is built once per run by [`connect_embedding_client`] and
//! handed to the ranker by reference.

use crate::config::{Config, EmbeddingProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider or model could not be reached at startup.
    #[error("Embedding provider unavailable: {0}")]
    Unavailable(String),
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce an embedding vector for each supplied text, in input order.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;
}

/// Deterministic embedding client that hashes bytes into vector slots.
pub struct HashedEmbeddingClient {
    dimension: usize,
}

impl HashedEmbeddingClient {
    /// Construct a hashing client producing vectors of `dimension` slots.
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn encode(text: &str, dimension: usize) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; dimension];

        if text.is_empty() {
            return embedding;
        }

        for (idx, byte) in text.bytes().enumerate() {
            let position = (idx.wrapping_mul(31) ^ usize::from(byte)) % dimension;
            embedding[position] += f32::from(byte) / 255.0;
        }

        let norm = embedding
            .iter()
            .map(|value| value * value)
            .sum::<f32>()
            .sqrt();

        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl EmbeddingClient for HashedEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if self.dimension == 0 {
            return Err(EmbeddingClientError::GenerationFailed(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }

        Ok(texts
            .iter()
            .map(|text| Self::encode(text, self.dimension))
            .collect())
    }
}

/// Embedding client backed by a local Ollama runtime.
pub struct OllamaEmbeddingClient {
    http: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

impl OllamaEmbeddingClient {
    /// Construct a client for `model` served at `base_url`.
    pub fn new(base_url: &str, model: &str) -> Result<Self, EmbeddingClientError> {
        let http = Client::builder()
            .user_agent("section-rank/embed")
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|error| EmbeddingClientError::Unavailable(error.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Confirm the runtime is reachable and serves the configured model.
    pub async fn probe(&self) -> Result<(), EmbeddingClientError> {
        let response = self
            .http
            .get(self.endpoint("api/tags"))
            .send()
            .await
            .map_err(|error| {
                EmbeddingClientError::Unavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            return Err(EmbeddingClientError::Unavailable(format!(
                "Ollama at {} answered {}",
                self.base_url,
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|error| EmbeddingClientError::InvalidResponse(error.to_string()))?;

        if tags
            .models
            .iter()
            .any(|entry| model_matches(&entry.name, &self.model))
        {
            Ok(())
        } else {
            Err(EmbeddingClientError::Unavailable(format!(
                "model '{}' is not installed in Ollama",
                self.model
            )))
        }
    }
}

/// Ollama reports untagged models with an implicit `:latest` suffix.
fn model_matches(installed: &str, wanted: &str) -> bool {
    installed == wanted
        || installed
            .strip_suffix(":latest")
            .is_some_and(|base| base == wanted)
}

#[async_trait]
impl EmbeddingClient for OllamaEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let expected = texts.len();
        tracing::debug!(model = %self.model, inputs = expected, "Requesting embeddings");

        let response = self
            .http
            .post(self.endpoint("api/embed"))
            .json(&json!({ "model": self.model, "input": texts }))
            .send()
            .await
            .map_err(|error| EmbeddingClientError::GenerationFailed(error.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|error| EmbeddingClientError::InvalidResponse(error.to_string()))?;

        if parsed.embeddings.len() != expected {
            return Err(EmbeddingClientError::InvalidResponse(format!(
                "expected {expected} vectors, got {}",
                parsed.embeddings.len()
            )));
        }

        Ok(parsed.embeddings)
    }
}

/// Build the configured embedding client and verify it can serve requests.
///
/// Called once per run; failure here is fatal for the run.
pub async fn connect_embedding_client(
    config: &Config,
) -> Result<Box<dyn EmbeddingClient>, EmbeddingClientError> {
    match config.embedding_provider {
        EmbeddingProvider::Hashed => {
            if config.embedding_dimension == 0 {
                return Err(EmbeddingClientError::Unavailable(
                    "embedding dimension must be greater than zero".to_string(),
                ));
            }
            tracing::info!(
                dimension = config.embedding_dimension,
                "Using hashed embedding client"
            );
            Ok(Box::new(HashedEmbeddingClient::new(
                config.embedding_dimension,
            )))
        }
        EmbeddingProvider::Ollama => {
            let client = OllamaEmbeddingClient::new(&config.ollama_url, &config.embedding_model)?;
            client.probe().await?;
            tracing::info!(
                url = %config.ollama_url,
                model = %config.embedding_model,
                "Ollama embedding client ready"
            );
            Ok(Box::new(client))
        }
    }
}
