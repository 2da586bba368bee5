//! Ollama-backed retriever: embeds chunks with ollama-rs and keeps one in-memory
//! [`VectorStore`] per index name.

use std::collections::HashMap;

use ollama_rs::generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest};
use ollama_rs::Ollama;
use thiserror::Error;

use crate::chunks::Chunk;
use crate::retriever::{IndexHandle, Retriever, SearchHit};
use crate::store::VectorStore;

pub const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
/// Texts sent per embedding request.
const EMBED_BATCH: usize = 64;

#[derive(Debug, Clone)]
pub struct OllamaClient {
    inner: Ollama,
    embed_model: String,
}

impl OllamaClient {
    pub fn from_url(url: &str) -> Result<Self, OllamaError> {
        let inner = Ollama::try_new(url).map_err(OllamaError::ParseUrl)?;
        Ok(Self {
            inner,
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
        })
    }

    /// Set the embedding model (e.g. `nomic-embed-text`, `all-minilm`).
    pub fn with_embed_model(mut self, model: impl Into<String>) -> Self {
        self.embed_model = model.into();
        self
    }

    pub fn embed_model(&self) -> &str {
        &self.embed_model
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, OllamaError> {
        let req = GenerateEmbeddingsRequest::new(
            self.embed_model.clone(),
            EmbeddingsInput::Single(text.to_string()),
        );
        let res = self
            .inner
            .generate_embeddings(req)
            .await
            .map_err(OllamaError::Request)?;
        Ok(res.embeddings.into_iter().next().unwrap_or_default())
    }

    /// One embedding per input, in input order. Large inputs go out in batches.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, OllamaError> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBED_BATCH) {
            let req = GenerateEmbeddingsRequest::new(
                self.embed_model.clone(),
                EmbeddingsInput::Multiple(batch.to_vec()),
            );
            let res = self
                .inner
                .generate_embeddings(req)
                .await
                .map_err(OllamaError::Request)?;
            out.extend(res.embeddings);
        }
        Ok(out)
    }
}

/// [`Retriever`] over Ollama embeddings. Indexes are held in memory only.
#[derive(Debug)]
pub struct OllamaRetriever {
    client: OllamaClient,
    indexes: HashMap<String, VectorStore>,
}

impl OllamaRetriever {
    pub fn new(client: OllamaClient) -> Self {
        Self {
            client,
            indexes: HashMap::new(),
        }
    }

    async fn embed_chunks(&self, chunks: Vec<Chunk>, store: &mut VectorStore) -> Result<(), OllamaError> {
        if chunks.is_empty() {
            return Ok(());
        }
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.client.embed_batch(&texts).await?;
        store.add_batch(chunks, embeddings);
        Ok(())
    }
}

impl Retriever for OllamaRetriever {
    type Error = OllamaError;

    async fn index(&mut self, index_name: &str, chunks: Vec<Chunk>) -> Result<IndexHandle, OllamaError> {
        let mut store = VectorStore::new();
        self.embed_chunks(chunks, &mut store).await?;
        let handle = IndexHandle {
            name: index_name.to_string(),
            chunks: store.len(),
        };
        self.indexes.insert(index_name.to_string(), store);
        Ok(handle)
    }

    async fn add_to_index(&mut self, index_name: &str, chunks: Vec<Chunk>) -> Result<(), OllamaError> {
        let mut store = self
            .indexes
            .remove(index_name)
            .ok_or_else(|| OllamaError::NoSuchIndex(index_name.to_string()))?;
        let result = self.embed_chunks(chunks, &mut store).await;
        self.indexes.insert(index_name.to_string(), store);
        result
    }

    async fn search(&self, index_name: &str, query: &str, k: usize) -> Result<Vec<SearchHit>, OllamaError> {
        let store = self
            .indexes
            .get(index_name)
            .ok_or_else(|| OllamaError::NoSuchIndex(index_name.to_string()))?;
        let query_embedding = self.client.embed(query).await?;
        Ok(store.search(&query_embedding, k))
    }
}

#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("invalid Ollama URL: {0}")]
    ParseUrl(#[from] url::ParseError),
    #[error("Ollama request failed: {0}")]
    Request(#[from] ollama_rs::error::OllamaError),
    #[error("no index named {0}")]
    NoSuchIndex(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_url() {
        assert!(matches!(
            OllamaClient::from_url("not a url"),
            Err(OllamaError::ParseUrl(_))
        ));
    }

    #[tokio::test]
    async fn unknown_index_is_an_error() {
        let client = OllamaClient::from_url(DEFAULT_BASE_URL).unwrap();
        let mut retriever = OllamaRetriever::new(client);
        let err = retriever.add_to_index("missing", Vec::new()).await.unwrap_err();
        assert!(matches!(err, OllamaError::NoSuchIndex(name) if name == "missing"));
    }

    #[tokio::test]
    async fn empty_index_needs_no_requests() {
        let client = OllamaClient::from_url(DEFAULT_BASE_URL).unwrap().with_embed_model("all-minilm");
        let mut retriever = OllamaRetriever::new(client);
        let handle = retriever.index("repo", Vec::new()).await.unwrap();
        assert_eq!(handle.chunks, 0);
        retriever.add_to_index("repo", Vec::new()).await.unwrap();
    }
}
