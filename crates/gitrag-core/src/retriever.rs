//! The retrieval collaborator seam, plus the request/response shapes used to query it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chunks::Chunk;

/// Something that can build a named index from chunks and answer queries against it.
#[allow(async_fn_in_trait)]
pub trait Retriever {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create (or overwrite) `index_name` from `chunks`.
    async fn index(&mut self, index_name: &str, chunks: Vec<Chunk>) -> Result<IndexHandle, Self::Error>;

    /// Append `chunks` to an existing index.
    async fn add_to_index(&mut self, index_name: &str, chunks: Vec<Chunk>) -> Result<(), Self::Error>;

    /// Up to `k` hits, best first.
    async fn search(&self, index_name: &str, query: &str, k: usize) -> Result<Vec<SearchHit>, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHandle {
    pub name: String,
    pub chunks: usize,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub chunk: Chunk,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub k: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub documents: Vec<Document>,
}

impl From<SearchHit> for Document {
    fn from(hit: SearchHit) -> Self {
        let mut metadata = hit.chunk.metadata.to_map();
        metadata.insert("document_id".to_string(), hit.chunk.document_id);
        metadata.insert("score".to_string(), hit.score.to_string());
        Self {
            page_content: hit.chunk.text,
            metadata,
        }
    }
}

impl FromIterator<SearchHit> for SearchResponse {
    fn from_iter<I: IntoIterator<Item = SearchHit>>(hits: I) -> Self {
        Self {
            documents: hits.into_iter().map(Document::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::FileMetadata;

    #[test]
    fn hits_become_documents() {
        let hit = SearchHit {
            chunk: Chunk {
                document_id: "src/lib.rs".into(),
                index: 0,
                text: "fn main() {}".into(),
                metadata: FileMetadata {
                    filename: "lib.rs".into(),
                    path: "src/lib.rs".into(),
                    language: "RUST".into(),
                    content_hash: "abc".into(),
                    extension: ".rs".into(),
                },
            },
            score: 0.5,
        };
        let response: SearchResponse = vec![hit].into_iter().collect();
        let doc = &response.documents[0];
        assert_eq!(doc.page_content, "fn main() {}");
        assert_eq!(doc.metadata["language"], "RUST");
        assert_eq!(doc.metadata["document_id"], "src/lib.rs");
        assert_eq!(doc.metadata["score"], "0.5");

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["documents"][0]["page_content"].is_string());
    }

    #[test]
    fn request_shape() {
        let req: SearchRequest = serde_json::from_str(r#"{"query":"parse args","k":3}"#).unwrap();
        assert_eq!(req.k, 3);
    }
}
