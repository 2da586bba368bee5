//! In-memory vector store for chunk embeddings. Supports add and similarity search.
//! No persistence; a store lives as long as the retriever that owns it.
use crate::chunks::Chunk;
use crate::retriever::SearchHit;

/// A chunk with its embedding, stored for similarity search.
#[derive(Debug, Clone)]
struct IndexedChunk {
    chunk: Chunk,
    /// Unit length, so cosine similarity is a dot product.
    embedding: Vec<f32>,
}

#[derive(Debug, Default)]
pub struct VectorStore {
    items: Vec<IndexedChunk>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn add(&mut self, chunk: Chunk, embedding: Vec<f32>) {
        self.items.push(IndexedChunk {
            chunk,
            embedding: normalize(&embedding),
        });
    }

    /// Pairs chunks with embeddings positionally; extra items on either side are ignored.
    pub fn add_batch(&mut self, chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) {
        if chunks.len() != embeddings.len() {
            tracing::warn!(
                chunks = chunks.len(),
                embeddings = embeddings.len(),
                "embedding count mismatch"
            );
        }
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            self.add(chunk, embedding);
        }
    }

    /// Up to `k` chunks ranked by cosine similarity to the query embedding.
    pub fn search(&self, query_embedding: &[f32], k: usize) -> Vec<SearchHit> {
        if self.items.is_empty() || query_embedding.is_empty() {
            return Vec::new();
        }
        let q_norm = normalize(query_embedding);
        let mut scored: Vec<SearchHit> = self
            .items
            .iter()
            .map(|ic| SearchHit {
                chunk: ic.chunk.clone(),
                score: dot(&q_norm, &ic.embedding),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm <= 0.0 {
        return v.to_vec();
    }
    v.iter().map(|x| x / norm).collect()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
