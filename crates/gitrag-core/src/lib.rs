//! All backend logic independent of how gitrag is run.
//!
//! A repository is cloned into a temp directory, walked, and its files classified and
//! grouped by language ([ingest]). The resulting [Partition] can be chunked and handed
//! to a [Retriever] ([index]).

pub mod app_data;
pub mod chunks;
pub mod classifier;
pub mod config;
pub mod index;
pub mod ingest;
pub mod language;
pub mod ollama;
pub mod partition;
pub mod retriever;
pub mod sampler;
pub mod source;
pub mod store;
pub mod walker;

pub use app_data::app_data_dir;
pub use chunks::{chunk_collection, Chunk, TextSplitter, DEFAULT_CHUNK_SIZE};
pub use classifier::{classify, GuessError, LexerGuesser, SyntectGuesser};
pub use config::{load_config, save_config, Config, ConfigError};
pub use index::{index_partition, primary_collection, IndexError, IndexReport};
pub use ingest::{IngestError, Ingestor};
pub use language::{Language, LanguageTag};
pub use ollama::{OllamaClient, OllamaError, OllamaRetriever};
pub use partition::{partition, Collection, FileMetadata, FileRecord, OwnedCollection, Partition};
pub use retriever::{Document, IndexHandle, Retriever, SearchHit, SearchRequest, SearchResponse};
pub use sampler::SampleConfig;
pub use source::{GitSource, RepoSource, SourceError, WorkingCopy};
pub use walker::{walk, Blacklists, WalkError};

/// Returns a short status string. Used to verify the backend is wired up.
pub fn status() -> &'static str {
    "gitrag-core ready"
}
