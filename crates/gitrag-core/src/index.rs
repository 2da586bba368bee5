//! Index pipeline: partition → chunk → retriever.
//!
//! The largest known-language bucket builds the index; every other known bucket is
//! added to it afterwards. `UNKNOWN` and `UNSUPPORTED` files are never indexed.

use crate::chunks::chunk_collection;
use crate::language::{Language, LanguageTag};
use crate::partition::{Collection, Partition};
use crate::retriever::{IndexHandle, Retriever};

/// What [`index_partition`] did with each bucket.
#[derive(Debug, Clone)]
pub struct IndexReport {
    pub handle: IndexHandle,
    pub primary: Language,
    /// Buckets added after the primary one, with their document counts.
    pub added: Vec<(Language, usize)>,
    /// Sentinel buckets left out, with their document counts.
    pub skipped: Vec<(LanguageTag, usize)>,
}

/// The known-language bucket with the most documents. Ties go to the earlier language.
pub fn primary_collection<'p>(partition: &'p Partition) -> Option<Collection<'p>> {
    partition
        .collections()
        .filter(|c| !c.language().is_sentinel())
        .reduce(|best, c| if c.len() > best.len() { c } else { best })
}

/// Chunk every known bucket of `partition` and feed it to `retriever` under `index_name`.
pub async fn index_partition<R: Retriever>(
    retriever: &mut R,
    index_name: &str,
    partition: &Partition,
    chunk_size: usize,
) -> Result<IndexReport, IndexError> {
    let primary = primary_collection(partition).ok_or(IndexError::NothingToIndex)?;
    let primary_lang = primary
        .language()
        .language()
        .ok_or(IndexError::NothingToIndex)?;

    tracing::info!("Indexing {} {} files ...", primary.len(), primary_lang);
    let handle = retriever
        .index(index_name, chunk_collection(&primary, chunk_size))
        .await
        .map_err(IndexError::retriever)?;

    let mut added = Vec::new();
    let mut skipped = Vec::new();
    for collection in partition.collections() {
        let tag = collection.language();
        let Some(lang) = tag.language() else {
            tracing::debug!("Skipping {} {} files", collection.len(), tag);
            skipped.push((tag, collection.len()));
            continue;
        };
        if lang == primary_lang {
            continue;
        }
        tracing::info!("Adding {} {} files ...", collection.len(), lang);
        retriever
            .add_to_index(index_name, chunk_collection(&collection, chunk_size))
            .await
            .map_err(IndexError::retriever)?;
        added.push((lang, collection.len()));
    }

    Ok(IndexReport {
        handle,
        primary: primary_lang,
        added,
        skipped,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("no files in a supported language to index")]
    NothingToIndex,
    #[error("retriever error: {0}")]
    Retriever(Box<dyn std::error::Error + Send + Sync>),
}

impl IndexError {
    fn retriever<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
        IndexError::Retriever(Box::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunks::Chunk;
    use crate::partition::{partition, FileRecord};
    use crate::retriever::SearchHit;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(&'static str, String, Vec<String>)>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("never")]
    struct Never;

    impl Retriever for Recorder {
        type Error = Never;

        async fn index(&mut self, name: &str, chunks: Vec<Chunk>) -> Result<IndexHandle, Never> {
            let n = chunks.len();
            self.calls.push(("index", name.into(), ids(&chunks)));
            Ok(IndexHandle { name: name.into(), chunks: n })
        }

        async fn add_to_index(&mut self, name: &str, chunks: Vec<Chunk>) -> Result<(), Never> {
            self.calls.push(("add", name.into(), ids(&chunks)));
            Ok(())
        }

        async fn search(&self, _: &str, _: &str, _: usize) -> Result<Vec<SearchHit>, Never> {
            Ok(Vec::new())
        }
    }

    fn ids(chunks: &[Chunk]) -> Vec<String> {
        chunks.iter().map(|c| c.document_id.clone()).collect()
    }

    fn record(path: &str, language: LanguageTag) -> FileRecord {
        FileRecord {
            relative_path: path.into(),
            filename: path.into(),
            document: format!("body of {path}"),
            extension: String::new(),
            content_hash: String::new(),
            language,
        }
    }

    #[tokio::test]
    async fn largest_known_bucket_is_indexed_first() {
        let py = LanguageTag::Known(Language::Python);
        let md = LanguageTag::Known(Language::Markdown);
        let p = partition(vec![
            record("README.md", md),
            record("a.py", py),
            record("b.py", py),
            record("x.dat", LanguageTag::Unknown),
            record("y.dat", LanguageTag::Unknown),
            record("z.dat", LanguageTag::Unknown),
            record("notes.txt", LanguageTag::Unsupported),
        ]);

        let mut r = Recorder::default();
        let report = index_partition(&mut r, "repo", &p, 256).await.unwrap();

        assert_eq!(report.primary, Language::Python);
        assert_eq!(report.handle.chunks, 2);
        assert_eq!(report.added, [(Language::Markdown, 1)]);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(
            r.calls,
            [
                ("index", "repo".to_string(), vec!["a.py".to_string(), "b.py".to_string()]),
                ("add", "repo".to_string(), vec!["README.md".to_string()]),
            ]
        );
    }

    #[test]
    fn ties_go_to_the_earlier_language() {
        let p = partition(vec![
            record("b.rs", LanguageTag::Known(Language::Rust)),
            record("a.go", LanguageTag::Known(Language::Go)),
        ]);
        let primary = primary_collection(&p).unwrap();
        assert_eq!(primary.language(), LanguageTag::Known(Language::Go));
    }

    #[tokio::test]
    async fn sentinel_only_partition_has_nothing_to_index() {
        let p = partition(vec![record("x", LanguageTag::Unknown)]);
        let mut r = Recorder::default();
        let err = index_partition(&mut r, "repo", &p, 256).await.unwrap_err();
        assert!(matches!(err, IndexError::NothingToIndex));
        assert!(r.calls.is_empty());
    }
}
