//! Groups walked files into per-language collections.
//!
//! Records are stored once, in walk order. Buckets only hold indices into that list, so
//! the documents, ids and metadatas of a collection cannot drift out of alignment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::language::LanguageTag;

/// One file accepted by the walker.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    /// POSIX-style path from the repository root. Used as the document id.
    pub relative_path: String,
    pub filename: String,
    /// File contents decoded as UTF-8, invalid sequences replaced.
    pub document: String,
    /// Lowercased extension with leading dot, or empty.
    pub extension: String,
    /// MD5 of the raw bytes, lowercase hex.
    pub content_hash: String,
    pub language: LanguageTag,
}

impl FileRecord {
    pub fn metadata(&self) -> FileMetadata {
        FileMetadata {
            filename: self.filename.clone(),
            path: self.relative_path.clone(),
            language: self.language.as_str().to_string(),
            content_hash: self.content_hash.clone(),
            extension: self.extension.clone(),
        }
    }
}

/// Per-document metadata handed to the indexer. Field names are part of the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub filename: String,
    pub path: String,
    pub language: String,
    pub content_hash: String,
    pub extension: String,
}

impl FileMetadata {
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("filename".to_string(), self.filename.clone()),
            ("path".to_string(), self.path.clone()),
            ("language".to_string(), self.language.clone()),
            ("content_hash".to_string(), self.content_hash.clone()),
            ("extension".to_string(), self.extension.clone()),
        ])
    }
}

/// All walked files, bucketed by detected language.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    records: Vec<FileRecord>,
    buckets: BTreeMap<LanguageTag, Vec<usize>>,
}

/// Build the partition. Arrival order is kept within each bucket; nothing is dropped.
pub fn partition(records: Vec<FileRecord>) -> Partition {
    let mut buckets: BTreeMap<LanguageTag, Vec<usize>> = BTreeMap::new();
    for (i, record) in records.iter().enumerate() {
        buckets.entry(record.language).or_default().push(i);
    }
    Partition { records, buckets }
}

impl Partition {
    /// Every record in walk order.
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Total number of files across all buckets.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn languages(&self) -> impl Iterator<Item = LanguageTag> + '_ {
        self.buckets.keys().copied()
    }

    pub fn collection(&self, language: LanguageTag) -> Option<Collection<'_>> {
        self.buckets.get(&language).map(|indices| Collection {
            language,
            records: &self.records,
            indices,
        })
    }

    /// Collections in tag order.
    pub fn collections(&self) -> impl Iterator<Item = Collection<'_>> + '_ {
        self.buckets.iter().map(|(&language, indices)| Collection {
            language,
            records: &self.records,
            indices,
        })
    }

    /// Materialise every bucket as three aligned vectors.
    pub fn to_collections(&self) -> BTreeMap<LanguageTag, OwnedCollection> {
        self.collections()
            .map(|c| (c.language(), c.to_owned_collection()))
            .collect()
    }
}

/// Borrowed view of one language bucket.
#[derive(Debug, Clone, Copy)]
pub struct Collection<'a> {
    language: LanguageTag,
    records: &'a [FileRecord],
    indices: &'a [usize],
}

impl<'a> Collection<'a> {
    pub fn language(&self) -> LanguageTag {
        self.language
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &'a FileRecord> + 'a {
        let (records, indices) = (self.records, self.indices);
        indices.iter().map(move |&i| &records[i])
    }

    pub fn documents(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.records().map(|r| r.document.as_str())
    }

    pub fn ids(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.records().map(|r| r.relative_path.as_str())
    }

    pub fn metadatas(&self) -> impl Iterator<Item = FileMetadata> + 'a {
        self.records().map(FileRecord::metadata)
    }

    pub fn to_owned_collection(&self) -> OwnedCollection {
        let mut out = OwnedCollection::default();
        for record in self.records() {
            out.documents.push(record.document.clone());
            out.ids.push(record.relative_path.clone());
            out.metadatas.push(record.metadata());
        }
        out
    }
}

/// A bucket as the three parallel sequences the indexing API expects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnedCollection {
    pub documents: Vec<String>,
    pub ids: Vec<String>,
    pub metadatas: Vec<FileMetadata>,
}
