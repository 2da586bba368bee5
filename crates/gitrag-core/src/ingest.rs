//! Ingestion pipeline: acquire → walk → partition.

use std::path::PathBuf;

use crate::classifier::{LexerGuesser, SyntectGuesser};
use crate::partition::{partition, Partition};
use crate::sampler::SampleConfig;
use crate::source::{GitSource, RepoSource, SourceError};
use crate::walker::{walk, Blacklists, WalkError};

/// Turns a repository locator into a language [`Partition`].
///
/// Holds the source and the guesser explicitly, so one ingestor (and one loaded syntax
/// set) can serve many calls.
pub struct Ingestor<S = GitSource, G = SyntectGuesser> {
    source: S,
    guesser: G,
    sampling: SampleConfig,
}

impl Ingestor {
    /// Git clones plus syntect classification, default sampling.
    pub fn git() -> Self {
        Self::new(GitSource::new(), SyntectGuesser::new())
    }
}

impl<S: RepoSource, G: LexerGuesser> Ingestor<S, G> {
    pub fn new(source: S, guesser: G) -> Self {
        Self {
            source,
            guesser,
            sampling: SampleConfig::default(),
        }
    }

    pub fn with_sampling(mut self, sampling: SampleConfig) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn sampling(&self) -> &SampleConfig {
        &self.sampling
    }

    /// Clone `locator`, walk the working copy, and partition the files.
    ///
    /// The working copy is removed before this returns, on success and on error alike.
    /// No partial partition is ever returned.
    pub fn ingest(&self, locator: &str, blacklists: &Blacklists) -> Result<Partition, IngestError> {
        let copy = self
            .source
            .acquire(locator)
            .map_err(|source| IngestError::SourceUnavailable {
                locator: locator.to_string(),
                source,
            })?;
        tracing::info!("Repository {} acquired", locator);

        let records = walk(copy.path(), blacklists, &self.guesser, &self.sampling).map_err(|e| {
            let path = e.path().strip_prefix(copy.path()).unwrap_or(e.path()).to_path_buf();
            IngestError::FileProcessingFailure { path, source: e }
        })?;
        drop(copy);

        let partition = partition(records);
        tracing::info!(
            "Ingested {} file(s) from {} into {} collection(s)",
            partition.len(),
            locator,
            partition.languages().count()
        );
        Ok(partition)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("repository {locator} unavailable: {source}")]
    SourceUnavailable {
        locator: String,
        #[source]
        source: SourceError,
    },
    #[error("failed to process {}: {source}", path.display())]
    FileProcessingFailure {
        /// Relative to the repository root.
        path: PathBuf,
        #[source]
        source: WalkError,
    },
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;

    use super::*;
    use crate::classifier::{GuessError, LexerAliases};
    use crate::language::{Language, LanguageTag};
    use crate::source::WorkingCopy;

    /// Hands out a fresh temp tree with fixed files and remembers where it was.
    #[derive(Default)]
    struct FixtureSource {
        files: Vec<(&'static str, &'static str)>,
        /// `(link, target)` pairs; the target need not exist.
        symlinks: Vec<(&'static str, &'static str)>,
        last_path: RefCell<Option<PathBuf>>,
    }

    impl RepoSource for FixtureSource {
        fn acquire(&self, _locator: &str) -> Result<WorkingCopy, SourceError> {
            let dir = tempfile::tempdir().map_err(SourceError::TempDir)?;
            for (rel, contents) in &self.files {
                let path = dir.path().join(rel);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, contents).unwrap();
            }
            #[cfg(unix)]
            for (link, target) in &self.symlinks {
                let link = dir.path().join(link);
                fs::create_dir_all(link.parent().unwrap()).unwrap();
                std::os::unix::fs::symlink(dir.path().join(target), link).unwrap();
            }
            *self.last_path.borrow_mut() = Some(dir.path().to_path_buf());
            Ok(WorkingCopy::new(dir))
        }
    }

    struct Unavailable;

    impl RepoSource for Unavailable {
        fn acquire(&self, locator: &str) -> Result<WorkingCopy, SourceError> {
            Err(SourceError::Clone {
                locator: locator.to_string(),
                source: git2::Error::from_str("repository not found"),
            })
        }
    }

    struct PyOnly;

    impl LexerGuesser for PyOnly {
        fn guess(&self, filename: &str, _: &str) -> Result<Option<LexerAliases>, GuessError> {
            if filename == "broken.py" {
                return Err(GuessError("lexer crashed".into()));
            }
            Ok(filename.ends_with(".py").then(|| vec!["python".to_string()]))
        }
    }

    #[test]
    fn ingest_partitions_and_cleans_up() {
        let source = FixtureSource {
            files: vec![
                ("src/main.py", "print(1)\n"),
                ("src/util.py", "x = 1\n"),
                ("data.bin", "\x00\x01"),
                (".git/HEAD", "ref: refs/heads/main\n"),
            ],
            ..Default::default()
        };
        let ingestor = Ingestor::new(source, PyOnly);
        let bl = Blacklists::new([".git"], Vec::<String>::new());
        let p = ingestor.ingest("fixture", &bl).unwrap();

        let py = p.collection(LanguageTag::Known(Language::Python)).unwrap();
        assert_eq!(py.ids().collect::<Vec<_>>(), ["src/main.py", "src/util.py"]);
        let unknown = p.collection(LanguageTag::Unknown).unwrap();
        assert_eq!(unknown.ids().collect::<Vec<_>>(), ["data.bin"]);
        assert_eq!(p.len(), 3);

        let checkout = ingestor.source.last_path.borrow().clone().unwrap();
        assert!(!checkout.exists());
    }

    #[test]
    fn unavailable_source_is_reported() {
        let ingestor = Ingestor::new(Unavailable, PyOnly);
        let err = ingestor.ingest("nobody/nothing", &Blacklists::default()).unwrap_err();
        match err {
            IngestError::SourceUnavailable { locator, .. } => assert_eq!(locator, "nobody/nothing"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn file_failure_aborts_and_cleans_up() {
        let source = FixtureSource {
            files: vec![("ok.py", "pass\n"), ("pkg/broken.py", "pass\n")],
            ..Default::default()
        };
        let ingestor = Ingestor::new(source, PyOnly);
        let err = ingestor.ingest("fixture", &Blacklists::default()).unwrap_err();
        match err {
            IngestError::FileProcessingFailure { path, .. } => {
                assert_eq!(path, PathBuf::from("pkg").join("broken.py"))
            }
            other => panic!("unexpected error: {other}"),
        }
        let checkout = ingestor.source.last_path.borrow().clone().unwrap();
        assert!(!checkout.exists());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_reports_relative_path() {
        let source = FixtureSource {
            files: vec![("ok.py", "pass\n")],
            symlinks: vec![("pkg/link.py", "pkg/gone.py")],
            ..Default::default()
        };
        let ingestor = Ingestor::new(source, PyOnly);
        let err = ingestor.ingest("fixture", &Blacklists::default()).unwrap_err();
        match err {
            IngestError::FileProcessingFailure { path, source } => {
                assert_eq!(path, PathBuf::from("pkg").join("link.py"));
                assert!(matches!(source, WalkError::Read(..)));
            }
            other => panic!("unexpected error: {other}"),
        }
        let checkout = ingestor.source.last_path.borrow().clone().unwrap();
        assert!(!checkout.exists());
    }
}
