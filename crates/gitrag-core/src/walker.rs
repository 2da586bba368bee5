//! Walks a checked-out repository and turns each accepted file into a [`FileRecord`].
//!
//! Within a directory its files come first, then its subdirectories, each sorted by
//! name, so a walk over an unchanged tree always yields the same order.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::classifier::{classify, GuessError, LexerGuesser};
use crate::partition::FileRecord;
use crate::sampler::SampleConfig;

/// Directory names and file extensions to leave out of a walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklists {
    dirs: HashSet<String>,
    extensions: HashSet<String>,
}

impl Blacklists {
    /// Directory names match exactly. Extensions are normalised to lowercase with a
    /// leading dot, so `PNG`, `.png` and `.PNG` are the same entry.
    pub fn new<D, E>(dirs: D, extensions: E) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
            extensions: extensions
                .into_iter()
                .filter_map(|e| normalize_extension(e.as_ref()))
                .collect(),
        }
    }

    /// Only consulted for direct children of the walk root.
    pub fn is_dir_blacklisted(&self, name: &str) -> bool {
        self.dirs.contains(name)
    }

    pub fn is_extension_blacklisted(&self, extension: &str) -> bool {
        !extension.is_empty() && self.extensions.contains(&extension.to_lowercase())
    }
}

fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim();
    if ext.is_empty() {
        return None;
    }
    let ext = ext.to_lowercase();
    Some(if ext.starts_with('.') { ext } else { format!(".{ext}") })
}

/// Walk `root`, skipping blacklisted top-level directories and blacklisted extensions,
/// and classify every remaining file.
///
/// Fails fast: the first file that cannot be read or classified aborts the walk.
pub fn walk<G: LexerGuesser + ?Sized>(
    root: &Path,
    blacklists: &Blacklists,
    guesser: &G,
    sampling: &SampleConfig,
) -> Result<Vec<FileRecord>, WalkError> {
    if !root.is_dir() {
        return Err(WalkError::NotADirectory(root.to_path_buf()));
    }
    let mut records = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by(files_then_dirs)
        .into_iter()
        .filter_entry(|e| !is_blacklisted_top_level_dir(e, blacklists));

    for entry in walker {
        let entry = entry.map_err(|e| WalkError::Walk {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf()),
            message: e.to_string(),
        })?;
        let path = entry.path();
        if entry.file_type().is_dir() || (entry.path_is_symlink() && path.is_dir()) {
            continue;
        }

        let extension = file_extension(path);
        if blacklists.is_extension_blacklisted(&extension) {
            tracing::debug!(path = %path.display(), %extension, "skipping blacklisted extension");
            continue;
        }

        records.push(read_record(root, path, extension, guesser, sampling)?);
    }
    tracing::debug!(root = %root.display(), files = records.len(), "walk complete");
    Ok(records)
}

fn read_record<G: LexerGuesser + ?Sized>(
    root: &Path,
    path: &Path,
    extension: String,
    guesser: &G,
    sampling: &SampleConfig,
) -> Result<FileRecord, WalkError> {
    let relative_path = relative_posix_path(root, path)?;
    let raw = std::fs::read(path).map_err(|e| WalkError::Read(path.to_path_buf(), e))?;
    let content_hash = format!("{:x}", md5::compute(&raw));
    let document = String::from_utf8_lossy(&raw).into_owned();
    drop(raw);

    let filename = relative_path
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();
    let language = classify(guesser, &filename, sampling.sample(&document))
        .map_err(|e| WalkError::Classify(path.to_path_buf(), e))?;
    tracing::debug!(path = %path.display(), %language, "classified");

    Ok(FileRecord {
        relative_path,
        filename,
        document,
        extension,
        content_hash,
        language,
    })
}

fn files_then_dirs(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn is_blacklisted_top_level_dir(entry: &DirEntry, blacklists: &Blacklists) -> bool {
    entry.depth() == 1
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| blacklists.is_dir_blacklisted(name))
            .unwrap_or(false)
}

/// Lowercased extension with leading dot. Dotfiles like `.gitignore` have none.
fn file_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Ids must stay unique, so a name that is not valid UTF-8 is an error rather than
/// being decoded lossily.
fn relative_posix_path(root: &Path, path: &Path) -> Result<String, WalkError> {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()
        .map(|parts| parts.join("/"))
        .ok_or_else(|| WalkError::NonUtf8Path(path.to_path_buf()))
}

#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("walk error at {path}: {message}")]
    Walk { path: PathBuf, message: String },
    #[error("read error for {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("classification failed for {0}: {1}")]
    Classify(PathBuf, GuessError),
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
}

impl WalkError {
    /// The file or directory that caused the failure.
    pub fn path(&self) -> &Path {
        match self {
            WalkError::NotADirectory(p)
            | WalkError::Read(p, _)
            | WalkError::Classify(p, _)
            | WalkError::NonUtf8Path(p) => p,
            WalkError::Walk { path, .. } => path,
        }
    }
}
