//! Acquiring a temporary working copy of a repository.

use std::path::Path;

use tempfile::TempDir;

/// A checked-out repository in a private temp directory. Dropping it deletes the checkout.
#[derive(Debug)]
pub struct WorkingCopy {
    dir: TempDir,
}

impl WorkingCopy {
    pub fn new(dir: TempDir) -> Self {
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the checkout now, reporting any I/O error instead of ignoring it.
    pub fn close(self) -> std::io::Result<()> {
        self.dir.close()
    }
}

/// Produces working copies from a locator (URL, `owner/name`, or local path).
pub trait RepoSource {
    fn acquire(&self, locator: &str) -> Result<WorkingCopy, SourceError>;
}

/// Clones with libgit2. Remote clones are shallow and single-branch.
#[derive(Debug, Clone, Default)]
pub struct GitSource {
    /// Personal access token for private repositories.
    token: Option<String>,
}

impl GitSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn fetch_options(&self, shallow: bool) -> git2::FetchOptions<'_> {
        let mut fetch = git2::FetchOptions::new();
        if shallow {
            fetch.depth(1);
        }
        if let Some(token) = &self.token {
            let mut callbacks = git2::RemoteCallbacks::new();
            callbacks.credentials(move |_url, _user, _allowed| {
                git2::Cred::userpass_plaintext("x-access-token", token)
            });
            fetch.remote_callbacks(callbacks);
        }
        fetch
    }
}

impl RepoSource for GitSource {
    fn acquire(&self, locator: &str) -> Result<WorkingCopy, SourceError> {
        let url = resolve_locator(locator);
        let local = Path::new(locator).exists();
        let dir = tempfile::Builder::new()
            .prefix("gitrag-")
            .tempdir()
            .map_err(SourceError::TempDir)?;

        tracing::info!("Cloning {} into {}", url, dir.path().display());
        git2::build::RepoBuilder::new()
            .fetch_options(self.fetch_options(!local))
            .clone(&url, dir.path())
            .map_err(|source| SourceError::Clone {
                locator: locator.to_string(),
                source,
            })?;
        tracing::info!("Clone complete: {}", dir.path().display());
        Ok(WorkingCopy::new(dir))
    }
}

/// `owner/name` becomes a GitHub HTTPS URL; anything else is used as-is.
pub fn resolve_locator(locator: &str) -> String {
    let is_shorthand = !locator.contains("://")
        && !locator.starts_with('.')
        && !locator.starts_with('/')
        && !locator.contains('@')
        && !Path::new(locator).exists()
        && locator.split('/').count() == 2
        && locator.split('/').all(|part| !part.is_empty());
    if is_shorthand {
        format!("https://github.com/{locator}.git")
    } else {
        locator.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to create working directory: {0}")]
    TempDir(std::io::Error),
    #[error("failed to clone {locator}: {source}")]
    Clone {
        locator: String,
        #[source]
        source: git2::Error,
    },
}
