use crate::archive::ArchiveListing;
use std::fs;
use std::path::{Component, Path, PathBuf};
use sylladex_core::{CandidateSource, ConfigError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("namespace not found: {0}")]
    Missing(PathBuf),
    #[error("unsupported namespace: {0}")]
    Unsupported(PathBuf),
    #[error("invalid archive entry: {0}")]
    InvalidEntry(String),
}

impl From<ModError> for ConfigError {
    fn from(err: ModError) -> Self {
        ConfigError::Namespace(err.to_string())
    }
}

/// Lists the file names directly inside one directory.
#[derive(Debug, Clone)]
pub struct DirectoryListing {
    root: PathBuf,
}

impl DirectoryListing {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn list(&self) -> Result<Vec<String>, ModError> {
        if !self.root.exists() {
            return Err(ModError::Missing(self.root.clone()));
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::warn!(name = ?raw, "skipping non-utf8 namespace entry"),
            }
        }
        names.sort();
        Ok(names)
    }
}

impl CandidateSource for DirectoryListing {
    fn entries(&self) -> Result<Vec<String>, ConfigError> {
        Ok(self.list()?)
    }
}

/// A directory or archive, whichever `path` turns out to be.
#[derive(Debug, Clone)]
pub enum NamespaceListing {
    Directory(DirectoryListing),
    Archive(ArchiveListing),
}

impl NamespaceListing {
    pub fn locate(path: impl Into<PathBuf>) -> Result<Self, ModError> {
        let path = path.into();
        if path.is_dir() {
            return Ok(Self::Directory(DirectoryListing::new(path)));
        }
        if !path.exists() {
            return Err(ModError::Missing(path));
        }
        if ArchiveListing::recognizes(&path) {
            return Ok(Self::Archive(ArchiveListing::new(path)));
        }
        Err(ModError::Unsupported(path))
    }

    pub fn list(&self) -> Result<Vec<String>, ModError> {
        match self {
            Self::Directory(listing) => listing.list(),
            Self::Archive(listing) => listing.list(),
        }
    }
}

impl CandidateSource for NamespaceListing {
    fn entries(&self) -> Result<Vec<String>, ConfigError> {
        Ok(self.list()?)
    }
}

pub(crate) fn is_safe_relative_path(path: &Path) -> bool {
    if path.is_absolute() {
        return false;
    }
    for component in path.components() {
        match component {
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
            Component::CurDir | Component::Normal(_) => {}
        }
    }
    true
}
