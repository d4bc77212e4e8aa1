//! In-memory creator collection with JSON file persistence.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::Result;
use crate::models::Creator;

/// The single mutable home of the creator collection.
///
/// Readers take a cheap snapshot; writers replace the whole collection at
/// once. Concurrent writers race and the last `replace` wins.
#[derive(Debug)]
pub struct CreatorStore {
    creators: RwLock<Arc<Vec<Creator>>>,
    path: Option<PathBuf>,
}

impl CreatorStore {
    /// A store that lives only in memory.
    pub fn new(creators: Vec<Creator>) -> Self {
        Self {
            creators: RwLock::new(Arc::new(creators)),
            path: None,
        }
    }

    /// A store backed by `path`. A missing file yields an empty collection.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let creators = if tokio::fs::try_exists(&path).await? {
            Self::load(&path).await?
        } else {
            debug!(path = %path.display(), "No creator file yet, starting empty");
            Vec::new()
        };
        Ok(Self {
            creators: RwLock::new(Arc::new(creators)),
            path: Some(path),
        })
    }

    /// Read and normalize a collection file.
    pub async fn load(path: &Path) -> Result<Vec<Creator>> {
        let content = tokio::fs::read_to_string(path).await?;
        let mut creators: Vec<Creator> = serde_json::from_str(&content)?;
        creators.iter_mut().for_each(Creator::normalize);
        info!(path = %path.display(), count = creators.len(), "Loaded creators");
        Ok(creators)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn snapshot(&self) -> Arc<Vec<Creator>> {
        self.creators.read().clone()
    }

    pub fn replace(&self, creators: Vec<Creator>) {
        *self.creators.write() = Arc::new(creators);
    }

    /// Write the current snapshot to the backing file, if any.
    ///
    /// The file is written next to its destination and renamed into place.
    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let snapshot = self.snapshot();
        let json = serde_json::to_string_pretty(snapshot.as_slice())?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;

        debug!(path = %path.display(), count = snapshot.len(), "Saved creators");
        Ok(())
    }
}
