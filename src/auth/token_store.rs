use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::auth::token::Token;

/// Keeps one session token as JSON on disk.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when nothing has been stored yet.
    pub async fn load(&self) -> Result<Option<Token>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("no stored session token at '{}'", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e).with_context(|| format!("reading '{}'", self.path.display())),
        };

        if content.trim().is_empty() {
            warn!("stored session token file '{}' is empty", self.path.display());
            return Ok(None);
        }

        let token = serde_json::from_str(&content)
            .with_context(|| format!("parsing stored token '{}'", self.path.display()))?;
        Ok(Some(token))
    }

    /// Writes atomically (tmp file, then rename) with owner-only permissions.
    pub async fn save(&self, token: &Token) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating '{}'", parent.display()))?;
        }

        let tmp = self.path.with_extension("tmp");
        let content = serde_json::to_vec_pretty(token)?;
        write_private(&tmp, &content)
            .await
            .with_context(|| format!("writing '{}'", tmp.display()))?;

        if let Err(e) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e).with_context(|| format!("renaming '{}'", tmp.display()));
        }
        info!(expires_at = %token.expires_at(), "session token stored at '{}'", self.path.display());
        Ok(())
    }

    pub async fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing '{}'", self.path.display())),
        }
    }
}

/// Creates `path` owner-only (0600 on unix) before any byte is written.
/// A leftover file from an interrupted save is replaced.
async fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    match fs::remove_file(path).await {
        Err(e) if e.kind() != ErrorKind::NotFound => return Err(e),
        _ => {}
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(content).await?;
    file.sync_all().await
}
