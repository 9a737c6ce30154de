//! Per-site record of already downloaded ids.
//!
//! The backing file is plain UTF-8 text with one id per line. It is read once when a job starts
//! and only ever appended to afterwards, one line per successful download.
use std::path::{Path, PathBuf};

use ahash::AHashSet;
use log::debug;
use nnd_common::Site;
use tokio::{
    fs::{self, File, OpenOptions},
    io::AsyncWriteExt,
};

use crate::error::DownloaderError;

#[derive(Debug)]
pub struct SeenIdStore {
    path: PathBuf,
    ids: AHashSet<String>,
    file: Option<File>,
    /// The file on disk does not end with a line break.
    unterminated: bool,
}

impl SeenIdStore {
    /// Loads the store of `site` from `<db_dir>/<site>.db`.
    pub async fn for_site(db_dir: &Path, site: Site) -> Result<Self, DownloaderError> {
        Self::load(db_dir.join(site.db_file_name())).await
    }

    /// Loads every id in `path`. A missing file is an empty store.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, DownloaderError> {
        let path = path.into();

        let (ids, unterminated) = match fs::read_to_string(&path).await {
            Ok(content) => (
                content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect(),
                !content.is_empty() && !content.ends_with('\n'),
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (AHashSet::new(), false),
            Err(source) => {
                return Err(DownloaderError::SeenStoreError {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        debug!("Loaded {} ids from {}", ids.len(), path.display());

        Ok(Self {
            path,
            ids,
            file: None,
            unterminated,
        })
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Adds `id` and appends it to the file right away.
    ///
    /// Ids already present are not written twice.
    pub async fn record(&mut self, id: &str) -> Result<(), DownloaderError> {
        if self.ids.contains(id) {
            return Ok(());
        }

        let path = self.path.display().to_string();
        let io_err = |source| DownloaderError::SeenStoreError {
            path: path.clone(),
            source,
        };

        let file = match self.file.take() {
            Some(file) => file,
            None => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent).await.map_err(io_err)?;
                }
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)
                    .await
                    .map_err(io_err)?
            }
        };
        let file = self.file.insert(file);

        let line = if self.unterminated {
            format!("\n{id}\n")
        } else {
            format!("{id}\n")
        };

        file.write_all(line.as_bytes()).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;
        self.unterminated = false;

        self.ids.insert(id.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod test {
    use nnd_common::Site;

    use super::SeenIdStore;

    #[tokio::test]
    async fn appends_one_line_per_id() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = SeenIdStore::for_site(&dir.path().join("db"), Site::E621)
            .await
            .unwrap();
        assert!(store.is_empty());

        store.record("10").await.unwrap();
        store.record("20").await.unwrap();
        store.record("10").await.unwrap();
        assert!(store.contains("20"));

        let path = dir.path().join("db").join("e621.db");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "10\n20\n");

        let reloaded = SeenIdStore::load(&path).await.unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("10"));
    }

    #[tokio::test]
    async fn hand_edited_file_without_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("e621.db");
        std::fs::write(&path, "1\n2").unwrap();

        let mut store = SeenIdStore::load(&path).await.unwrap();
        store.record("3").await.unwrap();
        store.record("4").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1\n2\n3\n4\n");

        let reloaded = SeenIdStore::load(&path).await.unwrap();
        assert_eq!(reloaded.len(), 4);
        assert!(reloaded.contains("2"));
        assert!(reloaded.contains("3"));
    }

    #[tokio::test]
    async fn ignores_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rule34.db");
        std::fs::write(&path, "1\n\n  2 \n").unwrap();

        let store = SeenIdStore::load(&path).await.unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.contains("2"));
    }
}
