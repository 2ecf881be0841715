//! I/O managers for the storage backends a container root can live on

use crate::error::{GeoError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Storage backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Local file system
    FileSystem,
    /// Process memory, gone when the manager is dropped
    Memory,
}

impl StorageBackend {
    /// Parse storage backend from URL scheme
    pub fn from_url(url: &str) -> Result<Self> {
        if let Some(scheme_end) = url.find("://") {
            match &url[..scheme_end] {
                "file" => Ok(StorageBackend::FileSystem),
                "mem" => Ok(StorageBackend::Memory),
                scheme => Err(GeoError::Configuration(format!(
                    "Unknown storage scheme: {}",
                    scheme
                ))),
            }
        } else {
            Ok(StorageBackend::FileSystem)
        }
    }
}

/// Keyed byte storage with directories, addressed by '/'-separated relative paths
#[async_trait]
pub trait IOManager: Send + Sync {
    /// Read data from a path
    async fn read(&self, path: &str) -> Result<Bytes>;

    /// Write data to a path, creating parent directories
    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Check if a file or directory exists
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Check if a directory exists
    async fn is_dir(&self, path: &str) -> Result<bool>;

    /// Create a directory and its parents
    async fn create_dir(&self, path: &str) -> Result<()>;

    /// Delete a file
    async fn delete(&self, path: &str) -> Result<()>;

    /// Delete a directory with everything under it
    async fn delete_dir(&self, path: &str) -> Result<()>;

    /// Names of the immediate children of a directory
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Get the size of data at a path
    async fn size(&self, path: &str) -> Result<usize>;

    /// Location description used in logs and as the container file name
    fn location(&self) -> String;

    /// Get the backend type
    fn backend(&self) -> StorageBackend;

    /// Whether mutating calls are refused
    fn is_read_only(&self) -> bool {
        false
    }
}

/// File system I/O manager
pub struct FileSystemIOManager {
    base_path: PathBuf,
}

impl FileSystemIOManager {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        let rel = path.trim_matches('/');
        if rel.is_empty() {
            self.base_path.clone()
        } else {
            self.base_path.join(rel)
        }
    }
}

#[async_trait]
impl IOManager for FileSystemIOManager {
    async fn read(&self, path: &str) -> Result<Bytes> {
        let data = fs::read(self.full_path(path)).await?;
        Ok(Bytes::from(data))
    }

    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = fs::File::create(&full_path).await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(fs::try_exists(self.full_path(path)).await?)
    }

    async fn is_dir(&self, path: &str) -> Result<bool> {
        match fs::metadata(self.full_path(path)).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        fs::create_dir_all(self.full_path(path)).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        fs::remove_file(self.full_path(path)).await?;
        Ok(())
    }

    async fn delete_dir(&self, path: &str) -> Result<()> {
        fs::remove_dir_all(self.full_path(path)).await?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let full_path = self.full_path(prefix);
        let mut entries = Vec::new();

        if self.is_dir(prefix).await? {
            let mut read_dir = fs::read_dir(&full_path).await?;
            while let Some(entry) = read_dir.next_entry().await? {
                if let Some(name) = entry.file_name().to_str() {
                    entries.push(name.to_string());
                }
            }
        }

        entries.sort();
        Ok(entries)
    }

    async fn size(&self, path: &str) -> Result<usize> {
        let metadata = fs::metadata(self.full_path(path)).await?;
        Ok(metadata.len() as usize)
    }

    fn location(&self) -> String {
        self.base_path.display().to_string()
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::FileSystem
    }
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn parents_of(path: &str) -> Vec<String> {
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    (1..parts.len()).map(|n| parts[..n].join("/")).collect()
}

fn not_found(path: &str) -> GeoError {
    GeoError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("{} not found", path),
    ))
}

/// In-memory I/O manager, handy for tests and scratch containers
pub struct MemoryIOManager {
    name: String,
    files: RwLock<BTreeMap<String, Bytes>>,
    dirs: RwLock<BTreeSet<String>>,
}

impl MemoryIOManager {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: RwLock::new(BTreeMap::new()),
            dirs: RwLock::new(BTreeSet::new()),
        }
    }

    fn child_name<'a>(prefix: &str, key: &'a str) -> Option<&'a str> {
        let rest = if prefix.is_empty() {
            key
        } else {
            key.strip_prefix(prefix)?.strip_prefix('/')?
        };
        if rest.is_empty() {
            return None;
        }
        Some(rest.split('/').next().unwrap_or(rest))
    }
}

#[async_trait]
impl IOManager for MemoryIOManager {
    async fn read(&self, path: &str) -> Result<Bytes> {
        let key = normalize(path);
        self.files
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| not_found(&key))
    }

    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let key = normalize(path);
        self.dirs.write().extend(parents_of(&key));
        self.files.write().insert(key, Bytes::copy_from_slice(data));
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let key = normalize(path);
        Ok(key.is_empty() || self.files.read().contains_key(&key) || self.dirs.read().contains(&key))
    }

    async fn is_dir(&self, path: &str) -> Result<bool> {
        let key = normalize(path);
        Ok(key.is_empty() || self.dirs.read().contains(&key))
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        let key = normalize(path);
        let mut dirs = self.dirs.write();
        dirs.extend(parents_of(&key));
        if !key.is_empty() {
            dirs.insert(key);
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let key = normalize(path);
        self.files
            .write()
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| not_found(&key))
    }

    async fn delete_dir(&self, path: &str) -> Result<()> {
        let key = normalize(path);
        let nested = format!("{}/", key);
        self.files
            .write()
            .retain(|k, _| !(key.is_empty() || k.starts_with(&nested)));
        self.dirs
            .write()
            .retain(|d| !(key.is_empty() || *d == key || d.starts_with(&nested)));
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = normalize(prefix);
        let mut names = BTreeSet::new();
        for key in self.files.read().keys() {
            if let Some(name) = Self::child_name(&prefix, key) {
                names.insert(name.to_string());
            }
        }
        for dir in self.dirs.read().iter() {
            if let Some(name) = Self::child_name(&prefix, dir) {
                names.insert(name.to_string());
            }
        }
        Ok(names.into_iter().collect())
    }

    async fn size(&self, path: &str) -> Result<usize> {
        Ok(self.read(path).await?.len())
    }

    fn location(&self) -> String {
        format!("mem://{}", self.name)
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

/// Wrapper that refuses every mutating call with `GeoError::ReadOnly`
pub struct ReadOnlyIOManager {
    inner: Box<dyn IOManager>,
}

impl ReadOnlyIOManager {
    pub fn new(inner: Box<dyn IOManager>) -> Self {
        Self { inner }
    }

    fn refuse(&self, path: &str) -> GeoError {
        GeoError::ReadOnly(format!("{}/{}", self.inner.location(), path))
    }
}

#[async_trait]
impl IOManager for ReadOnlyIOManager {
    async fn read(&self, path: &str) -> Result<Bytes> {
        self.inner.read(path).await
    }

    async fn write(&self, path: &str, _data: &[u8]) -> Result<()> {
        Err(self.refuse(path))
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        self.inner.exists(path).await
    }

    async fn is_dir(&self, path: &str) -> Result<bool> {
        self.inner.is_dir(path).await
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        Err(self.refuse(path))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        Err(self.refuse(path))
    }

    async fn delete_dir(&self, path: &str) -> Result<()> {
        Err(self.refuse(path))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner.list(prefix).await
    }

    async fn size(&self, path: &str) -> Result<usize> {
        self.inner.size(path).await
    }

    fn location(&self) -> String {
        self.inner.location()
    }

    fn backend(&self) -> StorageBackend {
        self.inner.backend()
    }

    fn is_read_only(&self) -> bool {
        true
    }
}

/// Chunk paths read and written through a [`TallyIOManager`]
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct ChunkTally {
    reads: std::sync::Arc<parking_lot::Mutex<Vec<String>>>,
    writes: std::sync::Arc<parking_lot::Mutex<Vec<String>>>,
}

#[cfg(test)]
impl ChunkTally {
    pub(crate) fn reads(&self) -> Vec<String> {
        self.reads.lock().clone()
    }

    pub(crate) fn writes(&self) -> Vec<String> {
        self.writes.lock().clone()
    }

    pub(crate) fn clear(&self) {
        self.reads.lock().clear();
        self.writes.lock().clear();
    }

    fn note(log: &parking_lot::Mutex<Vec<String>>, path: &str) {
        if path.ends_with(".chunk") {
            log.lock().push(normalize(path));
        }
    }
}

/// In-memory manager that records every chunk file it reads or writes
#[cfg(test)]
pub(crate) struct TallyIOManager {
    inner: MemoryIOManager,
    tally: ChunkTally,
}

#[cfg(test)]
impl TallyIOManager {
    pub(crate) fn new(name: &str) -> (Self, ChunkTally) {
        let tally = ChunkTally::default();
        let io = Self {
            inner: MemoryIOManager::new(name),
            tally: tally.clone(),
        };
        (io, tally)
    }
}

#[cfg(test)]
#[async_trait]
impl IOManager for TallyIOManager {
    async fn read(&self, path: &str) -> Result<Bytes> {
        ChunkTally::note(&self.tally.reads, path);
        self.inner.read(path).await
    }

    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        ChunkTally::note(&self.tally.writes, path);
        self.inner.write(path, data).await
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        self.inner.exists(path).await
    }

    async fn is_dir(&self, path: &str) -> Result<bool> {
        self.inner.is_dir(path).await
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        self.inner.create_dir(path).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.inner.delete(path).await
    }

    async fn delete_dir(&self, path: &str) -> Result<()> {
        self.inner.delete_dir(path).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner.list(prefix).await
    }

    async fn size(&self, path: &str) -> Result<usize> {
        self.inner.size(path).await
    }

    fn location(&self) -> String {
        self.inner.location()
    }

    fn backend(&self) -> StorageBackend {
        self.inner.backend()
    }
}

/// Parse URL and create appropriate I/O manager
pub fn create_io_manager(url: &str, read_only: bool) -> Result<Box<dyn IOManager>> {
    let manager: Box<dyn IOManager> = match StorageBackend::from_url(url)? {
        StorageBackend::FileSystem => {
            let path = url.strip_prefix("file://").unwrap_or(url);
            Box::new(FileSystemIOManager::new(path))
        }
        StorageBackend::Memory => {
            let name = url.strip_prefix("mem://").unwrap_or(url);
            Box::new(MemoryIOManager::new(name))
        }
    };

    if read_only {
        Ok(Box::new(ReadOnlyIOManager::new(manager)))
    } else {
        Ok(manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn exercise(io: &dyn IOManager) {
        io.write("wells/w1/group.json", b"{}").await.unwrap();
        io.create_dir("wells/w2").await.unwrap();

        assert!(io.exists("wells/w1/group.json").await.unwrap());
        assert!(io.is_dir("wells/w1").await.unwrap());
        assert!(!io.is_dir("wells/w1/group.json").await.unwrap());
        assert_eq!(io.list("wells").await.unwrap(), vec!["w1", "w2"]);
        assert_eq!(io.size("wells/w1/group.json").await.unwrap(), 2);

        io.delete_dir("wells/w1").await.unwrap();
        assert!(!io.exists("wells/w1/group.json").await.unwrap());
        assert_eq!(io.list("wells").await.unwrap(), vec!["w2"]);
    }

    #[tokio::test]
    async fn test_file_system_io() {
        let temp_dir = TempDir::new().unwrap();
        let io = FileSystemIOManager::new(temp_dir.path());
        exercise(&io).await;
    }

    #[tokio::test]
    async fn test_memory_io() {
        let io = MemoryIOManager::new("scratch");
        exercise(&io).await;
        assert!(io.read("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_read_only_refuses_writes() {
        let temp_dir = TempDir::new().unwrap();
        let url = temp_dir.path().to_str().unwrap().to_string();
        let io = create_io_manager(&url, true).unwrap();
        assert!(io.is_read_only());
        let err = io.write("a.bin", b"x").await.unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_backend_from_url() {
        assert_eq!(
            StorageBackend::from_url("file:///data/wells").unwrap(),
            StorageBackend::FileSystem
        );
        assert_eq!(
            StorageBackend::from_url("mem://scratch").unwrap(),
            StorageBackend::Memory
        );
        assert_eq!(
            StorageBackend::from_url("/plain/path").unwrap(),
            StorageBackend::FileSystem
        );
        assert!(StorageBackend::from_url("s3://bucket").is_err());
    }
}
