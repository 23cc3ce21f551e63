//! Where instances are stored once built.

use std::{
    collections::HashMap,
    io::Write,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex, PoisonError,
    },
};

use fontmill_types::Tag;
use tempfile::NamedTempFile;

use crate::Error;

/// The name of the directory [`DirectoryCache::beside`] creates.
pub const INSTANCE_DIR: &str = "_instances";

/// Identifies an instance: the source font and the design coordinates of
/// every axis that is not at its default.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheKey {
    source: PathBuf,
    values: Vec<(Tag, f64)>,
}

impl CacheKey {
    /// Create a key; `values` are sorted by tag.
    pub fn new(source: impl Into<PathBuf>, values: impl IntoIterator<Item = (Tag, f64)>) -> Self {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by_key(|(tag, _)| *tag);
        CacheKey {
            source: source.into(),
            values,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn values(&self) -> &[(Tag, f64)] {
        &self.values
    }

    /// `true` if every axis is at its default.
    pub fn is_default(&self) -> bool {
        self.values.is_empty()
    }

    fn parts(&self) -> impl Iterator<Item = String> + '_ {
        self.values
            .iter()
            .map(|(tag, value)| format!("{}{value}", tag.to_string().trim_end()))
    }

    /// The style name of the instance, such as `wdth75 wght650`.
    pub fn suffix(&self) -> String {
        self.parts().collect::<Vec<_>>().join(" ")
    }

    /// The file name of the instance, such as `Font-wdth75-wght650.ttf`.
    pub fn file_name(&self) -> String {
        let stem = self
            .source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut name = stem;
        for part in self.parts() {
            name.push('-');
            name.push_str(&part);
        }
        name.push_str(".ttf");
        name
    }
}

/// Storage for built instances.
///
/// Implementations must make a written instance visible all at once, so
/// that a concurrent reader never sees a partial file.
pub trait CacheStore: Send + Sync {
    /// The path an instance is (or would be) stored at.
    fn path_for(&self, key: &CacheKey) -> PathBuf;

    fn exists(&self, key: &CacheKey) -> bool;

    fn read(&self, key: &CacheKey) -> Result<Vec<u8>, Error>;

    /// Store an instance, returning its path.
    fn write(&self, key: &CacheKey, data: &[u8]) -> Result<PathBuf, Error>;
}

/// Instances stored as files in a directory.
#[derive(Clone, Debug)]
pub struct DirectoryCache {
    dir: PathBuf,
}

impl DirectoryCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectoryCache { dir: dir.into() }
    }

    /// A cache in the `_instances` directory next to `source`.
    pub fn beside(source: &Path) -> Self {
        let parent = source.parent().unwrap_or_else(|| Path::new(""));
        Self::new(parent.join(INSTANCE_DIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl CacheStore for DirectoryCache {
    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    fn exists(&self, key: &CacheKey) -> bool {
        self.path_for(key).is_file()
    }

    fn read(&self, key: &CacheKey) -> Result<Vec<u8>, Error> {
        let path = self.path_for(key);
        std::fs::read(&path).map_err(|e| Error::io(path, e))
    }

    fn write(&self, key: &CacheKey, data: &[u8]) -> Result<PathBuf, Error> {
        let path = self.path_for(key);
        std::fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        // written beside the target so that the rename cannot cross devices
        let mut file = NamedTempFile::new_in(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        file.write_all(data)
            .and_then(|_| file.as_file().sync_all())
            .map_err(|e| Error::io(file.path(), e))?;
        file.persist(&path).map_err(|e| Error::io(&path, e.error))?;
        log::debug!("wrote {} bytes to {}", data.len(), path.display());
        Ok(path)
    }
}

/// Instances kept in memory.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<PathBuf, Vec<u8>>>,
    writes: AtomicUsize,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times an instance has been stored.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCache {
    fn path_for(&self, key: &CacheKey) -> PathBuf {
        PathBuf::from(key.file_name())
    }

    fn exists(&self, key: &CacheKey) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&self.path_for(key))
    }

    fn read(&self, key: &CacheKey) -> Result<Vec<u8>, Error> {
        let path = self.path_for(key);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&path)
            .cloned()
            .ok_or_else(|| Error::io(path, std::io::ErrorKind::NotFound.into()))
    }

    fn write(&self, key: &CacheKey, data: &[u8]) -> Result<PathBuf, Error> {
        let path = self.path_for(key);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.clone(), data.to_vec());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(values: &[(&[u8; 4], f64)]) -> CacheKey {
        CacheKey::new(
            "fonts/MillSans-VF.ttf",
            values.iter().map(|(tag, value)| (Tag::new(tag), *value)),
        )
    }

    #[test]
    fn names_are_sorted_by_tag() {
        let key = key(&[(b"wght", 650.0), (b"wdth", 75.5)]);
        assert_eq!(key.suffix(), "wdth75.5 wght650");
        assert_eq!(key.file_name(), "MillSans-VF-wdth75.5-wght650.ttf");
    }

    #[test]
    fn default_location() {
        let key = key(&[]);
        assert!(key.is_default());
        assert_eq!(key.suffix(), "");
        assert_eq!(key.file_name(), "MillSans-VF.ttf");
    }

    #[test]
    fn instance_dir_beside_source() {
        let cache = DirectoryCache::beside(Path::new("fonts/MillSans-VF.ttf"));
        assert_eq!(
            cache.path_for(&key(&[(b"wght", 900.0)])),
            Path::new("fonts/_instances/MillSans-VF-wght900.ttf")
        );
    }

    #[test]
    fn directory_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        let cache = DirectoryCache::new(temp.path().join("nested").join("cache"));
        let key = key(&[(b"wght", 900.0)]);
        assert!(!cache.exists(&key));
        assert!(cache.read(&key).is_err());

        let path = cache.write(&key, b"first").unwrap();
        assert_eq!(path, cache.path_for(&key));
        assert!(cache.exists(&key));
        cache.write(&key, b"second").unwrap();
        assert_eq!(cache.read(&key).unwrap(), b"second");
        // only the instance is left, no temporary files
        let entries = std::fs::read_dir(cache.dir()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn memory_counts_writes() {
        let cache = MemoryCache::new();
        let key = key(&[(b"wght", 900.0)]);
        assert!(!cache.exists(&key));
        cache.write(&key, b"data").unwrap();
        cache.write(&key, b"data").unwrap();
        assert_eq!(cache.writes(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.read(&key).unwrap(), b"data");
    }
}
