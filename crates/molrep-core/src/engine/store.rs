use super::error::EngineError;
use super::fingerprint::Fingerprint;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

const SIZE_MARKER: &str = "size.bin";
const FINGERPRINT_MARKER: &str = "fingerprint.bin";

/// One cache directory of bincode-encoded artifacts.
///
/// Item `i` lives in `{i}.bin`; `size.bin` holds the item count and
/// `fingerprint.bin` the hook fingerprint. The markers are written only
/// after every item, so their joint presence certifies a complete build.
/// Every write lands in a sibling temp file first and is renamed into
/// place, so readers never observe a truncated artifact.
///
/// Builds are single-writer per directory; that is the caller's contract.
/// Items are immutable once the markers exist, making concurrent reads
/// safe.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Opens the store, creating the directory if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Io` when the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| EngineError::Io {
            path: dir.to_string_lossy().to_string(),
            source: e,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn item_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{index}.bin"))
    }

    /// A complete cache carries both end-of-build markers.
    pub fn is_complete(&self) -> bool {
        self.dir.join(SIZE_MARKER).exists() && self.dir.join(FINGERPRINT_MARKER).exists()
    }

    pub fn write_item<T: Serialize>(&self, index: usize, value: &T) -> Result<(), EngineError> {
        self.write_encoded(&self.item_path(index), value)
    }

    pub fn read_item<T: DeserializeOwned>(&self, index: usize) -> Result<T, EngineError> {
        self.read_encoded(&self.item_path(index))
    }

    /// Publishes the end-of-build markers, size first: a crash between the
    /// two leaves the cache incomplete rather than lying about its hooks.
    pub fn write_markers(&self, len: usize, fingerprint: &Fingerprint) -> Result<(), EngineError> {
        self.write_encoded(&self.dir.join(SIZE_MARKER), &(len as u64))?;
        self.write_encoded(&self.dir.join(FINGERPRINT_MARKER), fingerprint)
    }

    pub fn read_markers(&self) -> Result<(usize, Fingerprint), EngineError> {
        let len: u64 = self.read_encoded(&self.dir.join(SIZE_MARKER))?;
        let fingerprint: Fingerprint = self.read_encoded(&self.dir.join(FINGERPRINT_MARKER))?;
        Ok((len as usize, fingerprint))
    }

    fn write_encoded<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), EngineError> {
        let bytes = bincode::serialize(value).map_err(|e| EngineError::Encode {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let tmp = path.with_extension("bin.tmp");
        fs::write(&tmp, &bytes).map_err(|e| EngineError::Io {
            path: tmp.to_string_lossy().to_string(),
            source: e,
        })?;
        fs::rename(&tmp, path).map_err(|e| EngineError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    fn read_encoded<T: DeserializeOwned>(&self, path: &Path) -> Result<T, EngineError> {
        let bytes = fs::read(path).map_err(|e| EngineError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        bincode::deserialize(&bytes).map_err(|e| EngineError::Decode {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn items_round_trip_by_index() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::open(dir.path().join("cache")).unwrap();
        store.write_item(0, &"first".to_string()).unwrap();
        store.write_item(1, &"second".to_string()).unwrap();
        assert_eq!(store.read_item::<String>(1).unwrap(), "second");
        assert_eq!(store.read_item::<String>(0).unwrap(), "first");
    }

    #[test]
    fn completeness_requires_both_markers() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        assert!(!store.is_complete());

        store.write_item(0, &1u32).unwrap();
        assert!(!store.is_complete());

        let fp = Fingerprint::from_tags(None, None);
        store.write_markers(1, &fp).unwrap();
        assert!(store.is_complete());
        assert_eq!(store.read_markers().unwrap(), (1, fp));
    }

    #[test]
    fn writes_leave_no_temp_files_behind() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        store.write_item(0, &vec![1u8, 2, 3]).unwrap();
        store
            .write_markers(1, &Fingerprint::from_tags(None, None))
            .unwrap();
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[test]
    fn missing_items_surface_as_io_errors() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.read_item::<u32>(7),
            Err(EngineError::Io { .. })
        ));
    }

    #[test]
    fn corrupt_items_surface_as_decode_errors() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        // A single byte cannot hold a String's length prefix.
        std::fs::write(store.item_path(0), [0xFF]).unwrap();
        assert!(matches!(
            store.read_item::<String>(0),
            Err(EngineError::Decode { .. })
        ));
    }
}
