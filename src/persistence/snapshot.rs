//! Snapshot: save/load full database state to/from disk.
//!
//! File layout (little-endian):
//! `[magic: 8][version: u32][payload length: u64][crc32: u32][payload: bincode(DatabaseSnapshot)]`
//!
//! Saves go to a sibling temporary file that is fsynced and renamed over the
//! destination, so readers see either the old snapshot or the new one.

use crate::error::{Result, VectorDbError};
use crate::persistence::serialization::{self, DatabaseSnapshot};
use crate::persistence::SCHEMA_VERSION;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const MAGIC: &[u8; 8] = b"VECDBSNP";
const HEADER_SIZE: usize = 8 + 4 + 8 + 4;

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn encode_header(payload: &[u8]) -> [u8; HEADER_SIZE] {
    let mut buf = [0u8; HEADER_SIZE];
    buf[0..8].copy_from_slice(MAGIC);
    buf[8..12].copy_from_slice(&SCHEMA_VERSION.to_le_bytes());
    buf[12..20].copy_from_slice(&(payload.len() as u64).to_le_bytes());
    buf[20..24].copy_from_slice(&crc32fast::hash(payload).to_le_bytes());
    buf
}

/// Fill a sibling temporary file with `fill`, fsync it and rename it over
/// `path`. The temporary file is removed if any step fails.
fn replace_atomically(
    path: &Path,
    fill: impl FnOnce(&mut File) -> std::io::Result<()>,
) -> std::io::Result<()> {
    let tmp = temp_path(path);
    let result = File::create(&tmp)
        .and_then(|mut file| {
            fill(&mut file)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// Write `snapshot` to `path`, replacing any existing file. Returns the
/// number of bytes written.
pub fn write_snapshot(path: impl AsRef<Path>, snapshot: &DatabaseSnapshot) -> Result<u64> {
    let path = path.as_ref();
    let payload = serialization::to_bincode(snapshot)?;
    let header = encode_header(&payload);

    replace_atomically(path, |file| {
        file.write_all(&header)?;
        file.write_all(&payload)
    })?;

    let written = (HEADER_SIZE + payload.len()) as u64;
    debug!(path = %path.display(), bytes = written, "snapshot written");
    Ok(written)
}

/// Decode a complete snapshot file image.
fn decode(bytes: &[u8]) -> Result<DatabaseSnapshot> {
    if bytes.len() < HEADER_SIZE {
        return Err(VectorDbError::corrupt(format!(
            "file too small for header ({} bytes)",
            bytes.len()
        )));
    }
    if &bytes[0..8] != MAGIC {
        return Err(VectorDbError::corrupt("not a vecdb snapshot (bad magic)"));
    }

    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[8..12]);
    let version = u32::from_le_bytes(word);
    if version != SCHEMA_VERSION {
        return Err(VectorDbError::PersistenceVersionMismatch {
            what: "schema version",
            expected: SCHEMA_VERSION as u64,
            found: version as u64,
        });
    }

    let mut long = [0u8; 8];
    long.copy_from_slice(&bytes[12..20]);
    let len = u64::from_le_bytes(long);
    word.copy_from_slice(&bytes[20..24]);
    let expected_crc = u32::from_le_bytes(word);

    let payload = &bytes[HEADER_SIZE..];
    if payload.len() as u64 != len {
        return Err(VectorDbError::corrupt(format!(
            "payload is {} bytes, header says {}",
            payload.len(),
            len
        )));
    }
    if crc32fast::hash(payload) != expected_crc {
        return Err(VectorDbError::corrupt("payload checksum mismatch"));
    }

    serialization::from_bincode(payload)
        .map_err(|e| VectorDbError::corrupt(format!("undecodable payload: {}", e)))
}

/// Read and decode the snapshot at `path`.
pub fn read_snapshot(path: impl AsRef<Path>) -> Result<DatabaseSnapshot> {
    let path = path.as_ref();
    let file = File::open(path)?;
    if (file.metadata()?.len() as usize) < HEADER_SIZE {
        return decode(&fs::read(path)?);
    }

    // Memory-map when possible; fall back to a plain read.
    let snapshot = match unsafe { memmap2::Mmap::map(&file) } {
        Ok(mmap) => decode(&mmap)?,
        Err(_) => decode(&fs::read(path)?)?,
    };
    debug!(path = %path.display(), records = snapshot.store.records.len(), "snapshot read");
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollectionConfig;
    use crate::index::IndexSnapshot;
    use crate::metadata::Metadata;
    use crate::storage::VectorStore;
    use crate::vector::Vector;
    use tempfile::TempDir;

    fn sample() -> DatabaseSnapshot {
        let mut store = VectorStore::new(3);
        store
            .add("v1", Vector::new(vec![1.0, 2.0, 3.0]), Metadata::new())
            .unwrap();
        store
            .add("v2", Vector::new(vec![4.0, 5.0, 6.0]), Metadata::new().with("k", true))
            .unwrap();
        DatabaseSnapshot {
            config: CollectionConfig::new(3).brute_force(),
            store: store.to_snapshot(),
            index: IndexSnapshot::BruteForce,
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.snap");

        let written = write_snapshot(&path, &sample()).unwrap();
        assert_eq!(written, fs::metadata(&path).unwrap().len());
        assert!(!temp_path(&path).exists());

        let loaded = read_snapshot(&path).unwrap();
        assert_eq!(loaded.config, CollectionConfig::new(3).brute_force());
        assert_eq!(loaded.store.records.len(), 2);
        assert_eq!(loaded.store.records[0].id, "v1");
        assert_eq!(loaded.store.records[1].vector, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_overwrite_replaces_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.snap");
        write_snapshot(&path, &sample()).unwrap();

        let mut smaller = sample();
        smaller.store.records.truncate(1);
        write_snapshot(&path, &smaller).unwrap();
        assert_eq!(read_snapshot(&path).unwrap().store.records.len(), 1);
    }

    #[test]
    fn test_failed_write_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.snap");
        write_snapshot(&path, &sample()).unwrap();
        let before = fs::read(&path).unwrap();

        let result = replace_atomically(&path, |file| {
            file.write_all(b"partial")?;
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        });
        assert!(result.is_err());
        assert!(!temp_path(&path).exists());
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("occupied");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("child"), b"x").unwrap();

        assert!(matches!(write_snapshot(&path, &sample()), Err(VectorDbError::IoError(_))));
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_load_nonexistent() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_snapshot(dir.path().join("missing.snap")),
            Err(VectorDbError::IoError(_))
        ));
    }

    #[test]
    fn test_rejects_bad_magic_and_truncation() {
        let payload = serialization::to_bincode(&sample()).unwrap();
        let mut bytes = encode_header(&payload).to_vec();
        bytes.extend_from_slice(&payload);

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        assert!(matches!(decode(&bad_magic), Err(VectorDbError::CorruptPersistedState(_))));

        let truncated = &bytes[..bytes.len() - 3];
        assert!(matches!(decode(truncated), Err(VectorDbError::CorruptPersistedState(_))));

        assert!(matches!(decode(&bytes[..10]), Err(VectorDbError::CorruptPersistedState(_))));
    }

    #[test]
    fn test_rejects_flipped_payload_byte() {
        let payload = serialization::to_bincode(&sample()).unwrap();
        let mut bytes = encode_header(&payload).to_vec();
        bytes.extend_from_slice(&payload);
        let last = bytes.len() - 1;
        bytes[last] ^= 0x55;
        assert!(matches!(decode(&bytes), Err(VectorDbError::CorruptPersistedState(_))));
    }

    #[test]
    fn test_rejects_future_version() {
        let payload = serialization::to_bincode(&sample()).unwrap();
        let mut bytes = encode_header(&payload).to_vec();
        bytes[8..12].copy_from_slice(&7u32.to_le_bytes());
        bytes.extend_from_slice(&payload);
        assert!(matches!(
            decode(&bytes),
            Err(VectorDbError::PersistenceVersionMismatch { found: 7, .. })
        ));
    }
}
