use super::codec;
use super::locks::StripedLocks;
use super::path::{self, RecordLocation};
use super::record::{Payload, Record};
use crate::config::KvsConfig;
use crate::error::KvsError;
use crate::request::types::PersonId;

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Mode given to every record file on unix.
pub const RECORD_FILE_MODE: u32 = 0o644;

/// File-backed record store, one file per person id.
///
/// The only component that touches the data directory. Updates and removes
/// of the same person id are serialized through `StripedLocks`; record files
/// are always replaced by rename, so a reader never sees a half-written file.
pub struct StorageEngine {
    root: PathBuf,
    extension: String,
    max_data_size: u64,
    locks: StripedLocks,
}

impl StorageEngine {
    pub fn new(config: &KvsConfig) -> Self {
        Self {
            root: config.data_dir.clone(),
            extension: config.file_extension.clone(),
            max_data_size: config.max_data_size,
            locks: StripedLocks::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn locate(&self, person_id: &PersonId) -> RecordLocation {
        path::resolve(person_id, &self.root, &self.extension)
    }

    pub fn fetch(&self, person_id: &PersonId) -> Result<Record, KvsError> {
        let location = self.locate(person_id);
        if !location.file.is_file() {
            return Err(KvsError::NotFound);
        }

        let record = self.read_record(&location.file)?.ok_or(KvsError::NotFound)?;
        tracing::debug!(
            "Fetched {} key(s) for {}",
            record.len(),
            person_id.as_str()
        );
        Ok(record)
    }

    /// Merges `payload` into the stored record and returns the new data size.
    ///
    /// Nothing is written (not even the shard directories) when the merged
    /// record would exceed `max_data_size`.
    pub fn update(&self, person_id: &PersonId, payload: Payload) -> Result<u64, KvsError> {
        if payload.is_empty() {
            return Err(KvsError::EmptyPayload);
        }

        let location = self.locate(person_id);
        let _guard = self.locks.lock(person_id.as_str());

        if let Some(blocker) = layout_conflict(&location) {
            return Err(KvsError::LayoutConflict(blocker));
        }

        let mut record = self.read_record(&location.file)?.unwrap_or_default();
        record.merge(payload);

        let data_size = record.data_size();
        if data_size > self.max_data_size {
            tracing::warn!(
                "Rejected update for {}: data-size {} exceeds {}",
                person_id.as_str(),
                data_size,
                self.max_data_size
            );
            return Err(KvsError::QuotaExceeded(data_size));
        }

        ensure_dir(&location.dir)?;
        write_atomic(&location, codec::encode(&record).as_bytes())?;

        tracing::debug!(
            "Stored {} key(s) for {} (data-size {})",
            record.len(),
            person_id.as_str(),
            data_size
        );
        Ok(data_size)
    }

    pub fn remove(&self, person_id: &PersonId) -> Result<(), KvsError> {
        let location = self.locate(person_id);
        let _guard = self.locks.lock(person_id.as_str());

        if !location.file.is_file() {
            return Err(KvsError::NotFound);
        }
        match fs::remove_file(&location.file) {
            Ok(()) => {
                sync_dir(&location.dir)?;
                tracing::debug!("Removed record for {}", person_id.as_str());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(KvsError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// `Ok(None)` when the file does not exist.
    fn read_record(&self, file: &Path) -> Result<Option<Record>, KvsError> {
        let bytes = match fs::read(file) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        codec::decode_bytes(&bytes)
            .map(Some)
            .map_err(|source| KvsError::CorruptRecord {
                path: file.to_path_buf(),
                source,
            })
    }
}

/// First path on the way to the record that has the wrong file type.
fn layout_conflict(location: &RecordLocation) -> Option<PathBuf> {
    if location.file.exists() && !location.file.is_file() {
        return Some(location.file.clone());
    }
    location
        .dir
        .ancestors()
        .find(|p| p.exists() && !p.is_dir())
        .map(Path::to_path_buf)
}

/// `create_dir_all`, reporting a file sitting where a directory belongs.
fn ensure_dir(dir: &Path) -> Result<(), KvsError> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) => match dir.ancestors().find(|p| p.exists() && !p.is_dir()) {
            Some(blocker) => Err(KvsError::LayoutConflict(blocker.to_path_buf())),
            None => Err(e.into()),
        },
    }
}

fn write_atomic(location: &RecordLocation, bytes: &[u8]) -> Result<(), KvsError> {
    let mut tmp = NamedTempFile::new_in(&location.dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    #[cfg(unix)]
    tmp.as_file()
        .set_permissions(fs::Permissions::from_mode(RECORD_FILE_MODE))?;
    tmp.as_file().sync_all()?;
    tmp.persist(&location.file).map_err(|e| KvsError::Io(e.error))?;
    sync_dir(&location.dir)?;
    Ok(())
}

/// Flushes directory entries so a rename or unlink survives a crash.
#[cfg(unix)]
pub(crate) fn sync_dir(dir: &Path) -> Result<(), KvsError> {
    fs::File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn sync_dir(_dir: &Path) -> Result<(), KvsError> {
    Ok(())
}
