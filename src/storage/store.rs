//! Keyed snapshot storage backends

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::models::SnapshotPointer;
use crate::utils::write_atomic;

const POINTER_FILENAME: &str = "latest_snapshot.json";

/// File name a snapshot key is stored under
pub fn snapshot_file_name(key: &str) -> String {
    format!("snapshot_{}.json", key)
}

/// Content-addressed storage for raw snapshots plus a single "latest" pointer
pub trait SnapshotStore {
    fn exists(&self, key: &str) -> Result<bool>;
    fn write(&self, key: &str, content: &[u8]) -> Result<()>;
    fn write_pointer(&self, pointer: &SnapshotPointer) -> Result<()>;
}

impl<T: SnapshotStore + ?Sized> SnapshotStore for &T {
    fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key)
    }

    fn write(&self, key: &str, content: &[u8]) -> Result<()> {
        (**self).write(key, content)
    }

    fn write_pointer(&self, pointer: &SnapshotPointer) -> Result<()> {
        (**self).write_pointer(pointer)
    }
}

/// Stores snapshots as files in one directory
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    dir: PathBuf,
}

impl FsSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn snapshot_path(&self, key: &str) -> PathBuf {
        self.dir.join(snapshot_file_name(key))
    }

    pub fn pointer_path(&self) -> PathBuf {
        self.dir.join(POINTER_FILENAME)
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn exists(&self, key: &str) -> Result<bool> {
        let path = self.snapshot_path(key);
        path.try_exists()
            .with_context(|| format!("Failed to check snapshot file: {}", path.display()))
    }

    fn write(&self, key: &str, content: &[u8]) -> Result<()> {
        write_atomic(&self.snapshot_path(key), content)
    }

    fn write_pointer(&self, pointer: &SnapshotPointer) -> Result<()> {
        let json =
            serde_json::to_vec_pretty(pointer).context("Failed to serialize snapshot pointer")?;
        write_atomic(&self.pointer_path(), &json)
    }
}

/// In-process store, mainly for tests and dry runs
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: RefCell<BTreeMap<String, Vec<u8>>>,
    pointer: RefCell<Option<SnapshotPointer>>,
    pointer_writes: RefCell<usize>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.snapshots.borrow().keys().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.snapshots.borrow().get(key).cloned()
    }

    pub fn pointer(&self) -> Option<SnapshotPointer> {
        self.pointer.borrow().clone()
    }

    pub fn pointer_writes(&self) -> usize {
        *self.pointer_writes.borrow()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.snapshots.borrow().contains_key(key))
    }

    fn write(&self, key: &str, content: &[u8]) -> Result<()> {
        self.snapshots.borrow_mut().insert(key.to_string(), content.to_vec());
        Ok(())
    }

    fn write_pointer(&self, pointer: &SnapshotPointer) -> Result<()> {
        *self.pointer.borrow_mut() = Some(pointer.clone());
        *self.pointer_writes.borrow_mut() += 1;
        Ok(())
    }
}
