//! # SwarmDB — Embedded Storage
//!
//! Thin wrapper over a sled database. Each persistent adapter in
//! [`super`] owns one named tree:
//!
//! | Tree               | Key                              | Value               |
//! |--------------------|----------------------------------|---------------------|
//! | `keys`             | address (UTF-8)                  | `bincode(KeyRecord)`|
//! | `submission_queue` | priority (8B BE) ‖ seq (8B BE)   | payload bytes       |
//!
//! Integers in keys are big-endian so sled's lexicographic order matches
//! numeric order.

use std::path::Path;

use sled::{Db, Tree};

/// Errors from the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Handle to the node's sled database. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SwarmDB {
    db: Db,
}

impl SwarmDB {
    /// Opens or creates a database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        Ok(Self {
            db: sled::open(path)?,
        })
    }

    /// An in-memory database removed on drop. For tests.
    pub fn open_temporary() -> DbResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Opens (creating if needed) a named tree.
    pub fn open_tree(&self, name: &str) -> DbResult<Tree> {
        Ok(self.db.open_tree(name)?)
    }

    /// A database-wide monotonic counter.
    pub fn generate_id(&self) -> DbResult<u64> {
        Ok(self.db.generate_id()?)
    }

    /// Blocks until buffered writes are durable.
    pub fn flush(&self) -> DbResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporary_database_opens_trees() {
        let db = SwarmDB::open_temporary().unwrap();
        let tree = db.open_tree("scratch").unwrap();
        tree.insert(b"k", b"v".to_vec()).unwrap();
        assert_eq!(tree.get(b"k").unwrap().as_deref(), Some(&b"v"[..]));
        db.flush().unwrap();
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let db = SwarmDB::open(dir.path()).unwrap();
            db.open_tree("scratch").unwrap().insert(b"k", b"v".to_vec()).unwrap();
            db.flush().unwrap();
        }
        let db = SwarmDB::open(dir.path()).unwrap();
        assert!(db.open_tree("scratch").unwrap().contains_key(b"k").unwrap());
    }

    #[test]
    fn generated_ids_increase() {
        let db = SwarmDB::open_temporary().unwrap();
        let a = db.generate_id().unwrap();
        let b = db.generate_id().unwrap();
        assert!(b > a);
    }
}
