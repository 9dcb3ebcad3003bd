//! LMDB environment setup.

use std::fs;
use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use serde::{Deserialize, Serialize};

use lattice_store::{Store, StoreError, STORE_VERSION};

use crate::transaction::{LmdbReadTxn, LmdbWriteTxn};
use crate::LmdbError;

const MAX_DBS: u32 = 16;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LmdbConfig {
    /// Maximum size of the memory map in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,
}

fn default_map_size() -> usize {
    128 * 1024 * 1024 * 1024
}

impl Default for LmdbConfig {
    fn default() -> Self {
        Self {
            map_size: default_map_size(),
        }
    }
}

pub(crate) type Table = Database<Bytes, Bytes>;

/// Handles for every table. Copyable; they are only meaningful with the
/// environment that created them.
#[derive(Clone, Copy)]
pub(crate) struct Databases {
    pub accounts: Table,
    pub blocks: Table,
    pub successors: Table,
    pub pending: Table,
    pub frontiers: Table,
    pub representation: Table,
    pub unchecked: Table,
    pub meta: Table,
}

/// The LMDB environment and all database handles.
pub struct LmdbStore {
    env: Env,
    dbs: Databases,
}

impl LmdbStore {
    /// Open or create a store in directory `path`.
    ///
    /// A fresh store is stamped with the current schema version; an existing store
    /// with a different version is refused.
    pub fn open(path: &Path, config: &LmdbConfig) -> Result<Self, StoreError> {
        fs::create_dir_all(path).map_err(|e| StoreError::Backend(e.to_string()))?;

        // SAFETY: the environment is opened once per path by this process and the
        // memory map is never handed out as a mutable slice.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(config.map_size)
                .max_dbs(MAX_DBS)
                .open(path)
        }
        .map_err(LmdbError::from)?;

        let mut wtxn = env.write_txn().map_err(LmdbError::from)?;
        let mut create = |name: &str| -> Result<Table, LmdbError> {
            Ok(env.create_database(&mut wtxn, Some(name))?)
        };
        let dbs = Databases {
            accounts: create("accounts")?,
            blocks: create("blocks")?,
            successors: create("successors")?,
            pending: create("pending")?,
            frontiers: create("frontiers")?,
            representation: create("representation")?,
            unchecked: create("unchecked")?,
            meta: create("meta")?,
        };

        match crate::meta::get_version(&wtxn, &dbs)? {
            None => crate::meta::put_version(&mut wtxn, &dbs, STORE_VERSION)?,
            Some(found) if found != STORE_VERSION => {
                return Err(LmdbError::VersionMismatch {
                    found,
                    expected: STORE_VERSION,
                }
                .into());
            }
            Some(_) => {}
        }
        wtxn.commit().map_err(LmdbError::from)?;

        tracing::info!(path = %path.display(), "opened LMDB store");
        Ok(Self { env, dbs })
    }
}

impl Store for LmdbStore {
    type Read<'a> = LmdbReadTxn<'a>;
    type Write<'a> = LmdbWriteTxn<'a>;

    fn tx_begin_read(&self) -> Result<LmdbReadTxn<'_>, StoreError> {
        let txn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(LmdbReadTxn::new(txn, self.dbs))
    }

    fn tx_begin_write(&self) -> Result<LmdbWriteTxn<'_>, StoreError> {
        let txn = self.env.write_txn().map_err(LmdbError::from)?;
        Ok(LmdbWriteTxn::new(txn, self.dbs))
    }
}
