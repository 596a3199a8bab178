//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};
use tracing::info;

use crate::{LmdbConsumptionStore, LmdbError};

/// Name of the database mapping reference -> consumed-at.
const CONSUMED_DB: &str = "consumed";

/// Upper bound on named databases in the environment.
const MAX_DBS: u32 = 4;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    consumed_db: Database<Str, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment in the directory `path`.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process for this path and
        // the memory map is never modified outside of heed transactions.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let consumed_db: Database<Str, Bytes> = env.create_database(&mut wtxn, Some(CONSUMED_DB))?;
        wtxn.commit()?;

        info!(path = %path.display(), map_size, "opened LMDB environment");
        Ok(Self {
            env: Arc::new(env),
            consumed_db,
        })
    }

    /// A consumption store sharing this environment.
    pub fn consumption_store(&self) -> LmdbConsumptionStore {
        LmdbConsumptionStore {
            env: Arc::clone(&self.env),
            consumed_db: self.consumed_db,
        }
    }
}
