//! Metadata table.

use heed::{RoTxn, RwTxn};

use crate::environment::Databases;
use crate::LmdbError;

const VERSION_KEY: &[u8] = b"version";

pub(crate) fn get_version(txn: &RoTxn, dbs: &Databases) -> Result<Option<u32>, LmdbError> {
    match dbs.meta.get(txn, VERSION_KEY)? {
        Some(bytes) => {
            let array: [u8; 4] = bytes
                .try_into()
                .map_err(|_| LmdbError::Malformed { table: "meta" })?;
            Ok(Some(u32::from_be_bytes(array)))
        }
        None => Ok(None),
    }
}

pub(crate) fn put_version(txn: &mut RwTxn, dbs: &Databases, version: u32) -> Result<(), LmdbError> {
    dbs.meta.put(txn, VERSION_KEY, &version.to_be_bytes())?;
    Ok(())
}
