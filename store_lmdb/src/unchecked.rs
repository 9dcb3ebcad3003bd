//! Unchecked table.
//!
//! Key format: `dependency (32) ++ block hash (32)`, value bincode(UncheckedInfo).

use heed::{RoTxn, RwTxn};

use lattice_store::{UncheckedInfo, UncheckedKey};
use lattice_types::BlockHash;

use crate::environment::Databases;
use crate::LmdbError;

pub(crate) fn get(
    txn: &RoTxn,
    dbs: &Databases,
    dependency: &BlockHash,
) -> Result<Vec<(UncheckedKey, UncheckedInfo)>, LmdbError> {
    let mut out = Vec::new();
    for entry in dbs.unchecked.prefix_iter(txn, dependency.as_bytes())? {
        let (key, value) = entry?;
        let key =
            UncheckedKey::from_bytes(key).ok_or(LmdbError::Malformed { table: "unchecked" })?;
        out.push((key, bincode::deserialize(value)?));
    }
    Ok(out)
}

pub(crate) fn exists(txn: &RoTxn, dbs: &Databases, key: &UncheckedKey) -> Result<bool, LmdbError> {
    Ok(dbs.unchecked.get(txn, &key.to_bytes())?.is_some())
}

pub(crate) fn count(txn: &RoTxn, dbs: &Databases) -> Result<u64, LmdbError> {
    Ok(dbs.unchecked.len(txn)?)
}

pub(crate) fn put(
    txn: &mut RwTxn,
    dbs: &Databases,
    key: &UncheckedKey,
    info: &UncheckedInfo,
) -> Result<(), LmdbError> {
    let bytes = bincode::serialize(info)?;
    dbs.unchecked.put(txn, &key.to_bytes(), &bytes)?;
    Ok(())
}

pub(crate) fn delete(txn: &mut RwTxn, dbs: &Databases, key: &UncheckedKey) -> Result<(), LmdbError> {
    dbs.unchecked.delete(txn, &key.to_bytes())?;
    Ok(())
}
