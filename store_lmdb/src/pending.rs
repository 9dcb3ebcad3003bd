//! Pending table.
//!
//! Key format: `account (32) ++ send hash (32)`. All accounts have identical
//! length, so a prefix scan on the account yields exactly its receivables.

use heed::{RoTxn, RwTxn};

use lattice_store::{PendingInfo, PendingKey};
use lattice_types::Account;

use crate::environment::Databases;
use crate::LmdbError;

pub(crate) fn get(
    txn: &RoTxn,
    dbs: &Databases,
    key: &PendingKey,
) -> Result<Option<PendingInfo>, LmdbError> {
    match dbs.pending.get(txn, &key.to_bytes())? {
        Some(bytes) => Ok(Some(bincode::deserialize(bytes)?)),
        None => Ok(None),
    }
}

pub(crate) fn for_account(
    txn: &RoTxn,
    dbs: &Databases,
    account: &Account,
) -> Result<Vec<(PendingKey, PendingInfo)>, LmdbError> {
    let mut out = Vec::new();
    for entry in dbs.pending.prefix_iter(txn, account.as_bytes())? {
        let (key, value) = entry?;
        let key = PendingKey::from_bytes(key).ok_or(LmdbError::Malformed { table: "pending" })?;
        out.push((key, bincode::deserialize(value)?));
    }
    Ok(out)
}

pub(crate) fn count(txn: &RoTxn, dbs: &Databases) -> Result<u64, LmdbError> {
    Ok(dbs.pending.len(txn)?)
}

pub(crate) fn put(
    txn: &mut RwTxn,
    dbs: &Databases,
    key: &PendingKey,
    info: &PendingInfo,
) -> Result<(), LmdbError> {
    let bytes = bincode::serialize(info)?;
    dbs.pending.put(txn, &key.to_bytes(), &bytes)?;
    Ok(())
}

pub(crate) fn delete(txn: &mut RwTxn, dbs: &Databases, key: &PendingKey) -> Result<(), LmdbError> {
    dbs.pending.delete(txn, &key.to_bytes())?;
    Ok(())
}
