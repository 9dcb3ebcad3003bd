//! Frontier table: legacy head hash → account.

use heed::{RoTxn, RwTxn};

use lattice_types::{Account, BlockHash};

use crate::environment::Databases;
use crate::LmdbError;

pub(crate) fn get(
    txn: &RoTxn,
    dbs: &Databases,
    head: &BlockHash,
) -> Result<Option<Account>, LmdbError> {
    match dbs.frontiers.get(txn, head.as_bytes())? {
        Some(bytes) => Account::from_slice(bytes)
            .map(Some)
            .ok_or(LmdbError::Malformed { table: "frontiers" }),
        None => Ok(None),
    }
}

pub(crate) fn count(txn: &RoTxn, dbs: &Databases) -> Result<u64, LmdbError> {
    Ok(dbs.frontiers.len(txn)?)
}

pub(crate) fn put(
    txn: &mut RwTxn,
    dbs: &Databases,
    head: &BlockHash,
    account: &Account,
) -> Result<(), LmdbError> {
    dbs.frontiers.put(txn, head.as_bytes(), account.as_bytes())?;
    Ok(())
}

pub(crate) fn delete(txn: &mut RwTxn, dbs: &Databases, head: &BlockHash) -> Result<(), LmdbError> {
    dbs.frontiers.delete(txn, head.as_bytes())?;
    Ok(())
}
