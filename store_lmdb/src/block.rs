//! Block table (hash → type byte, body, sideband) and successor index
//! (hash → next hash in the same account chain).

use heed::{RoTxn, RwTxn};

use lattice_store::{BlockSideband, StoreError, StoredBlock};
use lattice_types::{Block, BlockHash};

use crate::environment::Databases;
use crate::LmdbError;

pub(crate) fn get(
    txn: &RoTxn,
    dbs: &Databases,
    hash: &BlockHash,
) -> Result<Option<StoredBlock>, StoreError> {
    match dbs.blocks.get(txn, hash.as_bytes()).map_err(LmdbError::from)? {
        Some(bytes) => Ok(Some(StoredBlock::from_bytes(bytes)?)),
        None => Ok(None),
    }
}

pub(crate) fn exists(txn: &RoTxn, dbs: &Databases, hash: &BlockHash) -> Result<bool, LmdbError> {
    Ok(dbs.blocks.get(txn, hash.as_bytes())?.is_some())
}

pub(crate) fn count(txn: &RoTxn, dbs: &Databases) -> Result<u64, LmdbError> {
    Ok(dbs.blocks.len(txn)?)
}

pub(crate) fn successor(
    txn: &RoTxn,
    dbs: &Databases,
    hash: &BlockHash,
) -> Result<Option<BlockHash>, LmdbError> {
    match dbs.successors.get(txn, hash.as_bytes())? {
        Some(bytes) => BlockHash::from_slice(bytes)
            .map(Some)
            .ok_or(LmdbError::Malformed { table: "successors" }),
        None => Ok(None),
    }
}

pub(crate) fn put(
    txn: &mut RwTxn,
    dbs: &Databases,
    block: &Block,
    sideband: &BlockSideband,
) -> Result<(), StoreError> {
    let stored = StoredBlock {
        block: block.clone(),
        sideband: sideband.clone(),
    };
    let bytes = stored.to_bytes()?;
    dbs.blocks
        .put(txn, block.hash().as_bytes(), &bytes)
        .map_err(LmdbError::from)?;
    Ok(())
}

pub(crate) fn delete(txn: &mut RwTxn, dbs: &Databases, hash: &BlockHash) -> Result<(), LmdbError> {
    dbs.blocks.delete(txn, hash.as_bytes())?;
    Ok(())
}

pub(crate) fn put_successor(
    txn: &mut RwTxn,
    dbs: &Databases,
    hash: &BlockHash,
    successor: &BlockHash,
) -> Result<(), LmdbError> {
    dbs.successors.put(txn, hash.as_bytes(), successor.as_bytes())?;
    Ok(())
}

pub(crate) fn delete_successor(
    txn: &mut RwTxn,
    dbs: &Databases,
    hash: &BlockHash,
) -> Result<(), LmdbError> {
    dbs.successors.delete(txn, hash.as_bytes())?;
    Ok(())
}
