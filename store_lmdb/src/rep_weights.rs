//! Representation table: representative → weight as 16 bytes big-endian.

use heed::{RoTxn, RwTxn};

use lattice_types::{Account, Amount};

use crate::environment::Databases;
use crate::LmdbError;

fn decode(bytes: &[u8]) -> Result<Amount, LmdbError> {
    let array: [u8; 16] = bytes
        .try_into()
        .map_err(|_| LmdbError::Malformed { table: "representation" })?;
    Ok(Amount::from_be_bytes(array))
}

pub(crate) fn get(txn: &RoTxn, dbs: &Databases, rep: &Account) -> Result<Amount, LmdbError> {
    match dbs.representation.get(txn, rep.as_bytes())? {
        Some(bytes) => decode(bytes),
        None => Ok(Amount::ZERO),
    }
}

pub(crate) fn iter(txn: &RoTxn, dbs: &Databases) -> Result<Vec<(Account, Amount)>, LmdbError> {
    let mut out = Vec::new();
    for entry in dbs.representation.iter(txn)? {
        let (key, value) = entry?;
        let rep = Account::from_slice(key).ok_or(LmdbError::Malformed {
            table: "representation",
        })?;
        out.push((rep, decode(value)?));
    }
    Ok(out)
}

pub(crate) fn put(
    txn: &mut RwTxn,
    dbs: &Databases,
    rep: &Account,
    weight: Amount,
) -> Result<(), LmdbError> {
    if weight.is_zero() {
        dbs.representation.delete(txn, rep.as_bytes())?;
    } else {
        dbs.representation
            .put(txn, rep.as_bytes(), &weight.to_be_bytes())?;
    }
    Ok(())
}
