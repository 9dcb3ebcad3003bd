//! Account table: account → bincode(AccountInfo).

use heed::{RoTxn, RwTxn};

use lattice_store::AccountInfo;
use lattice_types::Account;

use crate::environment::Databases;
use crate::LmdbError;

pub(crate) fn get(
    txn: &RoTxn,
    dbs: &Databases,
    account: &Account,
) -> Result<Option<AccountInfo>, LmdbError> {
    match dbs.accounts.get(txn, account.as_bytes())? {
        Some(bytes) => Ok(Some(bincode::deserialize(bytes)?)),
        None => Ok(None),
    }
}

pub(crate) fn count(txn: &RoTxn, dbs: &Databases) -> Result<u64, LmdbError> {
    Ok(dbs.accounts.len(txn)?)
}

pub(crate) fn iter(txn: &RoTxn, dbs: &Databases) -> Result<Vec<(Account, AccountInfo)>, LmdbError> {
    let mut out = Vec::new();
    for entry in dbs.accounts.iter(txn)? {
        let (key, value) = entry?;
        let account = Account::from_slice(key).ok_or(LmdbError::Malformed { table: "accounts" })?;
        out.push((account, bincode::deserialize(value)?));
    }
    Ok(out)
}

pub(crate) fn put(
    txn: &mut RwTxn,
    dbs: &Databases,
    account: &Account,
    info: &AccountInfo,
) -> Result<(), LmdbError> {
    let bytes = bincode::serialize(info)?;
    dbs.accounts.put(txn, account.as_bytes(), &bytes)?;
    Ok(())
}

pub(crate) fn delete(txn: &mut RwTxn, dbs: &Databases, account: &Account) -> Result<(), LmdbError> {
    dbs.accounts.delete(txn, account.as_bytes())?;
    Ok(())
}
