//! Metadata table.

use crate::StoreError;

/// Schema version written by this crate. Backends refuse to open a store
/// carrying a different version.
pub const STORE_VERSION: u32 = 1;

pub trait MetaStore {
    fn get_version(&self) -> Result<Option<u32>, StoreError>;
}

pub trait MetaStoreMut {
    fn put_version(&mut self, version: u32) -> Result<(), StoreError>;
}
