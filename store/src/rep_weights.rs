//! Representation table: representative → delegated weight.

use crate::StoreError;
use lattice_types::{Account, Amount};

pub trait RepWeightStore {
    /// Zero for representatives with no entry.
    fn get_weight(&self, representative: &Account) -> Result<Amount, StoreError>;
    fn rep_weights(&self) -> Result<Vec<(Account, Amount)>, StoreError>;
}

pub trait RepWeightStoreMut {
    /// Storing a zero weight removes the entry.
    fn put_weight(&mut self, representative: &Account, weight: Amount) -> Result<(), StoreError>;
}
