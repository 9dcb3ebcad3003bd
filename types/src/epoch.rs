//! Account epochs and the table of epoch-upgrade links.
//!
//! An epoch block is a state block whose `link` equals one of the registered
//! sentinels and whose balance is unchanged. It is signed by the sentinel's
//! signer instead of the account owner and moves the account one epoch forward.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Account, Link};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Epoch {
    #[default]
    Epoch0,
    Epoch1,
    Epoch2,
}

impl Epoch {
    pub const MAX: Self = Epoch::Epoch2;

    pub fn as_u8(self) -> u8 {
        match self {
            Epoch::Epoch0 => 0,
            Epoch::Epoch1 => 1,
            Epoch::Epoch2 => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Epoch::Epoch0),
            1 => Some(Epoch::Epoch1),
            2 => Some(Epoch::Epoch2),
            _ => None,
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_u8(self.as_u8() + 1)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EpochInfo {
    pub signer: Account,
    pub epoch: Epoch,
}

/// Registered epoch links for a network.
#[derive(Clone, Debug, Default)]
pub struct Epochs {
    links: HashMap<Link, EpochInfo>,
}

impl Epochs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, epoch: Epoch, signer: Account, link: Link) {
        self.links.insert(link, EpochInfo { signer, epoch });
    }

    pub fn is_epoch_link(&self, link: &Link) -> bool {
        self.links.contains_key(link)
    }

    pub fn signer(&self, link: &Link) -> Option<Account> {
        self.links.get(link).map(|info| info.signer)
    }

    pub fn epoch(&self, link: &Link) -> Option<Epoch> {
        self.links.get(link).map(|info| info.epoch)
    }

    pub fn link(&self, epoch: Epoch) -> Option<Link> {
        self.links
            .iter()
            .find(|(_, info)| info.epoch == epoch)
            .map(|(link, _)| *link)
    }

    /// Epoch upgrades may only advance by exactly one step.
    pub fn is_sequential(current: Epoch, new: Epoch) -> bool {
        current.next() == Some(new)
    }
}
