//! Per-network work thresholds.

use lattice_types::Block;

use crate::validator::validate_work;

const LIVE_THRESHOLD: u64 = 0xffff_ffc0_0000_0000;
const BETA_THRESHOLD: u64 = 0xffff_f000_0000_0000;
const DEV_THRESHOLD: u64 = 0xfe00_0000_0000_0000;

/// Minimum work value a block must reach to be accepted for processing.
///
/// Higher threshold values mean harder work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkThresholds {
    pub publish: u64,
}

impl WorkThresholds {
    pub fn live() -> Self {
        Self {
            publish: LIVE_THRESHOLD,
        }
    }

    pub fn beta() -> Self {
        Self {
            publish: BETA_THRESHOLD,
        }
    }

    /// Cheap enough that tests can generate work for every block.
    pub fn dev() -> Self {
        Self {
            publish: DEV_THRESHOLD,
        }
    }

    /// Construct with a custom threshold (0 disables the check).
    pub fn with_base(publish: u64) -> Self {
        Self { publish }
    }

    pub fn is_valid(&self, block: &Block) -> bool {
        validate_work(&block.root(), block.work(), self.publish)
    }
}

impl Default for WorkThresholds {
    fn default() -> Self {
        Self::live()
    }
}
