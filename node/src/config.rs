//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use lattice_store_lmdb::LmdbConfig;
use lattice_work::WorkThresholds;

use crate::{LogFormat, NodeError};

/// Which network's proof-of-work thresholds apply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Live,
    Beta,
    #[default]
    Dev,
}

impl Network {
    pub fn work_thresholds(self) -> WorkThresholds {
        match self {
            Network::Live => WorkThresholds::live(),
            Network::Beta => WorkThresholds::beta(),
            Network::Dev => WorkThresholds::dev(),
        }
    }
}

/// Tuning for the block processor's queues and commit batches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockProcessorConfig {
    /// Wall-clock budget of one write transaction.
    #[serde(default = "default_batch_max_time_ms")]
    pub batch_max_time_ms: u64,

    /// Write transaction budget while fast bootstrapping; 0 is unbounded.
    #[serde(default)]
    pub bootstrap_batch_max_time_ms: u64,

    /// Minimum number of blocks committed per batch, even past the time budget.
    #[serde(default)]
    pub batch_size: usize,

    /// Queue depth at which [`crate::BlockProcessor::full`] reports back-pressure.
    #[serde(default = "default_full_size")]
    pub full_size: usize,

    /// Queue ceiling while fast bootstrapping.
    #[serde(default = "default_bootstrap_full_size")]
    pub bootstrap_full_size: usize,

    /// State blocks verified per signature batch.
    #[serde(default = "default_verification_batch")]
    pub verification_batch: usize,

    #[serde(default = "default_bootstrap_verification_batch")]
    pub bootstrap_verification_batch: usize,

    /// Capacity of the recently rolled back set.
    #[serde(default = "default_rolled_back_max")]
    pub rolled_back_max: usize,

    /// Forks newer than this are left to consensus.
    #[serde(default = "default_fork_grace_secs")]
    pub fork_grace_secs: u64,

    /// Blocks that arrived within this window count as live traffic.
    #[serde(default = "default_live_window_secs")]
    pub live_window_secs: u64,

    /// Skip retrying dependents of `Old` blocks and use the bootstrap queue
    /// ceilings and batch budget.
    #[serde(default)]
    pub fast_bootstrap: bool,

    /// Signature checker pool size; 0 verifies on the processor thread.
    #[serde(default = "default_signature_checker_threads")]
    pub signature_checker_threads: usize,

    /// Remove unchecked entries once they have been re-queued.
    #[serde(default = "default_true")]
    pub unchecked_deletion: bool,
}

impl BlockProcessorConfig {
    pub fn batch_max_time(&self) -> Duration {
        if !self.fast_bootstrap {
            Duration::from_millis(self.batch_max_time_ms)
        } else if self.bootstrap_batch_max_time_ms == 0 {
            Duration::MAX
        } else {
            Duration::from_millis(self.bootstrap_batch_max_time_ms)
        }
    }

    pub fn max_size(&self) -> usize {
        if self.fast_bootstrap {
            self.bootstrap_full_size
        } else {
            self.full_size
        }
    }

    pub fn max_verification_batch(&self) -> usize {
        if self.fast_bootstrap {
            self.bootstrap_verification_batch
        } else {
            self.verification_batch
        }
    }
}

impl Default for BlockProcessorConfig {
    fn default() -> Self {
        Self {
            batch_max_time_ms: default_batch_max_time_ms(),
            bootstrap_batch_max_time_ms: 0,
            batch_size: 0,
            full_size: default_full_size(),
            bootstrap_full_size: default_bootstrap_full_size(),
            verification_batch: default_verification_batch(),
            bootstrap_verification_batch: default_bootstrap_verification_batch(),
            rolled_back_max: default_rolled_back_max(),
            fork_grace_secs: default_fork_grace_secs(),
            live_window_secs: default_live_window_secs(),
            fast_bootstrap: false,
            signature_checker_threads: default_signature_checker_threads(),
            unchecked_deletion: default_true(),
        }
    }
}

/// Configuration for a node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub network: Network,

    /// Data directory for ledger storage.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Log level filter, e.g. "info" or "debug,lattice_ledger=trace".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to expose Prometheus metrics.
    #[serde(default)]
    pub enable_metrics: bool,

    #[serde(default)]
    pub lmdb: LmdbConfig,

    #[serde(default)]
    pub block_processor: BlockProcessorConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_batch_max_time_ms() -> u64 {
    500
}

fn default_full_size() -> usize {
    65_536
}

fn default_bootstrap_full_size() -> usize {
    1_048_576
}

fn default_verification_batch() -> usize {
    2_048
}

fn default_bootstrap_verification_batch() -> usize {
    16_384
}

fn default_rolled_back_max() -> usize {
    1_024
}

fn default_fork_grace_secs() -> u64 {
    15
}

fn default_live_window_secs() -> u64 {
    300
}

fn default_signature_checker_threads() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./lattice_data")
}

fn default_log_format() -> LogFormat {
    LogFormat::Human
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            data_dir: default_data_dir(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            enable_metrics: false,
            lmdb: LmdbConfig::default(),
            block_processor: BlockProcessorConfig::default(),
        }
    }
}
