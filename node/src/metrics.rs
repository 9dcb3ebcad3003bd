//! Prometheus metrics for the block processor.
//!
//! [`ProcessorMetrics`] owns a dedicated [`Registry`] that an exporter can
//! encode into the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, register_int_gauge_vec_with_registry, Histogram,
    HistogramOpts, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry,
};

use lattice_ledger::ProcessResult;

pub struct ProcessorMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Ledger verdicts, labelled by result code.
    pub processed: IntCounterVec,
    /// Forced blocks that displaced a competing chain.
    pub rollbacks: IntCounter,
    /// Blocks undone by forced rollbacks.
    pub rolled_back_blocks: IntCounter,
    /// Blocks parked in the unchecked table waiting for a dependency.
    pub unchecked_added: IntCounter,
    /// Unchecked blocks re-queued after their dependency arrived.
    pub unchecked_retried: IntCounter,
    /// State blocks dropped because their signature did not verify.
    pub bad_signatures: IntCounter,
    /// Submissions ignored because the hash was already queued or just rolled back.
    pub duplicates: IntCounter,
    /// Blocks skipped because the ledger or store failed while handling them.
    pub failures: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Current depth of each queue (`pending`, `pending_state`, `forced`).
    pub queue_depth: IntGaugeVec,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Wall-clock time of one commit batch, in milliseconds.
    pub batch_time_ms: Histogram,
    /// Number of state blocks per signature verification batch.
    pub verification_batch_size: Histogram,
}

impl ProcessorMetrics {
    /// Create a fresh set of metrics, all registered under a new [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let processed = register_int_counter_vec_with_registry!(
            Opts::new(
                "lattice_blocks_processed_total",
                "Ledger verdicts by result code"
            ),
            &["result"],
            registry
        )
        .expect("failed to register processed counter");

        let rollbacks = register_int_counter_with_registry!(
            Opts::new("lattice_forced_rollbacks_total", "Forced fork replacements"),
            registry
        )
        .expect("failed to register rollbacks counter");

        let rolled_back_blocks = register_int_counter_with_registry!(
            Opts::new(
                "lattice_rolled_back_blocks_total",
                "Blocks undone by forced rollbacks"
            ),
            registry
        )
        .expect("failed to register rolled_back_blocks counter");

        let unchecked_added = register_int_counter_with_registry!(
            Opts::new(
                "lattice_unchecked_added_total",
                "Blocks parked waiting for a dependency"
            ),
            registry
        )
        .expect("failed to register unchecked_added counter");

        let unchecked_retried = register_int_counter_with_registry!(
            Opts::new(
                "lattice_unchecked_retried_total",
                "Parked blocks re-queued after their dependency arrived"
            ),
            registry
        )
        .expect("failed to register unchecked_retried counter");

        let bad_signatures = register_int_counter_with_registry!(
            Opts::new(
                "lattice_bad_signatures_total",
                "State blocks dropped after batch signature verification"
            ),
            registry
        )
        .expect("failed to register bad_signatures counter");

        let duplicates = register_int_counter_with_registry!(
            Opts::new("lattice_duplicate_blocks_total", "Ignored duplicate submissions"),
            registry
        )
        .expect("failed to register duplicates counter");

        let failures = register_int_counter_with_registry!(
            Opts::new(
                "lattice_block_failures_total",
                "Blocks skipped after a ledger or store failure"
            ),
            registry
        )
        .expect("failed to register failures counter");

        let queue_depth = register_int_gauge_vec_with_registry!(
            Opts::new("lattice_block_processor_queue", "Blocks waiting per queue"),
            &["queue"],
            registry
        )
        .expect("failed to register queue_depth gauge");

        // Exponential buckets covering 0.1 ms → ~1.6 s.
        let batch_time_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "lattice_block_processor_batch_ms",
                "Commit batch duration in milliseconds"
            )
            .buckets(exponential_buckets(0.1, 2.0, 15)),
            registry
        )
        .expect("failed to register batch_time_ms histogram");

        let verification_batch_size = register_histogram_with_registry!(
            HistogramOpts::new(
                "lattice_verification_batch_size",
                "State blocks per signature verification batch"
            )
            .buckets(exponential_buckets(1.0, 4.0, 10)),
            registry
        )
        .expect("failed to register verification_batch_size histogram");

        Self {
            registry,
            processed,
            rollbacks,
            rolled_back_blocks,
            unchecked_added,
            unchecked_retried,
            bad_signatures,
            duplicates,
            failures,
            queue_depth,
            batch_time_ms,
            verification_batch_size,
        }
    }

    pub fn record_result(&self, result: ProcessResult) {
        self.processed.with_label_values(&[result.as_str()]).inc();
    }

    pub fn result_count(&self, result: ProcessResult) -> u64 {
        self.processed.with_label_values(&[result.as_str()]).get()
    }

    pub fn set_queue_depths(&self, pending: usize, pending_state: usize, forced: usize) {
        self.queue_depth
            .with_label_values(&["pending"])
            .set(pending as i64);
        self.queue_depth
            .with_label_values(&["pending_state"])
            .set(pending_state as i64);
        self.queue_depth
            .with_label_values(&["forced"])
            .set(forced as i64);
    }
}

impl Default for ProcessorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn exponential_buckets(start: f64, factor: f64, count: usize) -> Vec<f64> {
    prometheus::exponential_buckets(start, factor, count).unwrap_or_default()
}
