//! # Metrics
//!
//! Prometheus metrics for the provisioning workflow.
//!
//! ## Metrics Exposed
//!
//! - `cosmos_mgmt_provider_operations_total` - Control-plane operations by operation
//! - `cosmos_mgmt_provider_operation_errors_total` - Failed control-plane operations by operation
//! - `cosmos_mgmt_provider_operation_duration_seconds` - Duration of control-plane operations
//! - `cosmos_mgmt_lro_polls_total` - Long-running operation status polls
//! - `cosmos_mgmt_stages_total` - Workflow stages by stage and outcome

use anyhow::Result;
use prometheus::{Encoder, HistogramVec, IntCounter, IntCounterVec, Registry, TextEncoder};
use std::sync::LazyLock;

// Metrics
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static PROVIDER_OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "cosmos_mgmt_provider_operations_total",
            "Total number of control-plane operations by operation",
        ),
        &["operation"],
    )
    .expect("Failed to create PROVIDER_OPERATIONS_TOTAL metric - this should never happen")
});

static PROVIDER_OPERATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "cosmos_mgmt_provider_operation_errors_total",
            "Total number of failed control-plane operations by operation",
        ),
        &["operation"],
    )
    .expect("Failed to create PROVIDER_OPERATION_ERRORS_TOTAL metric - this should never happen")
});

static PROVIDER_OPERATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "cosmos_mgmt_provider_operation_duration_seconds",
            "Duration of control-plane operations in seconds by operation",
        )
        .buckets(vec![0.1, 0.5, 1.0, 5.0, 30.0, 120.0, 600.0]),
        &["operation"],
    )
    .expect("Failed to create PROVIDER_OPERATION_DURATION metric - this should never happen")
});

static LRO_POLLS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "cosmos_mgmt_lro_polls_total",
        "Total number of long-running operation status polls",
    )
    .expect("Failed to create LRO_POLLS_TOTAL metric - this should never happen")
});

static STAGES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "cosmos_mgmt_stages_total",
            "Total number of workflow stages by stage and outcome",
        ),
        &["stage", "outcome"],
    )
    .expect("Failed to create STAGES_TOTAL metric - this should never happen")
});

/// Register all metrics with the process registry
///
/// # Errors
/// Returns an error if a metric is registered twice.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(PROVIDER_OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(PROVIDER_OPERATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(PROVIDER_OPERATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(LRO_POLLS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STAGES_TOTAL.clone()))?;

    Ok(())
}

pub fn record_provider_operation(operation: &str, duration: f64) {
    PROVIDER_OPERATIONS_TOTAL
        .with_label_values(&[operation])
        .inc();
    PROVIDER_OPERATION_DURATION
        .with_label_values(&[operation])
        .observe(duration);
}

pub fn increment_provider_operation_errors(operation: &str) {
    PROVIDER_OPERATION_ERRORS_TOTAL
        .with_label_values(&[operation])
        .inc();
}

pub fn increment_lro_polls() {
    LRO_POLLS_TOTAL.inc();
}

pub fn record_stage(stage: &str, outcome: &str) {
    STAGES_TOTAL.with_label_values(&[stage, outcome]).inc();
}

/// Current value of the stage counter (used by tests and the run summary)
#[must_use]
pub fn stage_count(stage: &str, outcome: &str) -> u64 {
    STAGES_TOTAL.with_label_values(&[stage, outcome]).get()
}

/// Render the registry in the Prometheus text exposition format
///
/// # Errors
/// Returns an error if encoding fails.
pub fn gather_text() -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
