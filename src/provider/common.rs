//! Common utilities for control-plane implementations
//!
//! Span attributes and metrics recorded the same way for every operation.

use crate::observability::metrics;
use std::time::{Duration, Instant};
use tracing::Span;

/// Records operation metrics and span attributes for a successful operation
pub fn record_success_metrics(span: &Span, operation: &str, duration: Duration) {
    span.record("operation.duration_ms", duration_ms(duration));
    span.record("operation.success", true);
    metrics::record_provider_operation(operation, duration.as_secs_f64());
}

/// Records operation metrics and span attributes for a failed operation
pub fn record_error_metrics(span: &Span, operation: &str, error_message: &str, duration: Duration) {
    span.record("operation.success", false);
    span.record("error.message", error_message);
    span.record("operation.duration_ms", duration_ms(duration));
    metrics::record_provider_operation(operation, duration.as_secs_f64());
    metrics::increment_provider_operation_errors(operation);
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Helper struct for tracking operation state
#[derive(Debug)]
pub struct OperationTracker {
    operation: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTracker {
    #[must_use]
    pub fn new(operation: &'static str, span: Span) -> Self {
        Self {
            operation,
            start: Instant::now(),
            span,
        }
    }

    pub fn record_success(&self) {
        record_success_metrics(&self.span, self.operation, self.start.elapsed());
    }

    pub fn record_error(&self, error_message: &str) {
        record_error_metrics(
            &self.span,
            self.operation,
            error_message,
            self.start.elapsed(),
        );
    }

    /// Record the outcome of `result` and hand it back
    pub fn finish<T, E: std::fmt::Display>(&self, result: Result<T, E>) -> Result<T, E> {
        match &result {
            Ok(_) => self.record_success(),
            Err(e) => self.record_error(&e.to_string()),
        }
        result
    }
}
