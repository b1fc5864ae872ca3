//! # Observability
//!
//! Observability modules for logging and metrics.
//!
//! - `init_tracing`: `tracing` subscriber with `RUST_LOG` filtering
//! - `metrics`: Prometheus metrics collection

pub mod metrics;

/// Install the global `tracing` subscriber
///
/// Honors `RUST_LOG`; defaults to `cosmos_mgmt=info`. Calling it twice is harmless.
pub fn init_tracing() {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cosmos_mgmt=info".into()),
        )
        .with_writer(std::io::stderr)
        .try_init()
    {
        tracing::debug!("Tracing subscriber already initialized: {}", e);
    }
}
