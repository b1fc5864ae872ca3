//! # Throughput Adjuster
//!
//! Adds a delta to a container's dedicated throughput.
//!
//! ## Rules
//!
//! - **Autoscale**: baseline is the current max, or the configured default when the
//!   service reports `0` (not yet initialized). New max is `max(1000, baseline + delta)`.
//! - **Manual**: baseline is the current value (absent counts as `0`). A zero baseline
//!   means the delta is the absolute target. New value is `max(400, baseline + delta)`.
//! - The persisted settings are re-read after the update and reported as applied.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::arm::{ResourcePath, ScopeLevel};
use crate::constants::{MIN_AUTOSCALE_THROUGHPUT, MIN_MANUAL_THROUGHPUT};
use crate::error::WorkflowError;
use crate::model::{ThroughputSetting, ThroughputSettings};
use crate::provider::ControlPlane;

/// The service reported neither an autoscale nor a manual value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("neither autoscale nor manual throughput is set")]
pub struct AmbiguousThroughput;

/// What will be requested, and from which starting point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThroughputPlan {
    pub previous: ThroughputSetting,
    pub baseline: i32,
    pub delta: i64,
    pub requested: ThroughputSetting,
}

/// Outcome of an adjustment: before, requested and what the service persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThroughputReport {
    pub previous: ThroughputSettings,
    pub requested: ThroughputSetting,
    pub applied: ThroughputSettings,
}

impl fmt::Display for ThroughputReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> requested {} -> applied {}",
            self.previous, self.requested, self.applied
        )
    }
}

fn saturating_sum(baseline: i32, delta: i64) -> i32 {
    let sum = i64::from(baseline).saturating_add(delta);
    i32::try_from(sum.clamp(i64::from(i32::MIN), i64::from(i32::MAX))).unwrap_or(i32::MAX)
}

/// Compute the update for `current`
///
/// # Errors
/// [`AmbiguousThroughput`] when `current` carries neither value.
pub fn plan_throughput_update(
    current: &ThroughputSettings,
    delta: i64,
    configured_default: i32,
) -> Result<ThroughputPlan, AmbiguousThroughput> {
    let previous = current.current().ok_or(AmbiguousThroughput)?;

    let plan = match previous {
        ThroughputSetting::Autoscale { max_throughput } => {
            let baseline = if max_throughput == 0 {
                configured_default
            } else {
                max_throughput
            };
            ThroughputPlan {
                previous,
                baseline,
                delta,
                requested: ThroughputSetting::Autoscale {
                    max_throughput: saturating_sum(baseline, delta).max(MIN_AUTOSCALE_THROUGHPUT),
                },
            }
        }
        ThroughputSetting::Manual { throughput } => {
            // Zero is "never initialized": the delta becomes the absolute target
            let (baseline, delta) = if throughput == 0 {
                (saturating_sum(0, delta), 0)
            } else {
                (throughput, delta)
            };
            ThroughputPlan {
                previous,
                baseline,
                delta,
                requested: ThroughputSetting::Manual {
                    throughput: saturating_sum(baseline, delta).max(MIN_MANUAL_THROUGHPUT),
                },
            }
        }
    };
    Ok(plan)
}

/// Read, plan, apply and re-read the container throughput at `path`
///
/// # Errors
/// - [`WorkflowError::NoDedicatedThroughput`] when the container has no throughput resource
/// - [`WorkflowError::AmbiguousThroughputState`] when neither value is reported
/// - [`WorkflowError::ProviderOperationFailed`] for any other control-plane failure
pub async fn adjust_throughput(
    control_plane: &dyn ControlPlane,
    path: &ResourcePath,
    location: &str,
    delta: i64,
    configured_default: i32,
) -> Result<ThroughputReport, WorkflowError> {
    let resource = path.scope(ScopeLevel::Container);

    let previous = match control_plane.get_container_throughput(path).await {
        Ok(settings) => settings,
        Err(e) if e.is_not_found() => {
            return Err(WorkflowError::NoDedicatedThroughput { resource });
        }
        Err(e) => return Err(WorkflowError::provider("get_container_throughput", &resource)(e)),
    };
    debug!("Current throughput for {}: {}", resource, previous);

    let Ok(plan) = plan_throughput_update(&previous, delta, configured_default) else {
        return Err(WorkflowError::AmbiguousThroughputState { resource });
    };
    info!(
        "Updating throughput: {} (baseline {}, delta {}) -> {}",
        plan.previous, plan.baseline, plan.delta, plan.requested
    );

    control_plane
        .update_container_throughput(path, location, plan.requested)
        .await
        .map_err(WorkflowError::provider("update_container_throughput", &resource))?;

    let applied = control_plane
        .get_container_throughput(path)
        .await
        .map_err(WorkflowError::provider("get_container_throughput", &resource))?;

    Ok(ThroughputReport {
        previous,
        requested: plan.requested,
        applied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn autoscale(max: i32) -> ThroughputSettings {
        ThroughputSettings {
            autoscale_max_throughput: Some(max),
            ..ThroughputSettings::default()
        }
    }

    fn manual(value: Option<i32>) -> ThroughputSettings {
        ThroughputSettings {
            manual_throughput: value,
            ..ThroughputSettings::default()
        }
    }

    #[test]
    fn test_autoscale_adds_delta() {
        let plan = plan_throughput_update(&autoscale(2000), 1000, 1000).expect("plan");
        assert_eq!(
            plan.requested,
            ThroughputSetting::Autoscale {
                max_throughput: 3000
            }
        );
    }

    #[test]
    fn test_autoscale_zero_uses_configured_default() {
        let plan = plan_throughput_update(&autoscale(0), 1000, 4000).expect("plan");
        assert_eq!(plan.baseline, 4000);
        assert_eq!(plan.requested.value(), 5000);
    }

    #[test]
    fn test_autoscale_floor() {
        let plan = plan_throughput_update(&autoscale(2000), -1500, 1000).expect("plan");
        assert_eq!(plan.requested.value(), MIN_AUTOSCALE_THROUGHPUT);
    }

    // Zero manual throughput is treated as uninitialized, never as a real setting
    #[test]
    fn test_manual_zero_treats_delta_as_target() {
        let plan = plan_throughput_update(&manual(Some(0)), 500, 1000).expect("plan");
        assert_eq!(plan.baseline, 500);
        assert_eq!(plan.delta, 0);
        assert_eq!(plan.requested, ThroughputSetting::Manual { throughput: 500 });
    }

    #[test]
    fn test_manual_adds_delta_and_clamps() {
        let plan = plan_throughput_update(&manual(Some(600)), 1000, 1000).expect("plan");
        assert_eq!(plan.requested.value(), 1600);

        let plan = plan_throughput_update(&manual(Some(600)), -1000, 1000).expect("plan");
        assert_eq!(plan.requested.value(), MIN_MANUAL_THROUGHPUT);

        let plan = plan_throughput_update(&manual(Some(0)), 100, 1000).expect("plan");
        assert_eq!(plan.requested.value(), MIN_MANUAL_THROUGHPUT);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let plan = plan_throughput_update(&autoscale(i32::MAX - 1), i64::MAX, 1000).expect("plan");
        assert_eq!(plan.requested.value(), i32::MAX);

        let plan = plan_throughput_update(&manual(Some(1000)), i64::MIN, 1000).expect("plan");
        assert_eq!(plan.requested.value(), MIN_MANUAL_THROUGHPUT);
    }

    #[test]
    fn test_neither_value_is_ambiguous() {
        assert_eq!(
            plan_throughput_update(&ThroughputSettings::default(), 1000, 1000),
            Err(AmbiguousThroughput)
        );
    }
}
