//! Container throughput: requested setting and the service read model.

use std::fmt;

/// Throughput to apply to a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThroughputSetting {
    Autoscale { max_throughput: i32 },
    Manual { throughput: i32 },
}

impl ThroughputSetting {
    #[must_use]
    pub fn value(self) -> i32 {
        match self {
            ThroughputSetting::Autoscale { max_throughput } => max_throughput,
            ThroughputSetting::Manual { throughput } => throughput,
        }
    }

    #[must_use]
    pub fn mode(self) -> &'static str {
        match self {
            ThroughputSetting::Autoscale { .. } => "autoscale",
            ThroughputSetting::Manual { .. } => "manual",
        }
    }
}

impl fmt::Display for ThroughputSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThroughputSetting::Autoscale { max_throughput } => {
                write!(f, "autoscale max {max_throughput} RU/s")
            }
            ThroughputSetting::Manual { throughput } => write!(f, "manual {throughput} RU/s"),
        }
    }
}

/// Throughput settings as read from the service
///
/// Both raw fields are kept so that a response with neither value can be told apart
/// from a zero value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThroughputSettings {
    pub autoscale_max_throughput: Option<i32>,
    pub manual_throughput: Option<i32>,
    /// Lowest value the service currently accepts, when reported
    pub minimum_throughput: Option<i32>,
}

impl ThroughputSettings {
    /// Effective setting; autoscale wins when both values are present
    #[must_use]
    pub fn current(&self) -> Option<ThroughputSetting> {
        match (self.autoscale_max_throughput, self.manual_throughput) {
            (Some(max_throughput), _) => Some(ThroughputSetting::Autoscale { max_throughput }),
            (None, Some(throughput)) => Some(ThroughputSetting::Manual { throughput }),
            (None, None) => None,
        }
    }
}

impl fmt::Display for ThroughputSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current() {
            Some(setting) => write!(f, "{setting}")?,
            None => write!(f, "no throughput values")?,
        }
        if let Some(minimum) = self.minimum_throughput {
            write!(f, " (minimum {minimum} RU/s)")?;
        }
        Ok(())
    }
}
