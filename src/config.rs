//! Boundary configuration.

use clap::ValueEnum;

/// What happens to allocations still outstanding when a boundary closes.
///
/// Either way the leak is reported. Outstanding memory is only ever freed
/// through the native releaser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LeakPolicy {
    /// Report, then release each allocation through the native releaser.
    #[default]
    Reclaim,
    /// Report only. The allocations are left to the process.
    Report,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryConfig {
    /// First value of the native counter.
    pub counter_start: i32,
    pub leak_policy: LeakPolicy,
}

impl BoundaryConfig {
    pub fn with_counter_start(mut self, start: i32) -> Self {
        self.counter_start = start;
        self
    }

    pub fn with_leak_policy(mut self, policy: LeakPolicy) -> Self {
        self.leak_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BoundaryConfig::default();
        assert_eq!(config.counter_start, 0);
        assert_eq!(config.leak_policy, LeakPolicy::Reclaim);
    }

    #[test]
    fn test_builder() {
        let config = BoundaryConfig::default()
            .with_counter_start(10)
            .with_leak_policy(LeakPolicy::Report);
        assert_eq!(config.counter_start, 10);
        assert_eq!(config.leak_policy, LeakPolicy::Report);
    }
}
