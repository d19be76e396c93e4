//! # Gas Limits
//!
//! Gas limit selection for state-changing calls.
//!
//! Steps may pin an explicit limit; otherwise the node's estimate is padded
//! by a percentage buffer.

use serde::{Deserialize, Serialize};

/// Gas estimator with configurable buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasEstimator {
    /// Buffer percentage to add to gas estimates (e.g., 20 for 20%).
    buffer_percent: u64,
}

impl GasEstimator {
    /// Default gas buffer percentage.
    pub const DEFAULT_BUFFER_PERCENT: u64 = 20;

    /// Creates a new gas estimator with the specified buffer.
    #[must_use]
    pub const fn new(buffer_percent: u64) -> Self {
        Self { buffer_percent }
    }

    /// Returns the buffer percentage.
    #[must_use]
    pub const fn buffer_percent(&self) -> u64 {
        self.buffer_percent
    }

    /// Applies the buffer to a gas estimate.
    #[must_use]
    pub const fn apply_buffer(&self, estimate: u64) -> u64 {
        estimate.saturating_add(estimate.saturating_mul(self.buffer_percent) / 100)
    }
}

impl Default for GasEstimator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BUFFER_PERCENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gas_estimator_apply_buffer() {
        let estimator = GasEstimator::new(20);
        assert_eq!(estimator.apply_buffer(100_000), 120_000);
        assert_eq!(estimator.apply_buffer(200_000), 240_000);
    }

    #[test]
    fn gas_estimator_default_buffer() {
        assert_eq!(GasEstimator::default().buffer_percent(), 20);
    }

    #[test]
    fn buffer_saturates() {
        assert_eq!(GasEstimator::new(50).apply_buffer(u64::MAX), u64::MAX);
    }
}
