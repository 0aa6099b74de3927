//! Layout configuration for a scroll coordinator.

// ---------------------------------------------------------------------------
// EstimatePolicy
// ---------------------------------------------------------------------------

/// How the length of an unrealized block is estimated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EstimatePolicy {
    /// The length of the most recently measured block.
    #[default]
    LastMeasured,
    /// The average length of the currently realized blocks.
    RealizedAverage,
}

// ---------------------------------------------------------------------------
// LayoutConfig
// ---------------------------------------------------------------------------

/// Tuning knobs for virtualization and layout passes.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Extra blocks realized past the end of the viewport.
    pub overscan: usize,
    /// Estimate for blocks that have never been measured.
    pub estimate: EstimatePolicy,
    /// Upper bound on measure/realize rounds in one layout pass.
    pub max_layout_iterations: usize,
    /// Offsets closer than this are considered equal.
    pub tolerance: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            overscan: 0,
            estimate: EstimatePolicy::LastMeasured,
            max_layout_iterations: 8,
            tolerance: 1e-6,
        }
    }
}

impl LayoutConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overscan block count (builder).
    pub fn with_overscan(mut self, blocks: usize) -> Self {
        self.overscan = blocks;
        self
    }

    /// Set the estimate policy (builder).
    pub fn with_estimate(mut self, policy: EstimatePolicy) -> Self {
        self.estimate = policy;
        self
    }

    /// Set the iteration bound (builder). At least one round always runs.
    pub fn with_max_layout_iterations(mut self, iterations: usize) -> Self {
        self.max_layout_iterations = iterations.max(1);
        self
    }

    /// Set the comparison tolerance (builder).
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.abs();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LayoutConfig::new();
        assert_eq!(config.overscan, 0);
        assert_eq!(config.estimate, EstimatePolicy::LastMeasured);
        assert_eq!(config.max_layout_iterations, 8);
    }

    #[test]
    fn builder_chain() {
        let config = LayoutConfig::new()
            .with_overscan(2)
            .with_estimate(EstimatePolicy::RealizedAverage)
            .with_max_layout_iterations(0)
            .with_tolerance(-0.5);
        assert_eq!(config.overscan, 2);
        assert_eq!(config.estimate, EstimatePolicy::RealizedAverage);
        assert_eq!(config.max_layout_iterations, 1);
        assert_eq!(config.tolerance, 0.5);
    }
}
