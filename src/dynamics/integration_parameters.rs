use crate::math::Real;

/// Parameters controlling the constrained part of the integration step.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegrationParameters {
    /// Upper bound on the fixed-point iterations of each correction phase
    /// (must be positive). Reaching it is reported as a non-convergence error.
    pub max_iterations: usize,
    /// The Verlet skin. A local particle whose cumulative displacement since
    /// the last neighbor-list rebuild exceeds half the skin raises the
    /// rebuild flag.
    pub skin: Real,
}

impl IntegrationParameters {
    /// Parameters with the given iteration bound and the default skin.
    pub fn with_max_iterations(max_iterations: usize) -> Self {
        IntegrationParameters {
            max_iterations,
            ..Default::default()
        }
    }
}

impl Default for IntegrationParameters {
    fn default() -> Self {
        IntegrationParameters {
            max_iterations: 1000,
            skin: 0.4,
        }
    }
}
