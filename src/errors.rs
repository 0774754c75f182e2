//! Runtime errors surfaced by the constraint solver.

use crate::dynamics::ParticleId;
use thiserror::Error;

/// An error raised by one of the correction phases.
///
/// These are reported to a [`RuntimeErrors`] sink rather than returned from
/// the phase functions: exceeding the iteration bound is never recoverable by
/// re-running the same phase, and a broken bond leaves the particle state
/// inconsistent, so there is nothing for a caller to handle locally.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstraintError {
    /// A rigid-bond partner could not be resolved to a local or ghost
    /// particle, i.e. the pair is not stored on this node or its neighbors.
    #[error("rigid bond broken between particles {first} and {second} (particles not stored on the same node)")]
    BrokenRigidBond {
        /// Identity of the locally stored endpoint.
        first: ParticleId,
        /// Identity of the unresolved partner.
        second: ParticleId,
    },
    /// The position corrector exhausted its iteration bound.
    #[error("position corrections failed to converge after {iterations} iterations")]
    PositionCorrectionsUnconverged {
        /// Iterations performed before giving up.
        iterations: usize,
    },
    /// The velocity corrector exhausted its iteration bound.
    #[error("velocity corrections failed to converge after {iterations} iterations")]
    VelocityCorrectionsUnconverged {
        /// Iterations performed before giving up.
        iterations: usize,
    },
}

/// A per-node sink collecting solver errors.
///
/// Every post is also emitted through `log::error!`. The embedding simulation
/// inspects the sink after each phase and decides whether to abort the run; a
/// [`ConstraintError::BrokenRigidBond`] must be treated as fatal.
#[derive(Clone, Debug, Default)]
pub struct RuntimeErrors {
    errors: Vec<ConstraintError>,
}

impl RuntimeErrors {
    /// An empty sink.
    pub fn new() -> Self {
        RuntimeErrors::default()
    }

    /// Posts an error.
    pub fn post(&mut self, error: ConstraintError) {
        log::error!("{}", error);
        self.errors.push(error);
    }

    /// The errors posted since the last [`RuntimeErrors::take`].
    pub fn errors(&self) -> &[ConstraintError] {
        &self.errors
    }

    /// Drains the sink.
    pub fn take(&mut self) -> Vec<ConstraintError> {
        std::mem::take(&mut self.errors)
    }

    /// True if nothing was posted.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}
