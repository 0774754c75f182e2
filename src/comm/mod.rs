//! Collective communication between domain-decomposition nodes.
//!
//! The solver never talks to a transport directly; it drives the
//! [`DomainComm`] capabilities. That keeps the iteration loops testable with
//! the trivial single-node implementation and lets an embedding plug in
//! whatever message-passing layer it runs on.

pub use self::channel_comm::ChannelComm;

mod channel_comm;

use crate::dynamics::solver::CorrectionBuffer;
use crate::dynamics::ParticleSet;

/// Collective operations tying one node to the rest of the decomposition.
///
/// Every method is a collective call: all nodes must enter the same method
/// the same number of times per phase, in the same order, or the
/// decomposition deadlocks or desynchronizes — behavior is undefined either
/// way. The sequencing contract the solver upholds (and any other caller
/// must too):
///
/// - every local write into the correction buffer, ghost slots included, is
///   followed by [`DomainComm::collect_ghost_corrections`] before owner slots
///   are read again;
/// - every local write to particle positions or velocities is followed by
///   [`DomainComm::update_ghost_particles`] before ghost state is read again.
pub trait DomainComm {
    /// Sums the corrections accumulated on ghost mirrors into the nodes that
    /// own the particles, and zeroes the ghost copies.
    fn collect_ghost_corrections(
        &mut self,
        particles: &ParticleSet,
        corrections: &mut CorrectionBuffer,
    );

    /// Refreshes every ghost mirror with its owner's current position *and*
    /// velocity.
    ///
    /// The velocity payload is part of the contract: the velocity-correction
    /// phase reads ghost velocities in both its accumulation and its
    /// convergence scan, so mirroring positions alone would let a bond whose
    /// partner is a ghost converge against stale data.
    fn update_ghost_particles(&mut self, particles: &mut ParticleSet);

    /// Logical-OR reduction of `flag` across all nodes; every node receives
    /// the reduced value.
    fn reduce_or(&mut self, flag: bool) -> bool;

    /// Aggregates the per-node Verlet rebuild flags once a phase has
    /// converged.
    fn announce_verlet_rebuild(&mut self, flag: bool) -> bool {
        self.reduce_or(flag)
    }
}

/// The single-node communicator: the trivial implementation of the protocol.
///
/// With the whole population on one node there are no ghosts to reconcile
/// and the reduction of one flag is the flag itself.
#[derive(Copy, Clone, Debug, Default)]
pub struct SerialComm;

impl SerialComm {
    /// The single-node communicator.
    pub fn new() -> Self {
        SerialComm
    }
}

impl DomainComm for SerialComm {
    fn collect_ghost_corrections(
        &mut self,
        _particles: &ParticleSet,
        _corrections: &mut CorrectionBuffer,
    ) {
    }

    fn update_ghost_particles(&mut self, _particles: &mut ParticleSet) {}

    fn reduce_or(&mut self, flag: bool) -> bool {
        flag
    }
}
