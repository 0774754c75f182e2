//! Re-exports the most commonly used types of this crate.

pub use crate::comm::{ChannelComm, DomainComm, SerialComm};
pub use crate::counters::Counters;
pub use crate::dynamics::solver::{
    log_rigid_bond_lengths, rigid_bond_lengths, Convergence, CorrectionBuffer, RattleSolver,
};
pub use crate::dynamics::{
    AngleHarmonicBond, Bond, BondList, BondedInteraction, BondedInteractionSet, HarmonicBond,
    IntegrationParameters, InteractionId, Particle, ParticleBuilder, ParticleId, ParticleIndex,
    ParticleSet, RigidBond,
};
pub use crate::errors::{ConstraintError, RuntimeErrors};
pub use crate::geometry::PeriodicBox;
pub use crate::math::{Point, Real, Vector};
