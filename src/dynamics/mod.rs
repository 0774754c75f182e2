//! The particle population, bonded-interaction registry and constraint solver.

pub use self::bond::{
    AngleHarmonicBond, Bond, BondIter, BondList, BondedInteraction, BondedInteractionSet,
    HarmonicBond, InteractionId, RigidBond,
};
pub use self::integration_parameters::IntegrationParameters;
pub use self::particle::{Particle, ParticleBuilder, ParticleId};
pub use self::particle_set::{ParticleIndex, ParticleSet};

pub mod solver;

mod bond;
mod integration_parameters;
mod particle;
mod particle_set;
