use crate::dynamics::{BondList, InteractionId};
use crate::math::{Point, Real, Vector};

/// The stable identity of a particle, unique across the whole decomposition.
///
/// Identities are what bond lists reference and what the halo exchanges route
/// by; they never change when a particle migrates between nodes.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u32);

impl std::fmt::Display for ParticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point particle together with the state slots the constraint solver reads
/// and writes.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Stable identity of the particle.
    pub id: ParticleId,
    /// Current position.
    pub position: Point,
    /// Position at the previous time step, recorded by
    /// [`RattleSolver::save_previous_positions`](crate::dynamics::solver::RattleSolver::save_previous_positions)
    /// before the unconstrained integrator move.
    pub prev_position: Point,
    /// Current velocity.
    pub velocity: Vector,
    /// Force accumulated by the integrator. The correction phases keep their
    /// scratch elsewhere and never touch this slot.
    pub force: Vector,
    /// Position at the last Verlet-list rebuild, read by the skin check.
    pub verlet_position: Point,
    /// Inertial mass (positive).
    #[cfg(feature = "mass")]
    pub mass: Real,
    /// Packed bonded-interaction list of this particle.
    pub bonds: BondList,
}

impl Particle {
    /// A particle at rest at `position`, with unit mass and no bonds.
    pub fn new(id: ParticleId, position: Point) -> Self {
        Particle {
            id,
            position,
            prev_position: position,
            velocity: Vector::zeros(),
            force: Vector::zeros(),
            verlet_position: position,
            #[cfg(feature = "mass")]
            mass: 1.0,
            bonds: BondList::new(),
        }
    }

    /// The inertial mass of this particle.
    #[cfg(feature = "mass")]
    #[inline]
    pub fn mass(&self) -> Real {
        self.mass
    }

    /// The inertial mass of this particle (uniformly one unit).
    #[cfg(not(feature = "mass"))]
    #[inline]
    pub fn mass(&self) -> Real {
        1.0
    }
}

/// Builds particles with a fluent API.
#[derive(Clone, Debug)]
pub struct ParticleBuilder(Particle);

impl ParticleBuilder {
    /// Starts building a particle with the given identity, at the origin.
    pub fn new(id: ParticleId) -> Self {
        ParticleBuilder(Particle::new(id, Point::origin()))
    }

    /// Sets the position. The previous-step and Verlet-rebuild positions are
    /// set to the same point, i.e. the particle starts on its constraint
    /// surface with no pending displacement.
    #[must_use]
    pub fn position(mut self, position: Point) -> Self {
        self.0.position = position;
        self.0.prev_position = position;
        self.0.verlet_position = position;
        self
    }

    /// Sets the velocity.
    #[must_use]
    pub fn velocity(mut self, velocity: Vector) -> Self {
        self.0.velocity = velocity;
        self
    }

    /// Sets the inertial mass.
    #[cfg(feature = "mass")]
    #[must_use]
    pub fn mass(mut self, mass: Real) -> Self {
        self.0.mass = mass;
        self
    }

    /// Appends a bond to the particle's bond list. `partners` must match the
    /// arity of the interaction.
    #[must_use]
    pub fn bond(mut self, interaction: InteractionId, partners: &[ParticleId]) -> Self {
        self.0.bonds.push(interaction, partners);
        self
    }

    /// Builds the particle.
    pub fn build(self) -> Particle {
        self.0
    }
}
