use crate::comm::DomainComm;
use crate::counters::Counters;
use crate::dynamics::solver::CorrectionBuffer;
use crate::dynamics::{BondedInteractionSet, IntegrationParameters, ParticleSet};
use crate::errors::RuntimeErrors;
use crate::geometry::PeriodicBox;

#[cfg(feature = "bond-constraint")]
use crate::dynamics::{BondedInteraction, ParticleIndex};
#[cfg(feature = "bond-constraint")]
use crate::errors::ConstraintError;
#[cfg(feature = "bond-constraint")]
use crate::utils;

/// Outcome of one correction phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Convergence {
    /// Every rigid bond satisfied its tolerance on every node.
    Converged {
        /// Fixed-point iterations performed.
        iterations: usize,
    },
    /// The iteration bound was reached with at least one bond out of
    /// tolerance somewhere in the decomposition.
    Failed {
        /// Fixed-point iterations performed.
        iterations: usize,
    },
    /// A rigid-bond partner could not be resolved. The pass was abandoned
    /// mid-iteration and the particle state is inconsistent; the run must be
    /// treated as fatal.
    Broken,
}

impl Convergence {
    /// True if the phase converged.
    pub fn is_converged(self) -> bool {
        matches!(self, Convergence::Converged { .. })
    }
}

/// The distributed RATTLE solver.
///
/// Per MD time step, an embedding integrator calls, in order:
///
/// 1. [`RattleSolver::save_previous_positions`] — before its unconstrained
///    position update;
/// 2. [`RattleSolver::correct_positions`] — after the update, to put every
///    rigid pair back onto its target squared distance;
/// 3. its force computation;
/// 4. [`RattleSolver::correct_velocities`] — to remove the radial component
///    of every rigid pair's relative velocity.
///
/// The solver owns only scratch storage and can be reused across steps.
///
/// ```
/// use rattle3d::prelude::*;
///
/// let mut bonds = BondedInteractionSet::new();
/// let rigid = bonds.insert(BondedInteraction::RigidBond(RigidBond::new(1.0, 1.0e-6, 1.0e-6)));
///
/// let mut particles = ParticleSet::new();
/// particles.insert(
///     ParticleBuilder::new(ParticleId(0))
///         .position(Point::new(0.0, 0.0, 0.0))
///         .bond(rigid, &[ParticleId(1)])
///         .build(),
/// );
/// particles.insert(
///     ParticleBuilder::new(ParticleId(1))
///         .position(Point::new(1.0, 0.0, 0.0))
///         .build(),
/// );
///
/// let params = IntegrationParameters::default();
/// let cell_box = PeriodicBox::unbounded();
/// let mut comm = SerialComm::new();
/// let mut errors = RuntimeErrors::new();
/// let mut solver = RattleSolver::new();
///
/// solver.save_previous_positions(&mut particles);
/// // ... unconstrained integrator move ...
/// let outcome =
///     solver.correct_positions(&params, &cell_box, &mut particles, &bonds, &mut comm, &mut errors);
/// assert!(outcome.is_converged());
/// ```
pub struct RattleSolver {
    /// Performance counters of the two phases.
    pub counters: Counters,
    corrections: CorrectionBuffer,
    rebuild_verlet: bool,
}

impl Default for RattleSolver {
    fn default() -> Self {
        RattleSolver::new()
    }
}

impl RattleSolver {
    /// A solver with empty scratch storage.
    pub fn new() -> Self {
        RattleSolver {
            counters: Counters::new(false),
            corrections: CorrectionBuffer::default(),
            rebuild_verlet: false,
        }
    }

    /// True if the last converged position pass moved some particle, on any
    /// node, further than half the Verlet skin from its last-rebuild
    /// position.
    pub fn verlet_rebuild_required(&self) -> bool {
        self.rebuild_verlet
    }

    /// Records the current position of every local and ghost particle as its
    /// previous-step position. Call once per time step, before the
    /// unconstrained integrator move; ghosts are assumed to mirror their
    /// owners at that point.
    #[cfg(feature = "bond-constraint")]
    pub fn save_previous_positions(&self, particles: &mut ParticleSet) {
        for particle in particles.particles_mut() {
            particle.prev_position = particle.position;
        }
    }

    /// Records the current position of every local and ghost particle as its
    /// previous-step position (no-op without the `bond-constraint` feature).
    #[cfg(not(feature = "bond-constraint"))]
    pub fn save_previous_positions(&self, _particles: &mut ParticleSet) {}

    /// Iteratively corrects positions until every rigid bond's squared
    /// length is within its relative tolerance of the target, on every node.
    ///
    /// Each applied position delta is also added to the particle's velocity,
    /// so the velocity leaving this phase carries the net constraint
    /// displacement. On convergence the Verlet skin criterion is evaluated on
    /// the final positions and aggregated across nodes (see
    /// [`RattleSolver::verlet_rebuild_required`]).
    ///
    /// Non-convergence and broken bonds are posted to `errors`; see
    /// [`Convergence`] for what the caller must do with each outcome.
    #[cfg(feature = "bond-constraint")]
    pub fn correct_positions(
        &mut self,
        params: &IntegrationParameters,
        cell_box: &PeriodicBox,
        particles: &mut ParticleSet,
        bonds: &BondedInteractionSet,
        comm: &mut dyn DomainComm,
        errors: &mut RuntimeErrors,
    ) -> Convergence {
        if self.counters.enabled {
            self.counters.position_correction.reset();
            self.counters.position_correction.time.resume();
        }
        let outcome = self.correct_positions_loop(params, cell_box, particles, bonds, comm, errors);
        if let Convergence::Converged { iterations } | Convergence::Failed { iterations } = outcome
        {
            self.counters.position_correction.iterations = iterations;
        }
        if self.counters.enabled {
            self.counters.position_correction.time.pause();
        }
        outcome
    }

    /// Position-correction entry point (no-op without the `bond-constraint`
    /// feature).
    #[cfg(not(feature = "bond-constraint"))]
    pub fn correct_positions(
        &mut self,
        _params: &IntegrationParameters,
        _cell_box: &PeriodicBox,
        _particles: &mut ParticleSet,
        _bonds: &BondedInteractionSet,
        _comm: &mut dyn DomainComm,
        _errors: &mut RuntimeErrors,
    ) -> Convergence {
        Convergence::Converged { iterations: 0 }
    }

    /// Iteratively corrects velocities until every rigid bond's radial
    /// relative velocity is within its absolute tolerance, on every node.
    /// Positions (and forces) are left untouched.
    #[cfg(feature = "bond-constraint")]
    pub fn correct_velocities(
        &mut self,
        params: &IntegrationParameters,
        cell_box: &PeriodicBox,
        particles: &mut ParticleSet,
        bonds: &BondedInteractionSet,
        comm: &mut dyn DomainComm,
        errors: &mut RuntimeErrors,
    ) -> Convergence {
        if self.counters.enabled {
            self.counters.velocity_correction.reset();
            self.counters.velocity_correction.time.resume();
        }
        let outcome =
            self.correct_velocities_loop(params, cell_box, particles, bonds, comm, errors);
        if let Convergence::Converged { iterations } | Convergence::Failed { iterations } = outcome
        {
            self.counters.velocity_correction.iterations = iterations;
        }
        if self.counters.enabled {
            self.counters.velocity_correction.time.pause();
        }
        outcome
    }

    /// Velocity-correction entry point (no-op without the `bond-constraint`
    /// feature).
    #[cfg(not(feature = "bond-constraint"))]
    pub fn correct_velocities(
        &mut self,
        _params: &IntegrationParameters,
        _cell_box: &PeriodicBox,
        _particles: &mut ParticleSet,
        _bonds: &BondedInteractionSet,
        _comm: &mut dyn DomainComm,
        _errors: &mut RuntimeErrors,
    ) -> Convergence {
        Convergence::Converged { iterations: 0 }
    }
}

#[cfg(feature = "bond-constraint")]
impl RattleSolver {
    fn correct_positions_loop(
        &mut self,
        params: &IntegrationParameters,
        cell_box: &PeriodicBox,
        particles: &mut ParticleSet,
        bonds: &BondedInteractionSet,
        comm: &mut dyn DomainComm,
        errors: &mut RuntimeErrors,
    ) -> Convergence {
        self.corrections.resize(particles);
        self.rebuild_verlet = false;

        let mut iterations = 0;
        let mut repeat = true;
        while repeat && iterations < params.max_iterations {
            self.corrections.reset();
            if !self.accumulate_position_corrections(cell_box, particles, bonds, errors) {
                return Convergence::Broken;
            }
            comm.collect_ghost_corrections(particles, &mut self.corrections);

            for (particle, correction) in particles
                .locals_mut()
                .zip(self.corrections.local_entries().iter())
            {
                particle.position += *correction;
                particle.velocity += *correction;
            }
            comm.update_ghost_particles(particles);

            let repeat_local = match self.position_residuals_exceed(cell_box, particles, bonds, errors)
            {
                Some(flag) => flag,
                None => return Convergence::Broken,
            };
            iterations += 1;
            repeat = comm.reduce_or(repeat_local);
            if !repeat {
                let breached = self.verlet_skin_breached(params, particles);
                self.rebuild_verlet = comm.announce_verlet_rebuild(breached);
            }
        }

        if repeat {
            errors.post(ConstraintError::PositionCorrectionsUnconverged { iterations });
            Convergence::Failed { iterations }
        } else {
            Convergence::Converged { iterations }
        }
    }

    fn correct_velocities_loop(
        &mut self,
        params: &IntegrationParameters,
        cell_box: &PeriodicBox,
        particles: &mut ParticleSet,
        bonds: &BondedInteractionSet,
        comm: &mut dyn DomainComm,
        errors: &mut RuntimeErrors,
    ) -> Convergence {
        self.corrections.resize(particles);

        let mut iterations = 0;
        let mut repeat = true;
        while repeat && iterations < params.max_iterations {
            self.corrections.reset();
            if !self.accumulate_velocity_corrections(cell_box, particles, bonds, errors) {
                return Convergence::Broken;
            }
            comm.collect_ghost_corrections(particles, &mut self.corrections);

            for (particle, correction) in particles
                .locals_mut()
                .zip(self.corrections.local_entries().iter())
            {
                particle.velocity += *correction;
            }
            comm.update_ghost_particles(particles);

            let repeat_local = match self.velocity_residuals_exceed(cell_box, particles, bonds, errors)
            {
                Some(flag) => flag,
                None => return Convergence::Broken,
            };
            iterations += 1;
            repeat = comm.reduce_or(repeat_local);
        }

        if repeat {
            errors.post(ConstraintError::VelocityCorrectionsUnconverged { iterations });
            Convergence::Failed { iterations }
        } else {
            Convergence::Converged { iterations }
        }
    }

    /// First-order position multiplier of each rigid bond, accumulated on
    /// both endpoints. Linearizing `|r|² = d²` around the previous-step
    /// separation gives a mass-weighted correction along that separation.
    fn accumulate_position_corrections(
        &mut self,
        cell_box: &PeriodicBox,
        particles: &ParticleSet,
        bonds: &BondedInteractionSet,
        errors: &mut RuntimeErrors,
    ) -> bool {
        for i in 0..particles.local_count() {
            let p1 = particles.local(i);
            for bond in p1.bonds.iter(bonds) {
                let rigid = match bond.interaction {
                    BondedInteraction::RigidBond(rigid) => rigid,
                    _ => continue,
                };
                let partner = bond.partner(0);
                let index2 = match particles.resolve(partner) {
                    Some(index) => index,
                    None => {
                        errors.post(ConstraintError::BrokenRigidBond {
                            first: p1.id,
                            second: partner,
                        });
                        return false;
                    }
                };
                let p2 = &particles[index2];

                let r_prev = cell_box.minimum_image(&p1.prev_position, &p2.prev_position);
                let r = cell_box.minimum_image(&p1.position, &p2.position);
                let g = 0.5 * (rigid.sq_length - r.norm_squared()) / r_prev.dot(&r)
                    * utils::inv(p1.mass() + p2.mass());
                let correction = r_prev * g;

                self.corrections
                    .add(ParticleIndex::Local(i), correction * p2.mass());
                self.corrections.add(index2, -correction * p1.mass());
            }
        }
        true
    }

    /// Velocity multiplier of each rigid bond: the radial component of the
    /// relative velocity, split over the endpoints by mass.
    fn accumulate_velocity_corrections(
        &mut self,
        cell_box: &PeriodicBox,
        particles: &ParticleSet,
        bonds: &BondedInteractionSet,
        errors: &mut RuntimeErrors,
    ) -> bool {
        for i in 0..particles.local_count() {
            let p1 = particles.local(i);
            for bond in p1.bonds.iter(bonds) {
                let rigid = match bond.interaction {
                    BondedInteraction::RigidBond(rigid) => rigid,
                    _ => continue,
                };
                let partner = bond.partner(0);
                let index2 = match particles.resolve(partner) {
                    Some(index) => index,
                    None => {
                        errors.post(ConstraintError::BrokenRigidBond {
                            first: p1.id,
                            second: partner,
                        });
                        return false;
                    }
                };
                let p2 = &particles[index2];

                let v = p1.velocity - p2.velocity;
                let r = cell_box.minimum_image(&p1.position, &p2.position);
                let k = v.dot(&r) / rigid.sq_length * utils::inv(p1.mass() + p2.mass());
                let correction = r * k;

                self.corrections
                    .add(ParticleIndex::Local(i), -correction * p2.mass());
                self.corrections.add(index2, correction * p1.mass());
            }
        }
        true
    }

    fn position_residuals_exceed(
        &self,
        cell_box: &PeriodicBox,
        particles: &ParticleSet,
        bonds: &BondedInteractionSet,
        errors: &mut RuntimeErrors,
    ) -> Option<bool> {
        let mut repeat = false;
        for p1 in particles.locals() {
            for bond in p1.bonds.iter(bonds) {
                let rigid = match bond.interaction {
                    BondedInteraction::RigidBond(rigid) => rigid,
                    _ => continue,
                };
                let partner = bond.partner(0);
                let index2 = match particles.resolve(partner) {
                    Some(index) => index,
                    None => {
                        errors.post(ConstraintError::BrokenRigidBond {
                            first: p1.id,
                            second: partner,
                        });
                        return None;
                    }
                };
                let p2 = &particles[index2];

                let r = cell_box.minimum_image(&p1.position, &p2.position);
                let residual =
                    (0.5 * (rigid.sq_length - r.norm_squared()) / rigid.sq_length).abs();
                repeat = repeat || residual > rigid.pos_tolerance;
            }
        }
        Some(repeat)
    }

    fn velocity_residuals_exceed(
        &self,
        cell_box: &PeriodicBox,
        particles: &ParticleSet,
        bonds: &BondedInteractionSet,
        errors: &mut RuntimeErrors,
    ) -> Option<bool> {
        let mut repeat = false;
        for p1 in particles.locals() {
            for bond in p1.bonds.iter(bonds) {
                let rigid = match bond.interaction {
                    BondedInteraction::RigidBond(rigid) => rigid,
                    _ => continue,
                };
                let partner = bond.partner(0);
                let index2 = match particles.resolve(partner) {
                    Some(index) => index,
                    None => {
                        errors.post(ConstraintError::BrokenRigidBond {
                            first: p1.id,
                            second: partner,
                        });
                        return None;
                    }
                };
                let p2 = &particles[index2];

                let r = cell_box.minimum_image(&p1.position, &p2.position);
                let v = p1.velocity - p2.velocity;
                let residual = r.dot(&v).abs();
                repeat = repeat || residual > rigid.vel_tolerance;
            }
        }
        Some(repeat)
    }

    fn verlet_skin_breached(&self, params: &IntegrationParameters, particles: &ParticleSet) -> bool {
        let half_skin_sq = utils::sq(params.skin * 0.5);
        particles
            .locals()
            .any(|p| na::distance_squared(&p.position, &p.verlet_position) > half_skin_sq)
    }
}
