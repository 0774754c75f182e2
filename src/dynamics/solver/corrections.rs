use crate::dynamics::{ParticleId, ParticleIndex, ParticleSet};
use crate::math::Vector;
use num::Zero;

/// Per-particle correction vectors for one solver iteration.
///
/// The buffer is shaped like the particle population, one lane for locals and
/// one for ghosts. The position phase stores position deltas here and the
/// velocity phase velocity deltas; the halo collect moves ghost entries back
/// to the node that owns the particle. Keeping the corrections out of the
/// particle storage leaves the force slot to the integrator at all times.
#[derive(Clone, Debug, Default)]
pub struct CorrectionBuffer {
    local: Vec<Vector>,
    ghost: Vec<Vector>,
}

impl CorrectionBuffer {
    pub(crate) fn resize(&mut self, particles: &ParticleSet) {
        self.local.resize(particles.local_count(), Vector::zeros());
        self.ghost.resize(particles.ghost_count(), Vector::zeros());
    }

    pub(crate) fn reset(&mut self) {
        for c in self.local.iter_mut().chain(self.ghost.iter_mut()) {
            c.set_zero();
        }
    }

    /// Adds `value` to the correction of the particle in slot `index`.
    pub fn add(&mut self, index: ParticleIndex, value: Vector) {
        match index {
            ParticleIndex::Local(i) => self.local[i] += value,
            ParticleIndex::Ghost(i) => self.ghost[i] += value,
        }
    }

    /// The corrections of the locally-owned particles, in slot order.
    pub fn local_entries(&self) -> &[Vector] {
        &self.local
    }

    /// Drains the ghost lane: returns `(owner identity, accumulated
    /// correction)` for every ghost mirror and zeroes the ghost copies. This
    /// is the sending side of the halo collect.
    pub fn take_ghost_corrections(&mut self, particles: &ParticleSet) -> Vec<(ParticleId, Vector)> {
        let mut out = Vec::with_capacity(self.ghost.len());
        for (particle, c) in particles.ghosts().zip(self.ghost.iter_mut()) {
            out.push((particle.id, *c));
            c.set_zero();
        }
        out
    }
}
