use crate::dynamics::{BondedInteraction, BondedInteractionSet, ParticleId, ParticleSet};
use crate::geometry::PeriodicBox;
use crate::math::Real;

/// The current squared length of every rigid bond, seen from its locally
/// stored endpoint. Bonds whose partner cannot be resolved are skipped.
pub fn rigid_bond_lengths(
    particles: &ParticleSet,
    bonds: &BondedInteractionSet,
    cell_box: &PeriodicBox,
) -> Vec<(ParticleId, ParticleId, Real)> {
    let mut out = Vec::new();
    for p1 in particles.locals() {
        for bond in p1.bonds.iter(bonds) {
            if let BondedInteraction::RigidBond(_) = bond.interaction {
                let partner = bond.partner(0);
                if let Some(index) = particles.resolve(partner) {
                    let p2 = &particles[index];
                    let r = cell_box.minimum_image(&p1.position, &p2.position);
                    out.push((p1.id, p2.id, r.norm_squared()));
                }
            }
        }
    }
    out
}

/// Dumps the current rigid-bond squared lengths through `log::debug!`.
pub fn log_rigid_bond_lengths(
    particles: &ParticleSet,
    bonds: &BondedInteractionSet,
    cell_box: &PeriodicBox,
) {
    for (first, second, sq_length) in rigid_bond_lengths(particles, bonds, cell_box) {
        log::debug!("bond ({} {}): {}", first, second, sq_length);
    }
}
