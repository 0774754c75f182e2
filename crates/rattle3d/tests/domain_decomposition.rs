//! The same chain solved on one node and on a two-node mesh must agree to
//! within the constraint tolerances.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rattle3d::prelude::*;

const P_TOL: Real = 1.0e-6;
const V_TOL: Real = 1.0e-6;
const CHAIN: u32 = 4;

fn base_position(id: u32) -> Point {
    Point::new(id as Real, 0.0, 0.0)
}

/// Deterministic per-particle displacement and velocity, as if an
/// unconstrained integrator move had just run.
fn perturbations() -> Vec<(Vector, Vector)> {
    let mut rng = Pcg64::seed_from_u64(42);
    (0..CHAIN)
        .map(|_| {
            let d = Vector::new(
                rng.gen_range(-0.08..0.08),
                rng.gen_range(-0.08..0.08),
                rng.gen_range(-0.08..0.08),
            );
            let v = Vector::new(
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
            );
            (d, v)
        })
        .collect()
}

fn chain_particle(id: u32, rigid: InteractionId) -> Particle {
    let mut builder = ParticleBuilder::new(ParticleId(id)).position(base_position(id));
    if id + 1 < CHAIN {
        builder = builder.bond(rigid, &[ParticleId(id + 1)]);
    }
    builder.build()
}

fn registry() -> (BondedInteractionSet, InteractionId) {
    let mut bonds = BondedInteractionSet::new();
    let rigid = bonds.insert(BondedInteraction::RigidBond(RigidBond::new(
        1.0, P_TOL, V_TOL,
    )));
    (bonds, rigid)
}

/// Snapshot, perturb, and run both correction phases; returns the final
/// state of the locally-owned particles.
fn solve_node(
    mut particles: ParticleSet,
    bonds: &BondedInteractionSet,
    comm: &mut dyn DomainComm,
    moves: &[(Vector, Vector)],
) -> Vec<(ParticleId, Point, Vector)> {
    let params = IntegrationParameters::default();
    let cell_box = PeriodicBox::unbounded();
    let mut solver = RattleSolver::new();
    let mut errors = RuntimeErrors::new();

    solver.save_previous_positions(&mut particles);
    for (id, (displacement, velocity)) in moves.iter().enumerate() {
        if let Some(index) = particles.resolve(ParticleId(id as u32)) {
            let particle = &mut particles[index];
            particle.position += *displacement;
            particle.velocity = *velocity;
        }
    }

    let positions =
        solver.correct_positions(&params, &cell_box, &mut particles, bonds, comm, &mut errors);
    assert!(positions.is_converged());
    let velocities =
        solver.correct_velocities(&params, &cell_box, &mut particles, bonds, comm, &mut errors);
    assert!(velocities.is_converged());
    assert!(errors.is_empty());

    particles
        .locals()
        .map(|p| (p.id, p.position, p.velocity))
        .collect()
}

#[test]
fn two_node_run_matches_the_single_node_run() {
    let moves = perturbations();
    let (bonds, rigid) = registry();

    // Single node: the whole chain is local.
    let mut all_local = ParticleSet::new();
    for id in 0..CHAIN {
        all_local.insert(chain_particle(id, rigid));
    }
    let mut serial = SerialComm::new();
    let mut reference = solve_node(all_local, &bonds, &mut serial, &moves);
    reference.sort_by_key(|(id, _, _)| *id);

    // Two nodes: the bond between particles 1 and 2 straddles the cut, so
    // node 0 mirrors particle 2.
    let mut node0 = ParticleSet::new();
    node0.insert(chain_particle(0, rigid));
    node0.insert(chain_particle(1, rigid));
    node0.insert_ghost(chain_particle(2, rigid));

    let mut node1 = ParticleSet::new();
    node1.insert(chain_particle(2, rigid));
    node1.insert(chain_particle(3, rigid));

    let mut comms = ChannelComm::mesh(2);
    let mut comm1 = comms.pop().unwrap();
    let mut comm0 = comms.pop().unwrap();

    let bonds0 = bonds.clone();
    let bonds1 = bonds.clone();
    let moves0 = moves.clone();
    let moves1 = moves.clone();

    let mut distributed = crossbeam::scope(|scope| {
        let h0 = scope.spawn(move |_| solve_node(node0, &bonds0, &mut comm0, &moves0));
        let h1 = scope.spawn(move |_| solve_node(node1, &bonds1, &mut comm1, &moves1));
        let mut out = h0.join().unwrap();
        out.extend(h1.join().unwrap());
        out
    })
    .unwrap();
    distributed.sort_by_key(|(id, _, _)| *id);

    assert_eq!(reference.len(), distributed.len());
    for ((id_a, p_a, v_a), (id_b, p_b, v_b)) in reference.iter().zip(distributed.iter()) {
        assert_eq!(id_a, id_b);
        assert!(
            (p_a - p_b).norm() <= 1.0e-5,
            "position of {} differs: {:?} vs {:?}",
            id_a,
            p_a,
            p_b
        );
        assert!(
            (v_a - v_b).norm() <= 1.0e-5,
            "velocity of {} differs: {:?} vs {:?}",
            id_a,
            v_a,
            v_b
        );
    }

    // Both runs ended on the constraint surface.
    let cell_box = PeriodicBox::unbounded();
    for window in reference.windows(2) {
        let (_, p_a, _) = window[0];
        let (_, p_b, _) = window[1];
        let sq = cell_box.distance_squared(&p_a, &p_b);
        assert!((0.5 * (1.0 - sq)).abs() <= P_TOL);
    }
}
