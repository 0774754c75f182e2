/*!
# rattle3d

**rattle3d** enforces rigid pair-distance constraints on a particle population
during a molecular-dynamics time step, using the iterative RATTLE scheme:

- a **position-correction** phase that drives every constrained pair back onto
  its target squared distance after the unconstrained integrator move, and
- a **velocity-correction** phase that removes the radial component of every
  constrained pair's relative velocity.

Both phases are distributed: the particle population may be split across
domain-decomposition nodes, with bonds that straddle a partition processed
through ghost mirrors. The collective primitives a node needs (halo
correction collect, ghost refresh, global OR-reduction) are captured by the
[`comm::DomainComm`] trait, so the same solver runs against a single-process
stand-in ([`comm::SerialComm`]), the in-process channel mesh
([`comm::ChannelComm`]), or any message-passing transport an embedding
provides.

## Cargo features

- `mass` (enabled by default) — per-particle inertial masses. Without it
  every particle weighs one unit.
- `bond-constraint` (enabled by default) — the solver itself; without it all
  entry points compile to no-ops.
- `serde-serialize` — serde derives on the particle, bond and parameter types.
*/

#![deny(bare_trait_objects)]
#![warn(missing_docs)]

extern crate nalgebra as na;
extern crate num_traits as num;
#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;

pub mod comm;
pub mod counters;
pub mod dynamics;
pub mod errors;
pub mod geometry;
pub mod math;
pub mod prelude;
mod utils;
