//! The distributed RATTLE constraint solver.

pub use self::corrections::CorrectionBuffer;
pub use self::diagnostics::{log_rigid_bond_lengths, rigid_bond_lengths};
pub use self::rattle_solver::{Convergence, RattleSolver};

mod corrections;
mod diagnostics;
mod rattle_solver;
