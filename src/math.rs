//! Type aliases for the scalar and algebraic types used by the solver.

/// The scalar type used throughout the crate.
pub type Real = f64;

/// The dimension of the simulation space.
pub const DIM: usize = 3;

/// The vector type.
pub type Vector = na::Vector3<Real>;

/// The point type.
pub type Point = na::Point3<Real>;
