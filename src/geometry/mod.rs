//! Geometry of the simulation cell.

pub use self::periodic_box::PeriodicBox;

mod periodic_box;
