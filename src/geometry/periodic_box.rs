use crate::math::{Point, Real, Vector, DIM};

/// An axis-aligned simulation cell, periodic along any subset of its axes.
///
/// The cell provides the minimum-image convention: the displacement between
/// two particles is taken modulo the cell edges along every periodic axis, so
/// a bond straddling the boundary sees its short image rather than the long
/// way around.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PeriodicBox {
    edges: Vector,
    periodic: [bool; DIM],
}

impl PeriodicBox {
    /// A cell with the given edge lengths, periodic along all three axes.
    pub fn new(edges: Vector) -> Self {
        debug_assert!(edges.iter().all(|l| *l > 0.0));
        PeriodicBox {
            edges,
            periodic: [true; DIM],
        }
    }

    /// A cell periodic only along the selected axes.
    pub fn with_periodicity(edges: Vector, periodic: [bool; DIM]) -> Self {
        PeriodicBox { edges, periodic }
    }

    /// An open cell: the minimum image is the plain difference.
    pub fn unbounded() -> Self {
        PeriodicBox {
            edges: Vector::repeat(1.0),
            periodic: [false; DIM],
        }
    }

    /// The edge lengths of the cell.
    pub fn edges(&self) -> &Vector {
        &self.edges
    }

    /// Whether the cell wraps along axis `axis`.
    pub fn is_periodic(&self, axis: usize) -> bool {
        self.periodic[axis]
    }

    /// The shortest displacement from `b` to `a` under the cell's boundary
    /// conditions.
    pub fn minimum_image(&self, a: &Point, b: &Point) -> Vector {
        let mut d = a - b;
        for i in 0..DIM {
            if self.periodic[i] {
                let l = self.edges[i];
                d[i] -= l * (d[i] / l).round();
            }
        }
        d
    }

    /// The squared minimum-image distance between `a` and `b`.
    pub fn distance_squared(&self, a: &Point, b: &Point) -> Real {
        self.minimum_image(a, b).norm_squared()
    }
}
