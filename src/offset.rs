use crate::{Float, Q_SHEAR};

/// Decomposition of the accumulated orbital shear into whole grid cells
/// and a sub-cell remainder. Recomputed from the simulation time at every
/// exchange and never persisted; a restart recovers it from time alone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShearOffset {
    /// Whole-cell part of the wrapped shear.
    pub cells: i64,
    /// Sub-cell remainder as a fraction of the orbital cell width, in
    /// `[0, 1)`.
    pub frac: Float,
}

impl ShearOffset {
    /// Offset of the sheared domain at simulation time `time`, for a box
    /// of radial length `lx`, orbital length `ly` and orbital cell width
    /// `dx2`.
    pub fn at_time(time: Float, omega: Float, lx: Float, ly: Float, dx2: Float) -> Self {
        let total = Q_SHEAR * omega * lx * time;

        // the remainder keeps the sign of `total`; fold it into [0, ly)
        let mut wrapped = total % ly;
        if wrapped < 0.0 {
            wrapped += ly;
        }
        // a tiny negative remainder can round up to exactly ly
        if wrapped >= ly {
            wrapped = 0.0;
        }

        ShearOffset {
            cells: (wrapped / dx2).floor() as i64,
            frac: (wrapped % dx2) / dx2,
        }
    }
}
