use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Sub};

use bytemuck::{Pod, Zeroable};

use crate::Float;

/// Number of passive-scalar densities carried per cell.
pub const NSCALARS: usize = 2;

/// Total component count: density, three momenta, total energy, three
/// cell-centered field components, passive scalars.
pub const NCOMP: usize = 8 + NSCALARS;

/// Named component indices into [`Cons`].
pub mod comp {
    /// Mass density.
    pub const DEN: usize = 0;
    /// Radial (x1) momentum density.
    pub const M1: usize = 1;
    /// Orbital (x2) momentum density.
    pub const M2: usize = 2;
    /// Vertical (x3) momentum density.
    pub const M3: usize = 3;
    /// Total energy density.
    pub const ENE: usize = 4;
    pub const B1C: usize = 5;
    pub const B2C: usize = 6;
    pub const B3C: usize = 7;
    /// First passive scalar; scalars occupy `S0..S0 + NSCALARS`.
    pub const S0: usize = 8;
}

/// Conserved state of one cell, stored as a flat array of components so
/// that remap arithmetic is a single loop over `0..NCOMP` at every call
/// site. Unused components (field, scalars) stay zero and are transported
/// exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(transparent)]
pub struct Cons([Float; NCOMP]);

impl Cons {
    pub const ZERO: Cons = Cons([0.0; NCOMP]);

    pub fn new(components: [Float; NCOMP]) -> Self {
        Cons(components)
    }

    /// Every component set to `v`.
    pub fn splat(v: Float) -> Self {
        Cons([v; NCOMP])
    }

    /// Purely hydrodynamic state; field and scalar slots stay zero.
    pub fn hydro(d: Float, m1: Float, m2: Float, m3: Float, e: Float) -> Self {
        let mut u = Cons::ZERO;
        u.0[comp::DEN] = d;
        u.0[comp::M1] = m1;
        u.0[comp::M2] = m2;
        u.0[comp::M3] = m3;
        u.0[comp::ENE] = e;
        u
    }

    pub fn d(&self) -> Float {
        self.0[comp::DEN]
    }

    pub fn m1(&self) -> Float {
        self.0[comp::M1]
    }

    pub fn m2(&self) -> Float {
        self.0[comp::M2]
    }

    pub fn m3(&self) -> Float {
        self.0[comp::M3]
    }

    pub fn e(&self) -> Float {
        self.0[comp::ENE]
    }

    pub fn scalar(&self, n: usize) -> Float {
        self.0[comp::S0 + n]
    }

    pub fn components(&self) -> &[Float; NCOMP] {
        &self.0
    }
}

impl Index<usize> for Cons {
    type Output = Float;

    #[inline]
    fn index(&self, n: usize) -> &Float {
        &self.0[n]
    }
}

impl IndexMut<usize> for Cons {
    #[inline]
    fn index_mut(&mut self, n: usize) -> &mut Float {
        &mut self.0[n]
    }
}

impl Add for Cons {
    type Output = Cons;

    fn add(self, rhs: Cons) -> Cons {
        let mut out = self;
        for n in 0..NCOMP {
            out.0[n] += rhs.0[n];
        }
        out
    }
}

impl AddAssign for Cons {
    fn add_assign(&mut self, rhs: Cons) {
        for n in 0..NCOMP {
            self.0[n] += rhs.0[n];
        }
    }
}

impl Sub for Cons {
    type Output = Cons;

    fn sub(self, rhs: Cons) -> Cons {
        let mut out = self;
        for n in 0..NCOMP {
            out.0[n] -= rhs.0[n];
        }
        out
    }
}

impl Mul<Float> for Cons {
    type Output = Cons;

    fn mul(self, rhs: Float) -> Cons {
        let mut out = self;
        for n in 0..NCOMP {
            out.0[n] *= rhs;
        }
        out
    }
}
