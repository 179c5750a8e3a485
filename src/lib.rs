//! Conservative boundary remap for shearing-sheet (local-disk) MHD
//! simulations: keeps the radial ghost zones of a doubly-periodic domain
//! consistent with an orbital direction that shears continuously in time.

pub mod diag;
pub mod grid;
pub mod offset;
pub mod reconstruct;
pub mod remap;
pub mod state;

pub type Float = f64;

/// Background shear rate in units of the angular velocity: the local patch
/// carries `v_orbital = -Q_SHEAR * Omega * x`. Physical model constant for
/// a Keplerian-like disk, not configurable.
pub(crate) const Q_SHEAR: Float = 1.5;

pub use grid::{Grid, GridError};
pub use offset::ShearOffset;
pub use reconstruct::{
    ExtremumPreservingParabolic, PiecewiseLinear, ReconstructionOrder, RemapKernel,
};
pub use remap::{EquationOfState, RemapError, ShearingSheet, VarClass};
pub use state::{Cons, NCOMP, NSCALARS};
