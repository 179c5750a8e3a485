use thiserror::Error;

use crate::grid::Grid;
use crate::offset::ShearOffset;
use crate::reconstruct::{ReconstructionOrder, RemapKernel};
use crate::state::{comp, Cons};
use crate::Q_SHEAR;

#[derive(Error, Debug)]
pub enum RemapError {
    #[error("remap scratch allocation failed")]
    Allocation(#[source] std::collections::TryReserveError),
    #[error("invalid geometry: {0}")]
    InvalidGeometry(&'static str),
}

/// Variable class being exchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarClass {
    /// The conserved-state array.
    Conserved,
    /// Gravitational potential: remapped by the self-gravity solver, not
    /// here.
    SelfGravPotential,
}

/// Whether the gathered states carry a total-energy component that must
/// track the orbital-momentum frame boost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EquationOfState {
    #[default]
    Adiabatic,
    Isothermal,
}

#[derive(Clone, Copy)]
enum Face {
    Inner,
    Outer,
}

/// Scratch for one boundary exchange: `depth` orbital pencils with halo
/// padding, plus one flux pencil. Contents carry no state between calls.
struct RemapBuffer {
    rows: Vec<Cons>,
    flux: Vec<Cons>,
    stride: usize,
}

impl RemapBuffer {
    fn try_new(depth: usize, stride: usize) -> Result<Self, RemapError> {
        let mut rows = Vec::new();
        rows.try_reserve_exact(depth * stride)
            .map_err(RemapError::Allocation)?;
        rows.resize(depth * stride, Cons::ZERO);

        let mut flux = Vec::new();
        flux.try_reserve_exact(stride)
            .map_err(RemapError::Allocation)?;
        flux.resize(stride, Cons::ZERO);

        Ok(RemapBuffer { rows, flux, stride })
    }

    fn row_mut(&mut self, g: usize) -> &mut [Cons] {
        &mut self.rows[g * self.stride..(g + 1) * self.stride]
    }
}

/// Boundary exchange driver for the shearing-sheet radial boundaries.
///
/// Owns its scratch storage, sized at construction for one grid geometry;
/// one instance must not serve concurrently exchanging subgrids. The
/// host's generic radial boundary hooks must be disabled so that
/// [`exchange`](ShearingSheet::exchange) is the sole writer of the radial
/// ghost zones.
pub struct ShearingSheet {
    kernel: Box<dyn RemapKernel>,
    buf: RemapBuffer,
    eos: EquationOfState,
    halo: usize,
}

impl ShearingSheet {
    pub fn new(grid: &Grid, order: ReconstructionOrder) -> Result<Self, RemapError> {
        let mut kernel = order.build();
        let halo = kernel.halo();
        if grid.nx2() < halo {
            return Err(RemapError::InvalidGeometry(
                "orbital extent shorter than the reconstruction halo",
            ));
        }
        if grid.nx1() < grid.nghost() {
            return Err(RemapError::InvalidGeometry(
                "radial extent shorter than the ghost depth",
            ));
        }

        let stride = grid.nx2() + 2 * halo;
        kernel.init(stride);
        let buf = RemapBuffer::try_new(grid.nghost(), stride)?;

        tracing::event!(
            tracing::Level::DEBUG,
            "shearing-sheet driver ready: `{}` kernel, {} ghost pencils of {} cells",
            kernel.name(),
            grid.nghost(),
            stride,
        );

        Ok(ShearingSheet {
            kernel,
            buf,
            eos: EquationOfState::default(),
            halo,
        })
    }

    pub fn with_eos(mut self, eos: EquationOfState) -> Self {
        self.eos = eos;
        self
    }

    /// Remap both radial boundaries of `grid` from one offset snapshot.
    ///
    /// Overwrites only the radial ghost zones of the conserved array;
    /// interior cells are never touched. The grid's interior must already
    /// hold up-to-date values on both faces (any inter-subgrid transport
    /// has completed).
    pub fn exchange(&mut self, grid: &mut Grid, class: VarClass) {
        if class == VarClass::SelfGravPotential {
            return;
        }

        debug_assert_eq!(grid.nx2() + 2 * self.halo, self.buf.stride);

        let offset = ShearOffset::at_time(
            grid.time(),
            grid.omega(),
            grid.lx(),
            grid.ly(),
            grid.dx2(),
        );
        tracing::event!(
            tracing::Level::TRACE,
            "shearing-sheet exchange at t={:e}: offset {} cells + {:e}",
            grid.time(),
            offset.cells,
            offset.frac,
        );

        self.face(grid, offset, Face::Inner);
        self.face(grid, offset, Face::Outer);
    }

    fn face(&mut self, grid: &mut Grid, offset: ShearOffset, face: Face) {
        let (is, ie) = (grid.is(), grid.ie());
        let (js, je) = (grid.js(), grid.je());
        let ny = grid.nx2();
        let depth = grid.nghost();
        let halo = self.halo;

        let qoml = Q_SHEAR * grid.omega() * grid.lx();
        let (boost, eps) = match face {
            Face::Inner => (qoml, offset.frac),
            Face::Outer => (-qoml, -offset.frac),
        };

        for k in grid.ks()..=grid.ke() {
            // gather source pencils from the opposite face, shifted by the
            // whole-cell part of the offset and boosted into the sheared
            // frame
            for g in 0..depth {
                let src_i = match face {
                    Face::Inner => ie - depth + 1 + g,
                    Face::Outer => is + g,
                };
                let row = self.buf.row_mut(g);
                for j in js..=je {
                    let local = (j - js) as i64;
                    let shifted = match face {
                        Face::Inner => local - offset.cells,
                        Face::Outer => local + offset.cells,
                    };
                    let src_j = js + shifted.rem_euclid(ny as i64) as usize;

                    let mut u = *grid.at(src_i, src_j, k);
                    let m2 = u[comp::M2];
                    u[comp::M2] = m2 + boost * u[comp::DEN];
                    if matches!(self.eos, EquationOfState::Adiabatic) {
                        // the internal energy must not change under the
                        // frame boost
                        u[comp::ENE] +=
                            0.5 / u[comp::DEN] * (u[comp::M2] * u[comp::M2] - m2 * m2);
                    }
                    row[halo + (j - js)] = u;
                }

                // periodic padding in the orbital direction
                for m in 0..halo {
                    row[m] = row[ny + m];
                    row[halo + ny + m] = row[halo + m];
                }
            }

            // fractional remap of each gathered pencil into the ghost zones
            let RemapBuffer { rows, flux, stride } = &mut self.buf;
            let (il, iu) = (halo, halo + ny);
            for g in 0..depth {
                let row = &rows[g * *stride..(g + 1) * *stride];
                self.kernel.remap_flux(row, eps, il, iu, flux);

                let dst_i = match face {
                    Face::Inner => is - depth + g,
                    Face::Outer => ie + 1 + g,
                };
                for j in js..=je {
                    let jj = halo + (j - js);
                    *grid.at_mut(dst_i, j, k) = row[jj] - (flux[jj + 1] - flux[jj]);
                }
            }
        }
    }
}
