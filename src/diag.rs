use std::io::{self, Write};

use crate::grid::Grid;
use crate::state::{Cons, NCOMP};
use crate::{Float, Q_SHEAR};

/// Deviation of the orbital velocity from the background shear flow at
/// cell `(i, j, k)`. Pure query over committed grid state.
pub fn shear_deviation(grid: &Grid, i: usize, j: usize, k: usize) -> Float {
    let u = grid.at(i, j, k);
    u.m2() / u.d() + Q_SHEAR * grid.omega() * grid.cc_x1(i)
}

/// Componentwise sums of the conserved state over the interior cells.
pub fn totals(grid: &Grid) -> Cons {
    let mut sum = Cons::ZERO;
    for k in grid.ks()..=grid.ke() {
        for j in grid.js()..=grid.je() {
            for i in grid.is()..=grid.ie() {
                sum += *grid.at(i, j, k);
            }
        }
    }
    sum
}

const SBH1_HEADER: &[u8] = b"SBH1";

/// Binary conserved-totals history: magic bytes and the component count,
/// then one `(time, totals)` record per call to
/// [`record`](HistoryWriter::record).
pub struct HistoryWriter<W> {
    output: W,
    started: bool,
}

impl<W: Write> HistoryWriter<W> {
    pub fn new(output: W) -> Self {
        Self {
            output,
            started: false,
        }
    }

    pub fn record(&mut self, grid: &Grid) -> io::Result<()> {
        if !self.started {
            self.output.write_all(SBH1_HEADER)?;
            self.output
                .write_all(bytemuck::bytes_of(&(NCOMP as u32)))?;
            self.started = true;
        }

        self.output.write_all(bytemuck::bytes_of(&grid.time()))?;
        let sum = totals(grid);
        self.output
            .write_all(bytemuck::cast_slice(sum.components()))?;
        self.output.flush()
    }
}
