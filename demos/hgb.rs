//! Shearing-box demo in the spirit of the Hawley-Gammie-Balbus setup:
//! random pressure and velocity perturbations on a uniform background,
//! advanced through a few orbits of boundary exchanges with each
//! reconstruction order.

use std::{fs, io};

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::info;

use shearbox::{
    diag, Cons, EquationOfState, Float, Grid, ReconstructionOrder, ShearingSheet, VarClass,
};

fn main() {
    tracing_subscriber::fmt::init();

    let omega: Float = 1.0e-3;
    let den: Float = 1.0;
    let pres: Float = 1.0e-6;
    let amp: Float = 0.025;
    let gamma: Float = 5.0 / 3.0;

    for order in [
        ReconstructionOrder::Linear,
        ReconstructionOrder::ExtremumPreservingParabolic,
    ] {
        let mut grid = Grid::new((-0.5, 0.5), (0.0, 4.0), (-0.5, 0.5), (32, 64, 1), 4, omega)
            .expect("grid geometry");
        let mut rng = StdRng::seed_from_u64(313);

        for j in grid.js()..=grid.je() {
            for i in grid.is()..=grid.ie() {
                let x1 = grid.cc_x1(i);

                let rval: Float = amp * (rng.random::<Float>() - 0.5);
                let rp = pres * (1.0 + 2.0 * rval);
                let rvx = 0.4 * amp * (rng.random::<Float>() - 0.5) * (pres / den).sqrt();
                let rvy = 0.4 * amp * (rng.random::<Float>() - 0.5) * (pres / den).sqrt();
                let rvz = 0.4 * amp * (rng.random::<Float>() - 0.5) * (pres / den).sqrt();

                let m1 = den * rvx;
                let m2 = den * (rvy - 1.5 * omega * x1);
                let m3 = den * rvz;
                let e = rp / (gamma - 1.0) + 0.5 * (m1 * m1 + m2 * m2 + m3 * m3) / den;
                *grid.at_mut(i, j, 0) = Cons::hydro(den, m1, m2, m3, e);
            }
        }

        let mut sheet = ShearingSheet::new(&grid, order)
            .expect("driver setup")
            .with_eos(EquationOfState::Adiabatic);

        let output = fs::File::create(format!("hgb_history_{order:?}.bin"))
            .map(io::BufWriter::new)
            .expect("couldn't create history file");
        let mut history = diag::HistoryWriter::new(output);

        info!("running {order:?} exchanges over two orbits");

        let steps = 64;
        let dt = 2.0 * (2.0 * std::f64::consts::PI / omega) / steps as Float;
        for step in 0..=steps {
            grid.set_time(step as Float * dt);
            sheet.exchange(&mut grid, VarClass::Conserved);
            history.record(&grid).expect("history record");
        }

        // the exchange never touches the interior, so the interior totals
        // must not drift at all
        let totals = diag::totals(&grid);
        let mut max_dvy: Float = 0.0;
        for j in grid.js()..=grid.je() {
            for i in grid.is()..=grid.ie() {
                max_dvy = max_dvy.max(diag::shear_deviation(&grid, i, j, 0).abs());
            }
        }

        info!(
            "{order:?}: interior mass {:.12}, max |dVy| {:.3e}",
            totals.d(),
            max_dvy
        );
    }
}
