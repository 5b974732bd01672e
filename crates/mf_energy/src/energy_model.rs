use log::info;
use colored::*;

use crate::NearestNeighborLoop;
use crate::LoopDecomposition;
use crate::Base;

pub const K0: f64 = 273.15;

/// Sentinel for infeasible energies. Large enough to never win a
/// minimization, small enough that two of them still add without overflow.
pub const INF: i32 = i32::MAX / 4;

/// Free energies are i32 values in units of 0.01 kcal/mol.
///
/// Besides whole-structure evaluation, the trait exposes the piecewise
/// energies a folding engine consumes: hairpins, two-loops (stack, bulge,
/// interior) and the linear multiloop costs.
pub trait EnergyModel {
    fn can_pair(&self, b1: Base, b2: Base) -> bool;

    fn temperature(&self) -> f64;

    fn min_hairpin_size(&self) -> usize;

    /// Energy of the hairpin loop closed by the pair (i, j).
    fn hairpin_energy(&self, sequence: &[Base], i: usize, j: usize) -> i32;

    /// Energy of the loop between closing pair (i, j) and inner pair (k, l),
    /// with i < k < l < j: a stack, bulge, or interior loop.
    fn two_loop_energy(&self, sequence: &[Base], i: usize, j: usize, k: usize, l: usize) -> i32;

    /// Multiloop closing cost.
    fn multiloop_closing(&self) -> i32;

    /// Multiloop cost per branch (the closing pair counts as a branch).
    fn multiloop_branch(&self) -> i32;

    /// Multiloop cost per unpaired base.
    fn multiloop_unpaired(&self) -> i32;

    /// Penalty for a multiloop branch closed by the pair (b5, b3).
    fn branch_penalty(&self, b5: Base, b3: Base) -> i32;

    fn energy_of_loop(&self,
        sequence: &[Base],
        nn_loop: &NearestNeighborLoop
    ) -> i32;

    fn energy_of_structure<T: LoopDecomposition>(&self,
        sequence: &[Base],
        structure: &T
    ) -> i32 {
        let mut total = 0;
        structure.for_each_loop(|l| {
            let en = self.energy_of_loop(sequence, l);
            total += en;
            info!("{:<41} {}", format!("{}:", l), format!("{:>6.2}", en as f64 / 100.).green());
        });
        total
    }
}
