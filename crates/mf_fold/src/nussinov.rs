//! Nussinov-style base-pair maximization.
//!
//! A structural baseline next to the energy-directed engine: it ignores
//! loop energies entirely and maximizes the number of pairs.

use ndarray::Array2;

use mf_energy::Base;
use mf_energy::EnergyModel;
use mf_structure::PairTable;

pub struct NussinovDP {
    min_hp_size: usize,
    pairable: Array2<bool>,
    dp_table: Array2<usize>,
}

impl NussinovDP {
    pub fn new<M: EnergyModel>(model: &M, seq: &[Base]) -> Self {
        let n = seq.len();
        let min_hp_size = model.min_hairpin_size();

        let mut pairable = Array2::from_elem((n, n), false);
        for ((i, j), value) in pairable.indexed_iter_mut() {
            *value = j > i + min_hp_size && model.can_pair(seq[i], seq[j]);
        }

        let dp_table = nussinov(&pairable);
        Self { min_hp_size, pairable, dp_table }
    }

    /// Maximum number of base pairs over the whole sequence.
    pub fn max_pairs(&self) -> usize {
        let n = self.dp_table.nrows();
        if n == 0 {
            return 0;
        }
        self.dp_table[[0, n - 1]]
    }

    /// One pairing that attains the maximum, reconstructed with an
    /// explicit worklist of intervals.
    pub fn best_pairs(&self) -> PairTable {
        let n = self.dp_table.nrows();
        let mut pairs = PairTable::open_chain(n);
        if n == 0 {
            return pairs;
        }

        let mut worklist = vec![(0, n - 1)];
        while let Some((i, j)) = worklist.pop() {
            if j <= i + self.min_hp_size {
                continue;
            }
            let dp_ij = self.dp_table[[i, j]];
            if dp_ij == 0 {
                continue;
            }

            if dp_ij == self.dp_table[[i + 1, j]] {
                worklist.push((i + 1, j));
            } else if dp_ij == self.dp_table[[i, j - 1]] {
                worklist.push((i, j - 1));
            } else if self.pairable[[i, j]]
                && dp_ij == self.dp_table[[i + 1, j - 1]] + 1
            {
                pairs[i] = Some(j);
                pairs[j] = Some(i);
                worklist.push((i + 1, j - 1));
            } else {
                for k in (i + 1)..j {
                    if dp_ij == self.dp_table[[i, k]] + self.dp_table[[k + 1, j]] {
                        worklist.push((i, k));
                        worklist.push((k + 1, j));
                        break;
                    }
                }
            }
        }
        pairs
    }
}

fn nussinov(pairable: &Array2<bool>) -> Array2<usize> {
    let (n, m) = pairable.dim();
    assert!(n == m);
    let mut dp = Array2::from_elem((n, n), 0);
    for l in 1..n {
        for i in 0..n - l {
            let j = i + l;
            let mut max_val = dp[[i + 1, j]].max(dp[[i, j - 1]]);
            if pairable[[i, j]] {
                max_val = max_val.max(dp[[i + 1, j - 1]] + 1);
            }
            for k in i + 1..j {
                max_val = max_val.max(dp[[i, k]] + dp[[k + 1, j]]);
            }
            dp[[i, j]] = max_val;
        }
    }
    dp
}
