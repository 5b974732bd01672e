//! Zuker-style minimum free energy folding.

use log::debug;
use ndarray::Array2;

use mf_energy::Base;
use mf_energy::EnergyModel;
use mf_energy::NucleotideVec;
use mf_energy::INF;
use mf_structure::DotBracketVec;
use mf_structure::PairTable;

use crate::FoldError;

/// Upper bound on the unpaired size of a two-loop (bulge, interior).
const MAXLOOP: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TraceV {
    Hairpin,
    TwoLoop { k: usize, l: usize },
    Multi { m: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TraceW {
    UnpairedI,
    UnpairedJ,
    Branch { k: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TraceM {
    UnpairedJ,
    Branch { k: usize, left_branches: bool },
}

/// An interval on the traceback worklist.
enum Segment {
    W(usize, usize),
    V(usize, usize),
    M(usize, usize),
}

#[derive(Debug, Default, Clone)]
pub struct FoldOptions {
    /// Reject sequences longer than this before any cubic work starts.
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldOutcome {
    pub pairs: PairTable,
    /// Minimum free energy in 0.01 kcal/mol.
    pub energy: i32,
}

impl FoldOutcome {
    pub fn structure(&self) -> DotBracketVec {
        DotBracketVec::from(&self.pairs)
    }

    /// Minimum free energy in kcal/mol.
    pub fn mfe(&self) -> f64 {
        self.energy as f64 / 100.0
    }
}

/// Fold a sequence given as text. The sequence is validated before any
/// matrix is allocated.
pub fn fold<M: EnergyModel>(
    model: &M,
    sequence: &str,
    options: &FoldOptions,
) -> Result<FoldOutcome, FoldError> {
    let seq = NucleotideVec::try_from(sequence)?;
    fold_bases(model, &seq, options)
}

/// Fold an already validated sequence.
pub fn fold_bases<M: EnergyModel>(
    model: &M,
    seq: &[Base],
    options: &FoldOptions,
) -> Result<FoldOutcome, FoldError> {
    if let Some(max_length) = options.max_length {
        if seq.len() > max_length {
            return Err(FoldError::Capacity { length: seq.len(), max_length });
        }
    }

    // All scratch state lives in the MfeDP and is dropped on return.
    let dp = MfeDP::new(model, seq);
    let outcome = FoldOutcome {
        pairs: dp.mfe_pairs(),
        energy: dp.mfe(),
    };
    debug!("fold: n={} mfe={:.2}", seq.len(), outcome.mfe());
    Ok(outcome)
}

/// The filled folding matrices for one sequence.
///
/// - `w[[i, j]]`: minimum energy over the subsequence i..=j.
/// - `v[[i, j]]`: minimum energy over i..=j given that i and j pair
///   (`INF` where they cannot).
/// - `m[[i, j]]`: minimum energy of i..=j inside a multiloop, carrying at
///   least one branch, with per-branch and per-unpaired costs applied.
///
/// Intervals are filled in increasing order of length, so every recurrence
/// only reads strictly shorter intervals (plus `v`/`m` entries of the same
/// interval computed earlier in the same step). Ties are broken by a fixed
/// case order, which makes repeated runs return the identical structure.
pub struct MfeDP {
    n: usize,
    w: Array2<i32>,
    v: Array2<i32>,
    m: Array2<i32>,
    trace_w: Array2<TraceW>,
    trace_v: Array2<TraceV>,
    trace_m: Array2<TraceM>,
}

impl MfeDP {
    pub fn new<M: EnergyModel>(model: &M, seq: &[Base]) -> Self {
        let n = seq.len();
        let min_hp = model.min_hairpin_size();

        let mut w = Array2::from_elem((n, n), 0);
        let mut v = Array2::from_elem((n, n), INF);
        let mut m = Array2::from_elem((n, n), INF);
        let mut trace_w = Array2::from_elem((n, n), TraceW::UnpairedI);
        let mut trace_v = Array2::from_elem((n, n), TraceV::Hairpin);
        let mut trace_m = Array2::from_elem((n, n), TraceM::UnpairedJ);

        let ml_closing = model.multiloop_closing();
        let ml_branch = model.multiloop_branch();
        let ml_unpaired = model.multiloop_unpaired();

        for len in 1..=n {
            for i in 0..=(n - len) {
                let j = i + len - 1;

                // V: i pairs with j.
                if j > i + min_hp && model.can_pair(seq[i], seq[j]) {
                    let mut best = model.hairpin_energy(seq, i, j);
                    let mut best_trace = TraceV::Hairpin;

                    // stack, bulge, interior
                    for k in (i + 1)..(j - 1) {
                        if k - i - 1 > MAXLOOP {
                            break;
                        }
                        let l_min = (k + 1).max((j - 1).saturating_sub(MAXLOOP - (k - i - 1)));
                        for l in l_min..j {
                            if v[[k, l]] >= INF {
                                continue;
                            }
                            let cand = model.two_loop_energy(seq, i, j, k, l) + v[[k, l]];
                            if cand < best {
                                best = cand;
                                best_trace = TraceV::TwoLoop { k, l };
                            }
                        }
                    }

                    // multiloop closure: both sides of the split carry a branch
                    for mm in (i + 1)..(j - 1) {
                        if m[[i + 1, mm]] >= INF || m[[mm + 1, j - 1]] >= INF {
                            continue;
                        }
                        let cand = ml_closing + ml_branch
                            + model.branch_penalty(seq[j], seq[i])
                            + m[[i + 1, mm]] + m[[mm + 1, j - 1]];
                        if cand < best {
                            best = cand;
                            best_trace = TraceV::Multi { m: mm };
                        }
                    }

                    v[[i, j]] = best;
                    trace_v[[i, j]] = best_trace;
                }

                // M: at least one branch within i..=j.
                {
                    let mut best = INF;
                    let mut best_trace = TraceM::UnpairedJ;
                    if j > i && m[[i, j - 1]] < INF {
                        best = m[[i, j - 1]] + ml_unpaired;
                    }
                    for k in i..j {
                        if v[[k, j]] >= INF {
                            continue;
                        }
                        let (left, left_branches) = if k == i {
                            (0, false)
                        } else {
                            let all_unpaired = ml_unpaired * (k - i) as i32;
                            if m[[i, k - 1]] < all_unpaired {
                                (m[[i, k - 1]], true)
                            } else {
                                (all_unpaired, false)
                            }
                        };
                        let cand = left + v[[k, j]] + ml_branch
                            + model.branch_penalty(seq[k], seq[j]);
                        if cand < best {
                            best = cand;
                            best_trace = TraceM::Branch { k, left_branches };
                        }
                    }
                    m[[i, j]] = best;
                    trace_m[[i, j]] = best_trace;
                }

                // W: no constraint on i or j.
                {
                    let mut best = if i + 1 <= j { w[[i + 1, j]] } else { 0 };
                    let mut best_trace = TraceW::UnpairedI;
                    if j > i && w[[i, j - 1]] < best {
                        best = w[[i, j - 1]];
                        best_trace = TraceW::UnpairedJ;
                    }
                    for k in i..j {
                        if v[[k, j]] >= INF {
                            continue;
                        }
                        let left = if k == i { 0 } else { w[[i, k - 1]] };
                        let cand = left + v[[k, j]];
                        if cand < best {
                            best = cand;
                            best_trace = TraceW::Branch { k };
                        }
                    }
                    w[[i, j]] = best;
                    trace_w[[i, j]] = best_trace;
                }
            }
        }

        MfeDP { n, w, v, m, trace_w, trace_v, trace_m }
    }

    /// Minimum free energy in 0.01 kcal/mol.
    pub fn mfe(&self) -> i32 {
        if self.n == 0 {
            return 0;
        }
        self.w[[0, self.n - 1]]
    }

    /// Reconstruct the optimal structure from the recorded decisions.
    ///
    /// Explicit worklist instead of recursion: every popped interval only
    /// spawns strictly smaller intervals, so this terminates and stack
    /// depth stays constant.
    pub fn mfe_pairs(&self) -> PairTable {
        let mut pairs = PairTable::open_chain(self.n);
        if self.n == 0 {
            return pairs;
        }

        let mut worklist = vec![Segment::W(0, self.n - 1)];
        while let Some(segment) = worklist.pop() {
            match segment {
                Segment::W(i, j) => {
                    if i >= j {
                        continue;
                    }
                    match self.trace_w[[i, j]] {
                        TraceW::UnpairedI => worklist.push(Segment::W(i + 1, j)),
                        TraceW::UnpairedJ => worklist.push(Segment::W(i, j - 1)),
                        TraceW::Branch { k } => {
                            worklist.push(Segment::V(k, j));
                            if k > i {
                                worklist.push(Segment::W(i, k - 1));
                            }
                        }
                    }
                }
                Segment::V(i, j) => {
                    debug_assert!(self.v[[i, j]] < INF);
                    pairs[i] = Some(j);
                    pairs[j] = Some(i);
                    match self.trace_v[[i, j]] {
                        TraceV::Hairpin => {}
                        TraceV::TwoLoop { k, l } => worklist.push(Segment::V(k, l)),
                        TraceV::Multi { m } => {
                            worklist.push(Segment::M(i + 1, m));
                            worklist.push(Segment::M(m + 1, j - 1));
                        }
                    }
                }
                Segment::M(i, j) => {
                    debug_assert!(self.m[[i, j]] < INF);
                    match self.trace_m[[i, j]] {
                        TraceM::UnpairedJ => {
                            if j > i {
                                worklist.push(Segment::M(i, j - 1));
                            }
                        }
                        TraceM::Branch { k, left_branches } => {
                            worklist.push(Segment::V(k, j));
                            if left_branches {
                                worklist.push(Segment::M(i, k - 1));
                            }
                        }
                    }
                }
            }
        }
        pairs
    }
}
