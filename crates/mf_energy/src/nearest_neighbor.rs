use core::f64;
use std::io::{BufRead, Cursor};
use std::path::Path;

use crate::NearestNeighborLoop;
use crate::Base;
use crate::PairTypeRNA;
use crate::EnergyTables;
use crate::ParamError;
use crate::EnergyModel;
use crate::{INF, K0};

/// The default table-driven nearest neighbor model.
///
/// Reads the ViennaRNA parameter file layout. Evaluation uses no dangling
/// ends or terminal mismatches in multibranch and exterior loops (dangle
/// model 0), so the energy of a structure is exactly the sum the folding
/// engine minimizes over.
///
/// Parameter sets may be sparse: the mismatch and int11/21/22 tables are
/// optional. Absent mismatch entries contribute nothing; absent int11/21/22
/// entries fall back to the generic interior loop formula. The stack and
/// loop-length tables are required (`validate_core`).
///
/// Only single-stranded folding is supported.
pub struct NearestNeighbor {
    min_hp_size: usize,
    temperature: f64,
    energy_tables: EnergyTables,
}

const PARAMS_RNA_BASIC: &str = include_str!("../params/rna_basic.par");

fn is_ru_end(pt: PairTypeRNA) -> bool {
    matches!(pt
        , PairTypeRNA::GU | PairTypeRNA::UG
        | PairTypeRNA::AU | PairTypeRNA::UA
        | PairTypeRNA::NN)
}

impl NearestNeighbor {

    /// The parameter set shipped with this crate.
    pub fn default() -> Self {
        NearestNeighbor::from_reader(Cursor::new(PARAMS_RNA_BASIC))
            .expect("Built-in parameter set must be valid")
    }

    pub fn from_parameter_file<P: AsRef<Path>>(path: P) -> Result<Self, ParamError> {
        let energy_tables = EnergyTables::from_parameter_file(path)?;
        Self::from_tables(energy_tables)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ParamError> {
        let energy_tables = EnergyTables::from_reader(reader)?;
        Self::from_tables(energy_tables)
    }

    fn from_tables(energy_tables: EnergyTables) -> Result<Self, ParamError> {
        energy_tables.validate_core()?;
        Ok(NearestNeighbor {
            min_hp_size: 3,
            temperature: 37.0,
            energy_tables,
        })
    }

    pub fn set_temperature(&mut self, temperature: f64) {
        if (self.temperature - temperature).abs() < f64::EPSILON {
            return;
        }

        let old_temp = self.temperature + K0;
        let new_temp = temperature + K0;
        let temp_change = new_temp / old_temp;
        self.temperature = temperature;
        self.energy_tables.rescale(temp_change);
    }

    /// Length-dependent initiation term with lxc extrapolation beyond 30.
    fn loop_initiation(&self, table: &[Option<i32>; 31], n: usize) -> i32 {
        if n <= 30 {
            table[n].unwrap_or(INF)
        } else {
            match table[30] {
                Some(en) => en
                    + (self.energy_tables.misc.lxc * ((n as f64) / 30.).ln()) as i32,
                None => INF,
            }
        }
    }

    fn hairpin(&self, seq: &[Base]) -> i32 {
        let et = &self.energy_tables;
        let n = seq.len() - 2;
        if n < self.min_hp_size {
            return INF;
        }
        let closing = PairTypeRNA::from((seq[0], *seq.last().unwrap()));

        // Special hairpin energies (tri-, tetra- and hexaloops)
        if seq.len() <= 8 {
            if let Some((en, _)) = et.hairpin_sequences.get(seq).copied() {
                return en;
            }
        }

        // Initiation terms
        let mut en = self.loop_initiation(&et.hairpin, n);

        if n == 3 && is_ru_end(closing) {
            en += et.misc.terminal_ru_en37;
        } else if n > 3 {
            en += et.mismatch_hairpin
                [closing as usize]
                [seq[1] as usize]
                [seq[n] as usize].unwrap_or(0);
        }
        en
    }

    /// Generic interior loop: mismatch terms, asymmetry and length
    /// initiation. Also the fallback when int11/21/22 entries are absent.
    fn generic_interior(&self, fwdseq: &[Base], revseq: &[Base]) -> i32 {
        let et = &self.energy_tables;
        let lfwd = fwdseq.len();
        let lrev = revseq.len();
        let outer = PairTypeRNA::from((fwdseq[0], revseq[lrev - 1]));
        let inner = PairTypeRNA::from((revseq[0], fwdseq[lfwd - 1]));

        let mut en = et.mismatch_interior
            [outer as usize][fwdseq[1] as usize]
            [revseq[lrev - 2] as usize].unwrap_or(0)
            + et.mismatch_interior
            [inner as usize][revseq[1] as usize]
            [fwdseq[lfwd - 2] as usize].unwrap_or(0);

        let asy = (lfwd as isize - lrev as isize).unsigned_abs() as i32;
        en += et.ninio.max.min(asy * et.ninio.en37);

        let n = lfwd + lrev - 4;
        en + self.loop_initiation(&et.interior, n)
    }

    fn interior(&self, fwdseq: &[Base], revseq: &[Base]) -> i32 {
        let et = &self.energy_tables;
        let outer = PairTypeRNA::from((*fwdseq.first().unwrap(), *revseq.last().unwrap()));
        let inner = PairTypeRNA::from((*revseq.first().unwrap(), *fwdseq.last().unwrap()));

        match (fwdseq.len(), revseq.len()) {
            (2, 2) =>
                et.stack[outer as usize][inner as usize]
                .expect("validated core table"),
            (3, 2) | (2, 3) => //NOTE: SpecialC if C adjacent to paired C missing!
                et.bulge[1].expect("validated core table") +
                et.stack[outer as usize][inner as usize]
                .expect("validated core table"),
            (3, 3) =>
                et.int11[outer as usize][inner as usize]
                [fwdseq[1] as usize][revseq[1] as usize]
                .unwrap_or_else(|| self.generic_interior(fwdseq, revseq)),
            (3, 4) =>
                et.int21
                [outer as usize][inner as usize]
                [fwdseq[1] as usize][revseq[1] as usize]
                [revseq[2] as usize]
                .unwrap_or_else(|| self.generic_interior(fwdseq, revseq)),
            (4, 3) =>
                et.int21
                [inner as usize][outer as usize]
                [revseq[1] as usize][fwdseq[1] as usize]
                [fwdseq[2] as usize]
                .unwrap_or_else(|| self.generic_interior(fwdseq, revseq)),
            (4, 4) if outer.can_pair() && inner.can_pair()
                && fwdseq[1..3].iter().chain(revseq[1..3].iter()).all(|b| *b != Base::N) =>
                et.int22
                [outer as usize][inner as usize]
                [fwdseq[1] as usize][fwdseq[2] as usize]
                [revseq[1] as usize][revseq[2] as usize]
                .unwrap_or_else(|| self.generic_interior(fwdseq, revseq)),
            (4, 4) => self.generic_interior(fwdseq, revseq),
            (l, 2) | (2, l) => { // General Bulge case
                let n = l - 2;
                let pg1 = if !is_ru_end(outer) { 0 } else {
                    et.misc.terminal_ru_en37
                };
                let pg2 = if !is_ru_end(inner) { 0 } else {
                    et.misc.terminal_ru_en37
                };
                self.loop_initiation(&et.bulge, n) + pg1 + pg2
            },
            (l, 3) | (3, l) => { // 1-n interior loop
                let mut en =
                    et.mismatch_interior_1n
                    [outer as usize][fwdseq[1] as usize]
                    [revseq[revseq.len() - 2] as usize].unwrap_or(0) +
                    et.mismatch_interior_1n
                    [inner as usize][revseq[1] as usize]
                    [fwdseq[fwdseq.len() - 2] as usize].unwrap_or(0);

                en += et.ninio.max.min(
                    (l - 3) as i32 * et.ninio.en37);

                en + self.loop_initiation(&et.interior, l - 1)
            }
            (5, 4) | (4, 5) => { // 2-3 interior loop
                let mut en =
                    et.mismatch_interior_23
                    [outer as usize][fwdseq[1] as usize]
                    [revseq[revseq.len() - 2] as usize].unwrap_or(0) +
                    et.mismatch_interior_23
                    [inner as usize][revseq[1] as usize]
                    [fwdseq[fwdseq.len() - 2] as usize].unwrap_or(0);
                en += et.ninio.en37;
                en + self.loop_initiation(&et.interior, 5)
            }
            _ => self.generic_interior(fwdseq, revseq),
        }
    }

    fn multibranch(&self, seq: &[Base], closing: (usize, usize), branches: &[(usize, usize)]) -> i32 {
        let (i, j) = closing;

        let mut en = self.multiloop_closing()
            + self.multiloop_branch() * (branches.len() as i32 + 1)
            + self.branch_penalty(seq[j], seq[i]);

        let mut unpaired = j - i - 1;
        for &(p, q) in branches {
            en += self.branch_penalty(seq[p], seq[q]);
            unpaired -= q - p + 1;
        }
        en + self.multiloop_unpaired() * unpaired as i32
    }
}

impl EnergyModel for NearestNeighbor {

    fn can_pair(&self, b1: Base, b2: Base) -> bool {
        matches!((b1, b2),
        (Base::A, Base::U) | (Base::U, Base::A) |
        (Base::G, Base::C) | (Base::C, Base::G) |
        (Base::G, Base::U) | (Base::U, Base::G))
    }

    fn temperature(&self) -> f64 { self.temperature }

    fn min_hairpin_size(&self) -> usize { self.min_hp_size }

    fn hairpin_energy(&self, sequence: &[Base], i: usize, j: usize) -> i32 {
        self.hairpin(&sequence[i..=j])
    }

    fn two_loop_energy(&self, sequence: &[Base], i: usize, j: usize, k: usize, l: usize) -> i32 {
        debug_assert!(i < k && k < l && l < j);
        self.interior(&sequence[i..=k], &sequence[l..=j])
    }

    fn multiloop_closing(&self) -> i32 {
        self.energy_tables.ml_params.closing_en37
    }

    fn multiloop_branch(&self) -> i32 {
        self.energy_tables.ml_params.intern_en37
    }

    fn multiloop_unpaired(&self) -> i32 {
        self.energy_tables.ml_params.unpaired_en37
    }

    fn branch_penalty(&self, b5: Base, b3: Base) -> i32 {
        if is_ru_end(PairTypeRNA::from((b5, b3))) {
            self.energy_tables.misc.terminal_ru_en37
        } else {
            0
        }
    }

    fn energy_of_loop(&self, sequence: &[Base], nn_loop: &NearestNeighborLoop) -> i32 {
        match nn_loop {
            NearestNeighborLoop::Hairpin { closing: (i, j) } => {
                self.hairpin(&sequence[*i..=*j])
            }
            NearestNeighborLoop::Interior { closing: (i, j), inner: (k, l) } => {
                let left = &sequence[*i..=*k];
                let right = &sequence[*l..=*j];
                self.interior(left, right)
            }
            NearestNeighborLoop::Multibranch { closing, branches } => {
                self.multibranch(sequence, *closing, branches)
            }
            NearestNeighborLoop::Exterior { .. } => 0,
        }
    }
}
