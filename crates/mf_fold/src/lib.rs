//! Minimum free energy folding for single-stranded nucleic acids.
//!
//! The engine fills the classical V/W/M interval matrices in order of
//! increasing interval length and reconstructs the optimal structure with
//! an explicit worklist, so results are deterministic and stack depth
//! stays bounded for long sequences.

mod error;
mod mfe;
mod nussinov;

pub use error::*;
pub use mfe::*;
pub use nussinov::*;

use mf_energy::Base;
use mf_energy::NucleotideVec;
use rand::Rng;
use rand::prelude::IndexedRandom;

/// Random sequence over A, C, G, U. Used by benchmarks and tests.
pub fn random_sequence<R: Rng>(length: usize, rng: &mut R) -> NucleotideVec {
    let alphabet = [Base::A, Base::C, Base::G, Base::U];
    NucleotideVec((0..length)
        .map(|_| *alphabet.choose(rng).unwrap())
        .collect())
}
