//! # mfefold
//!
//! RNA minimum free energy secondary structure prediction.
//!
//! This crate re-exports the main functionality from its submodules.

pub mod structure {
    pub use ::mf_structure::*;
}

pub mod energy {
    pub use ::mf_energy::*;
}

pub mod fold {
    pub use ::mf_fold::*;
}

use mf_energy::NearestNeighbor;
use mf_fold::FoldError;
use mf_fold::FoldOptions;

/// Fold a sequence with the built-in parameter set and return the
/// dot-bracket structure plus the minimum free energy in kcal/mol.
///
/// Model and matrices are scoped to the call and released on every exit
/// path.
pub fn fold_sequence(sequence: &str) -> Result<(String, f64), FoldError> {
    let model = NearestNeighbor::default();
    let outcome = mf_fold::fold(&model, sequence, &FoldOptions::default())?;
    Ok((outcome.structure().to_string(), outcome.mfe()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_sequence_stem_loop() {
        let (structure, mfe) = fold_sequence("GGGAAACCC").unwrap();
        assert_eq!(structure, "(((...)))");
        assert!(mfe < 0.0);
        assert!((mfe + 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_fold_sequence_open_chain() {
        let (structure, mfe) = fold_sequence("AAAA").unwrap();
        assert_eq!(structure, "....");
        assert_eq!(mfe, 0.0);
    }

    #[test]
    fn test_fold_sequence_rejects_garbage() {
        assert!(fold_sequence("GGG!CCC").is_err());
    }

    #[test]
    fn test_fold_sequence_structure_length() {
        for seq in ["", "A", "GC", "GCGCAAAAGCGC"] {
            let (structure, _) = fold_sequence(seq).unwrap();
            assert_eq!(structure.chars().count(), seq.chars().count());
        }
    }
}
