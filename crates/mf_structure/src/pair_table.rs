use std::ops::{Deref, DerefMut};
use std::convert::TryFrom;
use crate::StructureError;
use crate::{DotBracket, DotBracketVec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairTable(pub Vec<Option<usize>>);

impl PairTable {
    /// An open chain of length `n` (all positions unpaired).
    pub fn open_chain(n: usize) -> Self {
        PairTable(vec![None; n])
    }

    /// Check if the substructure from `i..j` is well-formed:
    /// - All pairings are internal to the interval
    pub fn is_well_formed(&self, i: usize, j: usize) -> bool {
        assert!(j <= self.len(), "Invalid interval: j must be <= length");

        for k in i..j {
            if let Some(l) = self[k] {
                if l < i || l >= j {
                    return false; // points outside
                }
            }
        }
        true
    }

    /// Number of base pairs present in exactly one of the two structures.
    pub fn base_pair_distance(&self, other: &PairTable) -> Result<usize, StructureError> {
        if self.len() != other.len() {
            return Err(StructureError::LengthMismatch(self.len(), other.len()));
        }
        let mut distance = 0;
        for i in 0..self.len() {
            match (self[i], other[i]) {
                (Some(j), Some(k)) if j == k => {}
                (Some(j), Some(k)) => {
                    // two different pairs, count each from its opening side
                    if j > i { distance += 1; }
                    if k > i { distance += 1; }
                }
                (Some(j), None) | (None, Some(j)) => {
                    if j > i { distance += 1; }
                }
                (None, None) => {}
            }
        }
        Ok(distance)
    }
}

impl Deref for PairTable {
    type Target = [Option<usize>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PairTable {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl TryFrom<&str> for PairTable {
    type Error = StructureError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut stack = Vec::new();
        let mut table = vec![None; s.len()];

        for (i, c) in s.chars().enumerate() {
            match c {
                '(' => stack.push(i),
                ')' => {
                    let j = stack.pop().ok_or(StructureError::UnmatchedClose(i))?;
                    table[i] = Some(j);
                    table[j] = Some(i);
                }
                '.' => (),
                _ => return Err(StructureError::InvalidToken(format!("character '{}'", c), "structure".to_string(), i)),
            }
        }

        if let Some(i) = stack.pop() {
            return Err(StructureError::UnmatchedOpen(i));
        }
        Ok(PairTable(table))
    }
}

impl TryFrom<&DotBracketVec> for PairTable {
    type Error = StructureError;

    fn try_from(db: &DotBracketVec) -> Result<Self, Self::Error> {
        let mut stack: Vec<usize> = Vec::new();
        let mut table = vec![None; db.len()];

        for (i, dot) in db.iter().enumerate() {
            match dot {
                DotBracket::Open => stack.push(i),
                DotBracket::Close => {
                    let j = stack.pop().ok_or(StructureError::UnmatchedClose(i))?;
                    table[i] = Some(j);
                    table[j] = Some(i);
                }
                DotBracket::Unpaired => {}
            }
        }

        if let Some(i) = stack.pop() {
            return Err(StructureError::UnmatchedOpen(i));
        }

        Ok(PairTable(table))
    }
}
