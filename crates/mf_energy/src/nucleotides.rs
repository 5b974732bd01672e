use std::fmt;
use std::borrow::Borrow;
use std::ops::Deref;

use log::warn;
use colored::*;
use strum::EnumCount as _;
use strum_macros::{EnumCount, EnumIter};


#[derive(Debug)]
pub enum SequenceError {
    Plain(String),
    InvalidChar(char),
    Separator(char),
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceError::Plain(s) => {
                write!(f, "ERROR: {}", s)
            }
            SequenceError::InvalidChar(c) => {
                write!(f, "Unsupported nucleotide: '{}'", c)
            }
            SequenceError::Separator(c) => {
                write!(f, "Unexpected strand separation character '{}'", c)
            }
        }
    }
}

impl std::error::Error for SequenceError {}


#[derive(Clone, Hash, Copy, Debug, Eq, PartialEq, EnumCount, EnumIter)]
pub enum Base { A, C, G, U, N }
pub const BCOUNT: usize = Base::COUNT; // 5 Base variants for tables.

impl TryFrom<char> for Base {
    type Error = SequenceError;
    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'A' => Ok(Base::A),
            'C' => Ok(Base::C),
            'G' => Ok(Base::G),
            'U' | 'T' => Ok(Base::U),
            'N' => Ok(Base::N),
            '&' | '+' => Err(SequenceError::Separator(c)),
            _ => Err(SequenceError::InvalidChar(c)),
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Base::A => 'A',
            Base::C => 'C',
            Base::G => 'G',
            Base::U => 'U',
            Base::N => 'N',
        };
        write!(f, "{}", c)
    }
}


#[derive(Clone, Hash, Debug, Eq, PartialEq)]
pub struct NucleotideVec(pub Vec<Base>);

impl Deref for NucleotideVec {
    type Target = [Base];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<[Base]> for NucleotideVec {
    fn borrow(&self) -> &[Base] {
        &self.0
    }
}

impl TryFrom<&str> for NucleotideVec {
    type Error = SequenceError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut vec = Vec::with_capacity(s.len());
        for c in s.chars() {
            vec.push(Base::try_from(c)?);
        }
        Ok(NucleotideVec(vec))
    }
}

impl fmt::Display for NucleotideVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for base in &self.0 {
            write!(f, "{}", base)?;
        }
        Ok(())
    }
}

impl NucleotideVec {
    /// Lossy conversion: unknown and degenerate symbols become 'N'.
    pub fn from_lossy(s: &str) -> Self {
        let vec = s.chars().map(|c| {
            Base::try_from(c).unwrap_or_else(|e| {
                warn!("{} {} -> converted to 'N'", "WARNING:".red(), e);
                Base::N
            })
        }).collect();
        NucleotideVec(vec)
    }
}

const PAIR_LOOKUP: [[PairTypeRNA; BCOUNT]; BCOUNT] = {
    use Base::*;
    use PairTypeRNA::*;
    let mut table = [[NN; BCOUNT]; BCOUNT];
    table[A as usize][U as usize] = AU;
    table[U as usize][A as usize] = UA;
    table[C as usize][G as usize] = CG;
    table[G as usize][C as usize] = GC;
    table[G as usize][U as usize] = GU;
    table[U as usize][G as usize] = UG;
    table
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumCount, EnumIter)]
pub enum PairTypeRNA { AU, UA, CG, GC, GU, UG, NN }
pub const PCOUNT: usize = PairTypeRNA::COUNT; // 7 Pair variants for tables.

impl From<(Base, Base)> for PairTypeRNA {
    fn from(pair: (Base, Base)) -> Self {
        PAIR_LOOKUP[pair.0 as usize][pair.1 as usize]
    }
}

impl fmt::Display for PairTypeRNA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PairTypeRNA::AU => "A-U",
            PairTypeRNA::UA => "U-A",
            PairTypeRNA::CG => "C-G",
            PairTypeRNA::GC => "G-C",
            PairTypeRNA::GU => "G-U",
            PairTypeRNA::UG => "U-G",
            PairTypeRNA::NN => "N-N",
        };
        write!(f, "{}", s)
    }
}

impl PairTypeRNA {
    pub fn new(pair: (Base, Base)) -> Self {
        let pt = PAIR_LOOKUP[pair.0 as usize][pair.1 as usize];

        if pt == PairTypeRNA::NN {
            warn!("{} Invalid base pair: {}-{} -> converted to {}", "WARNING:".red(), pair.0, pair.1, pt);
        }

        pt
    }

    pub fn is_ru(&self) -> bool {
       matches!(self
            , PairTypeRNA::GU | PairTypeRNA::UG
            | PairTypeRNA::AU | PairTypeRNA::UA)
    }

    pub fn is_wcf(&self) -> bool {
       matches!(self
            , PairTypeRNA::GC | PairTypeRNA::CG
            | PairTypeRNA::AU | PairTypeRNA::UA)
    }

    pub fn is_wobble(&self) -> bool {
       matches!(self, PairTypeRNA::GU | PairTypeRNA::UG)
    }

    pub fn can_pair(&self) -> bool {
       self != &PairTypeRNA::NN
    }

    pub fn invert(&self) -> PairTypeRNA {
        use PairTypeRNA::*;
        match self {
            AU => UA,
            UA => AU,
            CG => GC,
            GC => CG,
            GU => UG,
            UG => GU,
            NN => NN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_base_from_char() {
        assert_eq!(Base::try_from('a').unwrap(), Base::A);
        assert_eq!(Base::try_from('T').unwrap(), Base::U);
        assert_eq!(Base::try_from('u').unwrap(), Base::U);
        assert!(matches!(Base::try_from('+'), Err(SequenceError::Separator('+'))));
        assert!(matches!(Base::try_from('x'), Err(SequenceError::InvalidChar('x'))));
    }

    #[test]
    fn test_nucleotide_vec_strict() {
        let seq = NucleotideVec::try_from("GCAU").unwrap();
        assert_eq!(seq.len(), 4);
        assert_eq!(format!("{}", seq), "GCAU");
        assert!(NucleotideVec::try_from("GCXU").is_err());
    }

    #[test]
    fn test_nucleotide_vec_lossy() {
        let seq = NucleotideVec::from_lossy("GCRU");
        assert_eq!(format!("{}", seq), "GCNU");
    }

    #[test]
    fn test_pair_lookup_symmetry() {
        for b1 in Base::iter() {
            for b2 in Base::iter() {
                let pt = PairTypeRNA::from((b1, b2));
                let inv = PairTypeRNA::from((b2, b1));
                assert_eq!(pt.invert(), inv);
            }
        }
    }

    #[test]
    fn test_pair_predicates() {
        assert!(PairTypeRNA::GU.is_ru());
        assert!(PairTypeRNA::AU.is_ru());
        assert!(!PairTypeRNA::CG.is_ru());
        assert!(PairTypeRNA::AU.is_wcf());
        assert!(!PairTypeRNA::GU.is_wcf());
        assert!(PairTypeRNA::UG.is_wobble());
        assert!(PairTypeRNA::CG.can_pair());
        assert!(!PairTypeRNA::NN.can_pair());
    }

    #[test]
    fn test_n_pairs_with_nothing() {
        for b in Base::iter() {
            assert_eq!(PairTypeRNA::from((Base::N, b)), PairTypeRNA::NN);
            assert_eq!(PairTypeRNA::from((b, Base::N)), PairTypeRNA::NN);
        }
    }
}
