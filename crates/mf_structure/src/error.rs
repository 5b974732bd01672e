use std::fmt;

#[derive(Debug)]
pub enum StructureError {
    UnmatchedOpen(usize),          // '(' at this position was never closed
    UnmatchedClose(usize),         // ')' at this position has no matching '('
    InvalidToken(String, String, usize),   // invalid token, source, position
    InvalidPairTable(usize),       // inconsistent entry at this position
    LengthMismatch(usize, usize),  // comparing structures of different lengths
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureError::UnmatchedOpen(i) => {
                write!(f, "Unmatched '(' at position {}", i)
            }
            StructureError::UnmatchedClose(i) => {
                write!(f, "Unmatched ')' at position {}", i)
            }
            StructureError::InvalidToken(tok, src, i) => {
                write!(f, "Invalid {} in {} at position {}", tok, src, i)
            }
            StructureError::InvalidPairTable(i) => {
                write!(f, "Invalid entry at pair table position {}", i)
            }
            StructureError::LengthMismatch(a, b) => {
                write!(f, "Cannot compare structures of lengths {} and {}", a, b)
            }
        }
    }
}

impl std::error::Error for StructureError {}
