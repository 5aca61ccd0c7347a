use std::fmt;

use crate::kekulize::KekulizeError;
use crate::valence::ValenceError;

/// Errors produced when parsing a SMILES string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmilesError {
    /// An unexpected character was encountered at the given position.
    UnexpectedChar { pos: usize, ch: char },
    /// An unrecognized element symbol was found.
    InvalidElement { pos: usize, text: String },
    /// A bracket atom `[` was opened but never closed with `]`.
    UnclosedBracket { pos: usize },
    /// A ring-opening digit was never matched by a ring-closing digit.
    UnclosedRing { digit: u16 },
    /// A parenthesis was opened without a matching close, or vice versa.
    UnmatchedParen { pos: usize },
    /// A charge specifier inside a bracket atom could not be parsed.
    InvalidCharge { pos: usize },
    /// An isotope number overflowed.
    InvalidIsotope { pos: usize },
    /// An atom class (`:n`) could not be parsed.
    InvalidAtomClass { pos: usize },
    /// A ring-closure digit appeared before any atom.
    InvalidRingBond { digit: u16, pos: usize },
    /// A bond symbol with no atom on one of its sides.
    DanglingBond { pos: usize },
    /// A chirality class other than `@`, `@@`, `@TH1` or `@TH2`.
    UnsupportedChirality { pos: usize },
    /// The input string was empty or contained only whitespace.
    EmptyInput,
    /// Two ring-closure bonds on the same digit specify conflicting bond types.
    RingBondConflict { digit: u16 },
    /// A ring closure joined an atom to itself.
    SelfBond { digit: u16 },
    /// A ring closure duplicated an existing bond.
    DuplicateBond { digit: u16 },
    /// Kekulization of the aromatic system failed.
    Kekulize(KekulizeError),
    /// An atom exceeds every valence its element allows.
    Valence(ValenceError),
}

impl fmt::Display for SmilesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedChar { pos, ch } => {
                write!(f, "unexpected character '{}' at position {}", ch, pos)
            }
            Self::InvalidElement { pos, text } => {
                write!(f, "invalid element '{}' at position {}", text, pos)
            }
            Self::UnclosedBracket { pos } => {
                write!(f, "unclosed bracket atom starting at position {}", pos)
            }
            Self::UnclosedRing { digit } => write!(f, "unclosed ring {}", digit),
            Self::UnmatchedParen { pos } => {
                write!(f, "unmatched parenthesis at position {}", pos)
            }
            Self::InvalidCharge { pos } => {
                write!(f, "invalid charge at position {}", pos)
            }
            Self::InvalidIsotope { pos } => {
                write!(f, "isotope overflow at position {}", pos)
            }
            Self::InvalidAtomClass { pos } => {
                write!(f, "atom class overflow at position {}", pos)
            }
            Self::InvalidRingBond { digit, pos } => {
                write!(f, "invalid ring bond {} at position {}", digit, pos)
            }
            Self::DanglingBond { pos } => {
                write!(f, "bond at position {} is missing an atom", pos)
            }
            Self::UnsupportedChirality { pos } => {
                write!(f, "unsupported chirality class at position {}", pos)
            }
            Self::EmptyInput => write!(f, "empty SMILES string"),
            Self::RingBondConflict { digit } => {
                write!(f, "conflicting bond types on ring closure {}", digit)
            }
            Self::SelfBond { digit } => {
                write!(f, "ring closure {} bonds an atom to itself", digit)
            }
            Self::DuplicateBond { digit } => {
                write!(f, "ring closure {} duplicates an existing bond", digit)
            }
            Self::Kekulize(e) => write!(f, "{}", e),
            Self::Valence(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SmilesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Kekulize(e) => Some(e),
            Self::Valence(e) => Some(e),
            _ => None,
        }
    }
}

impl From<KekulizeError> for SmilesError {
    fn from(e: KekulizeError) -> Self {
        Self::Kekulize(e)
    }
}

impl From<ValenceError> for SmilesError {
    fn from(e: ValenceError) -> Self {
        Self::Valence(e)
    }
}
