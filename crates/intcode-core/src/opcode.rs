//! Opcode decoding
//!
//! Every instruction starts with an integer tag. Only three tags are defined;
//! everything else decodes to `None` and the interpreter turns that into an
//! invalid-opcode fault.

use std::fmt;

/// Intcode instruction opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `1 a b dst`: `mem[dst] = mem[a] + mem[b]`
    Add,
    /// `2 a b dst`: `mem[dst] = mem[a] * mem[b]`
    Multiply,
    /// `99`: stop execution
    Halt,
}

impl Opcode {
    pub const ADD: i64 = 1;
    pub const MULTIPLY: i64 = 2;
    pub const HALT: i64 = 99;

    /// Decode a raw memory cell into an opcode
    pub fn decode(value: i64) -> Option<Self> {
        match value {
            Self::ADD => Some(Opcode::Add),
            Self::MULTIPLY => Some(Opcode::Multiply),
            Self::HALT => Some(Opcode::Halt),
            _ => None,
        }
    }

    /// Raw tag stored in memory
    pub fn code(self) -> i64 {
        match self {
            Opcode::Add => Self::ADD,
            Opcode::Multiply => Self::MULTIPLY,
            Opcode::Halt => Self::HALT,
        }
    }

    /// Number of cells the instruction occupies, opcode included
    pub fn width(self) -> usize {
        match self {
            Opcode::Add | Opcode::Multiply => 4,
            Opcode::Halt => 1,
        }
    }

    /// Apply a binary opcode, returning `None` on overflow or for `Halt`
    pub fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            Opcode::Add => lhs.checked_add(rhs),
            Opcode::Multiply => lhs.checked_mul(rhs),
            Opcode::Halt => None,
        }
    }
}

impl TryFrom<i64> for Opcode {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::decode(value).ok_or(value)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::Add => write!(f, "ADD"),
            Opcode::Multiply => write!(f, "MUL"),
            Opcode::Halt => write!(f, "HALT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_tags() {
        assert_eq!(Opcode::decode(1), Some(Opcode::Add));
        assert_eq!(Opcode::decode(2), Some(Opcode::Multiply));
        assert_eq!(Opcode::decode(99), Some(Opcode::Halt));
    }

    #[test]
    fn test_decode_unknown_tags() {
        for value in [0, 3, 4, 98, 100, -1, i64::MAX] {
            assert_eq!(Opcode::decode(value), None);
            assert_eq!(Opcode::try_from(value), Err(value));
        }
    }

    #[test]
    fn test_code_matches_decode() {
        for op in [Opcode::Add, Opcode::Multiply, Opcode::Halt] {
            assert_eq!(Opcode::decode(op.code()), Some(op));
        }
    }

    #[test]
    fn test_width() {
        assert_eq!(Opcode::Add.width(), 4);
        assert_eq!(Opcode::Multiply.width(), 4);
        assert_eq!(Opcode::Halt.width(), 1);
    }

    #[test]
    fn test_apply_overflow() {
        assert_eq!(Opcode::Add.apply(2, 3), Some(5));
        assert_eq!(Opcode::Multiply.apply(2, 3), Some(6));
        assert_eq!(Opcode::Add.apply(i64::MAX, 1), None);
        assert_eq!(Opcode::Multiply.apply(i64::MAX, 2), None);
        assert_eq!(Opcode::Halt.apply(1, 1), None);
    }
}
