//! Program loading
//!
//! An Intcode program is stored as a single line of comma-separated signed
//! integers. Only the first non-blank line of the input is read.

use std::fmt;
use std::fs;
use std::io;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while loading a program
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("program is empty")]
    Empty,
    #[error("invalid integer {token:?} at position {position}: {source}")]
    InvalidToken {
        token: String,
        position: usize,
        #[source]
        source: ParseIntError,
    },
}

/// Pristine Intcode program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    cells: Vec<i64>,
}

impl Program {
    /// Wrap already-decoded cells
    pub fn new(cells: Vec<i64>) -> Self {
        Self { cells }
    }

    /// Parse the comma-separated text form
    pub fn parse(text: &str) -> Result<Self, ProgramError> {
        let line = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or(ProgramError::Empty)?;

        let cells = line
            .split(',')
            .enumerate()
            .map(|(position, token)| {
                let token = token.trim();
                token
                    .parse::<i64>()
                    .map_err(|source| ProgramError::InvalidToken {
                        token: token.to_string(),
                        position,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(cells = cells.len(), "parsed program");
        Ok(Self { cells })
    }

    /// Read and parse a program file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProgramError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ProgramError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Program cells
    pub fn as_slice(&self) -> &[i64] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Fresh working copy for one run
    pub fn to_memory(&self) -> Vec<i64> {
        self.cells.clone()
    }
}

impl FromStr for Program {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<[i64]> for Program {
    fn as_ref(&self) -> &[i64] {
        &self.cells
    }
}

impl From<Vec<i64>> for Program {
    fn from(cells: Vec<i64>) -> Self {
        Self::new(cells)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", cell)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_line() {
        let program = Program::parse("1,9,10,3,2,3,11,0,99,30,40,50\n").unwrap();
        assert_eq!(program.len(), 12);
        assert_eq!(program.as_slice()[0], 1);
        assert_eq!(program.as_slice()[11], 50);
    }

    #[test]
    fn test_parse_negative_and_spaces() {
        let program = Program::parse(" 1, -2 ,3 ").unwrap();
        assert_eq!(program.as_slice(), &[1, -2, 3]);
    }

    #[test]
    fn test_parse_ignores_later_lines() {
        let program = Program::parse("\n1,2\n3,4\n").unwrap();
        assert_eq!(program.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Program::parse(""), Err(ProgramError::Empty)));
        assert!(matches!(Program::parse(" \n\n"), Err(ProgramError::Empty)));
    }

    #[test]
    fn test_parse_invalid_token() {
        match Program::parse("1,x,3") {
            Err(ProgramError::InvalidToken { token, position, .. }) => {
                assert_eq!(token, "x");
                assert_eq!(position, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_trailing_comma_rejected() {
        assert!(matches!(
            Program::parse("1,2,"),
            Err(ProgramError::InvalidToken { position: 2, .. })
        ));
    }

    #[test]
    fn test_display() {
        let program = Program::new(vec![1, 0, -5, 99]);
        assert_eq!(program.to_string(), "1,0,-5,99");
    }
}
