//! Machine memory
//!
//! Memory is a flat slice of `i64` cells. Addresses stored in the program are
//! plain integers, so every read and write goes through a bounds check that
//! turns a bad address into a [`Fault::OutOfBounds`] instead of a panic.

use crate::machine::Fault;

/// Bounds-checked cell access
pub trait Memory {
    /// Number of cells
    fn len(&self) -> usize;

    /// Whether memory has no cells
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the cell at a program-supplied address
    fn read(&self, address: i64) -> Result<i64, Fault>;

    /// Write the cell at a program-supplied address
    fn write(&mut self, address: i64, value: i64) -> Result<(), Fault>;

    /// Read the cell at an index computed by the interpreter itself
    fn cell(&self, index: usize) -> Result<i64, Fault> {
        self.read(index as i64)
    }
}

impl Memory for [i64] {
    fn len(&self) -> usize {
        <[i64]>::len(self)
    }

    fn read(&self, address: i64) -> Result<i64, Fault> {
        let index = resolve(address, <[i64]>::len(self))?;
        Ok(self[index])
    }

    fn write(&mut self, address: i64, value: i64) -> Result<(), Fault> {
        let index = resolve(address, <[i64]>::len(self))?;
        self[index] = value;
        Ok(())
    }
}

/// Convert an address to a slice index, rejecting negatives and overruns
fn resolve(address: i64, len: usize) -> Result<usize, Fault> {
    usize::try_from(address)
        .ok()
        .filter(|&index| index < len)
        .ok_or(Fault::OutOfBounds { address, len })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write() {
        let mut memory = vec![0i64; 4];
        memory.write(2, 42).unwrap();
        assert_eq!(memory.read(2), Ok(42));
        assert_eq!(memory.cell(2), Ok(42));
    }

    #[test]
    fn test_read_past_end() {
        let memory = vec![1i64, 2, 3];
        assert_eq!(
            memory.read(3),
            Err(Fault::OutOfBounds { address: 3, len: 3 })
        );
    }

    #[test]
    fn test_negative_address() {
        let mut memory = vec![1i64, 2, 3];
        assert_eq!(
            memory.write(-1, 7),
            Err(Fault::OutOfBounds { address: -1, len: 3 })
        );
        assert_eq!(memory, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty() {
        let memory: Vec<i64> = Vec::new();
        assert!(Memory::is_empty(memory.as_slice()));
        assert!(memory.read(0).is_err());
    }
}
