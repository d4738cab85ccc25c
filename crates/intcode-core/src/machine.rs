//! Intcode interpreter
//!
//! Runs the fetch-decode-execute cycle over a memory buffer in place. Each
//! instruction is an opcode followed by positional operands; execution stops
//! on `99`, on running off the end of memory, or on a fault.

use crate::memory::Memory;
use crate::opcode::Opcode;
use thiserror::Error;

/// Unrecoverable condition raised while executing a program
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// Cell at `ip` holds a value that is not a known opcode
    #[error("invalid opcode {opcode} at index {ip}")]
    InvalidOpcode { opcode: i64, ip: usize },
    /// An operand, source or destination address lies outside memory
    #[error("address {address} out of bounds for memory of length {len}")]
    OutOfBounds { address: i64, len: usize },
    /// Result of an arithmetic instruction does not fit in a cell
    #[error("arithmetic overflow at index {ip}")]
    Overflow { ip: usize },
    /// Execution did not halt within the allowed number of instructions
    #[error("step limit of {limit} instructions exceeded")]
    StepLimitExceeded { limit: u64 },
}

/// Machine execution state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
    Faulted(Fault),
}

impl State {
    /// Halted and Faulted are terminal
    pub fn is_terminal(&self) -> bool {
        !matches!(self, State::Running)
    }
}

/// Outcome of a single successfully executed instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Advance(usize),
    Halt,
}

/// Execute the instruction at `ip`.
///
/// Memory is written only after every read has succeeded, so a faulting
/// instruction leaves memory untouched.
fn step_at(memory: &mut [i64], ip: usize) -> Result<Step, Fault> {
    let raw = memory.cell(ip)?;
    let opcode = Opcode::try_from(raw).map_err(|opcode| Fault::InvalidOpcode { opcode, ip })?;

    match opcode {
        Opcode::Halt => {
            tracing::trace!(ip, "halt");
            Ok(Step::Halt)
        }
        Opcode::Add | Opcode::Multiply => {
            let lhs_addr = memory.cell(ip + 1)?;
            let rhs_addr = memory.cell(ip + 2)?;
            let dst = memory.cell(ip + 3)?;

            let lhs = memory.read(lhs_addr)?;
            let rhs = memory.read(rhs_addr)?;
            let value = opcode.apply(lhs, rhs).ok_or(Fault::Overflow { ip })?;

            tracing::trace!(ip, %opcode, lhs_addr, rhs_addr, dst, value);
            memory.write(dst, value)?;
            Ok(Step::Advance(ip + opcode.width()))
        }
    }
}

/// Run `memory` to completion in place.
///
/// Returns `Ok(())` once the program halts or the instruction pointer runs
/// past the end of memory. The final machine state stays in `memory`.
pub fn execute(memory: &mut [i64]) -> Result<(), Fault> {
    let mut ip = 0;
    while ip < memory.len() {
        match step_at(memory, ip)? {
            Step::Advance(next) => ip = next,
            Step::Halt => break,
        }
    }
    Ok(())
}

/// Intcode machine owning its memory
#[derive(Debug, Clone)]
pub struct Machine {
    memory: Vec<i64>,
    /// Instruction pointer
    ip: usize,
    state: State,
    /// Instructions executed, halt included
    steps: u64,
}

impl Machine {
    /// Create a machine at `ip = 0` over the given memory
    pub fn new(memory: Vec<i64>) -> Self {
        Self {
            memory,
            ip: 0,
            state: State::Running,
            steps: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Current instruction pointer
    pub fn ip(&self) -> usize {
        self.ip
    }

    /// Number of instructions executed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Current memory contents
    pub fn memory(&self) -> &[i64] {
        &self.memory
    }

    /// Consume the machine and return its memory
    pub fn into_memory(self) -> Vec<i64> {
        self.memory
    }

    /// Execute one instruction. Does nothing once the machine is terminal.
    pub fn step(&mut self) -> &State {
        if self.state.is_terminal() {
            return &self.state;
        }

        if self.ip >= self.memory.len() {
            tracing::debug!(ip = self.ip, "instruction pointer ran past end of memory");
            self.state = State::Halted;
            return &self.state;
        }

        match step_at(&mut self.memory, self.ip) {
            Ok(Step::Advance(next)) => {
                self.steps += 1;
                self.ip = next;
            }
            Ok(Step::Halt) => {
                self.steps += 1;
                self.state = State::Halted;
            }
            Err(fault) => {
                tracing::debug!(ip = self.ip, %fault, "machine faulted");
                self.state = State::Faulted(fault);
            }
        }
        &self.state
    }

    /// Run until the machine halts or faults
    pub fn run(&mut self) -> Result<(), Fault> {
        loop {
            match self.step() {
                State::Running => {}
                State::Halted => return Ok(()),
                State::Faulted(fault) => return Err(fault.clone()),
            }
        }
    }

    /// Run, faulting with [`Fault::StepLimitExceeded`] if the machine is
    /// still running after `limit` instructions
    pub fn run_with_limit(&mut self, limit: u64) -> Result<(), Fault> {
        while self.state == State::Running {
            if self.steps >= limit && self.ip < self.memory.len() {
                self.state = State::Faulted(Fault::StepLimitExceeded { limit });
                break;
            }
            self.step();
        }

        match &self.state {
            State::Faulted(fault) => Err(fault.clone()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_initial_state() {
        let machine = Machine::new(vec![99]);
        assert_eq!(machine.ip(), 0);
        assert_eq!(machine.steps(), 0);
        assert_eq!(machine.state(), &State::Running);
    }

    #[test]
    fn test_step_advances_by_four() {
        let mut machine = Machine::new(vec![1, 0, 0, 0, 99]);
        assert_eq!(machine.step(), &State::Running);
        assert_eq!(machine.ip(), 4);
        assert_eq!(machine.step(), &State::Halted);
        assert_eq!(machine.steps(), 2);
    }

    #[test]
    fn test_terminal_state_is_sticky() {
        let mut machine = Machine::new(vec![99, 1, 0, 0]);
        machine.run().unwrap();
        let before = machine.memory().to_vec();
        assert_eq!(machine.step(), &State::Halted);
        assert_eq!(machine.memory(), before.as_slice());
        assert_eq!(machine.steps(), 1);
    }

    #[test]
    fn test_fault_leaves_memory_untouched() {
        let mut memory = vec![1, 0, 0, 9, 99];
        let err = execute(&mut memory).unwrap_err();
        assert_eq!(err, Fault::OutOfBounds { address: 9, len: 5 });
        assert_eq!(memory, vec![1, 0, 0, 9, 99]);
    }

    #[test]
    fn test_truncated_instruction() {
        let mut memory = vec![1, 0, 0];
        assert_eq!(
            execute(&mut memory),
            Err(Fault::OutOfBounds { address: 3, len: 3 })
        );
    }

    #[test]
    fn test_overflow() {
        let mut memory = vec![2, 5, 5, 0, 99, i64::MAX];
        assert_eq!(execute(&mut memory), Err(Fault::Overflow { ip: 0 }));
    }

    #[test]
    fn test_run_off_end_halts() {
        let mut machine = Machine::new(vec![1, 0, 0, 0]);
        machine.run().unwrap();
        assert_eq!(machine.state(), &State::Halted);
        assert_eq!(machine.memory(), &[2, 0, 0, 0]);
    }

    #[test]
    fn test_step_limit() {
        let mut machine = Machine::new(vec![1, 0, 0, 0, 1, 0, 0, 0, 99]);
        assert_eq!(
            machine.run_with_limit(2),
            Err(Fault::StepLimitExceeded { limit: 2 })
        );
        assert_eq!(machine.steps(), 2);

        let mut machine = Machine::new(vec![1, 0, 0, 0, 1, 0, 0, 0, 99]);
        assert_eq!(machine.run_with_limit(3), Ok(()));
        assert_eq!(machine.memory()[0], 4);
    }
}
