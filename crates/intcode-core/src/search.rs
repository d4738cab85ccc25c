//! Noun/verb parameter search
//!
//! Each trial copies the pristine program into a working buffer, writes the
//! noun to address 1 and the verb to address 2, runs the interpreter, and
//! compares address 0 against the target. Pairs are tried noun-major,
//! verb-minor and the first match wins.

use crate::machine::{execute, Fault};
use crate::memory::Memory;
use rayon::prelude::*;
use std::fmt;
use thiserror::Error;

/// Address holding the program's result
pub const OUTPUT_ADDRESS: i64 = 0;
/// Address the noun is written to
pub const NOUN_ADDRESS: i64 = 1;
/// Address the verb is written to
pub const VERB_ADDRESS: i64 = 2;
/// Exclusive upper bound for noun and verb
pub const DEFAULT_RANGE: i64 = 100;

/// Noun/verb input pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Parameters {
    pub noun: i64,
    pub verb: i64,
}

impl Parameters {
    pub fn new(noun: i64, verb: i64) -> Self {
        Self { noun, verb }
    }

    /// Combined answer, `100 * noun + verb`
    pub fn answer(&self) -> i64 {
        100 * self.noun + self.verb
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "noun={} verb={}", self.noun, self.verb)
    }
}

/// What to do when a trial faults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Stop the whole search and report the fault
    #[default]
    Abort,
    /// Treat the faulting pair as a non-match and keep going
    Skip,
}

/// Parameter search failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("no noun/verb pair in [0, {range}) produces {target}")]
    NoSolution { target: i64, range: i64 },
    #[error("trial {parameters} faulted: {fault}")]
    Trial {
        parameters: Parameters,
        #[source]
        fault: Fault,
    },
}

/// Search configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Search {
    range: i64,
    on_fault: FaultPolicy,
    parallel: bool,
}

impl Default for Search {
    fn default() -> Self {
        Self::new(DEFAULT_RANGE)
    }
}

impl Search {
    /// Search nouns and verbs in `[0, range)`, aborting on faults
    pub fn new(range: i64) -> Self {
        Self {
            range,
            on_fault: FaultPolicy::Abort,
            parallel: false,
        }
    }

    pub fn on_fault(mut self, policy: FaultPolicy) -> Self {
        self.on_fault = policy;
        self
    }

    /// Spread trials over the rayon thread pool
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn range(&self) -> i64 {
        self.range
    }

    /// Find the first pair whose run leaves `target` at address 0
    pub fn run(&self, pristine: &[i64], target: i64) -> Result<Parameters, SearchError> {
        tracing::debug!(
            target,
            range = self.range,
            parallel = self.parallel,
            policy = ?self.on_fault,
            "starting parameter search"
        );

        let found = if self.parallel {
            self.run_parallel(pristine, target)
        } else {
            self.run_sequential(pristine, target)
        };

        match found {
            Some(Ok(parameters)) => {
                tracing::debug!(%parameters, "found parameters");
                Ok(parameters)
            }
            Some(Err(err)) => {
                tracing::warn!(%err, "parameter search aborted");
                Err(err)
            }
            None => Err(SearchError::NoSolution {
                target,
                range: self.range,
            }),
        }
    }

    fn run_sequential(
        &self,
        pristine: &[i64],
        target: i64,
    ) -> Option<Result<Parameters, SearchError>> {
        let mut memory = pristine.to_vec();
        for noun in 0..self.range {
            for verb in 0..self.range {
                memory.copy_from_slice(pristine);
                let parameters = Parameters::new(noun, verb);
                let outcome = trial(&mut memory, parameters);
                if let Some(found) = self.judge(parameters, outcome, target) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn run_parallel(
        &self,
        pristine: &[i64],
        target: i64,
    ) -> Option<Result<Parameters, SearchError>> {
        let range = self.range;
        (0..range)
            .into_par_iter()
            .flat_map_iter(move |noun| (0..range).map(move |verb| Parameters::new(noun, verb)))
            .find_map_first(|parameters| {
                let mut memory = pristine.to_vec();
                let outcome = trial(&mut memory, parameters);
                self.judge(parameters, outcome, target)
            })
    }

    /// `Some` ends the search; `None` moves on to the next pair
    fn judge(
        &self,
        parameters: Parameters,
        outcome: Result<i64, Fault>,
        target: i64,
    ) -> Option<Result<Parameters, SearchError>> {
        match outcome {
            Ok(output) if output == target => Some(Ok(parameters)),
            Ok(_) => None,
            Err(fault) => match self.on_fault {
                FaultPolicy::Abort => Some(Err(SearchError::Trial { parameters, fault })),
                FaultPolicy::Skip => {
                    tracing::trace!(%parameters, %fault, "skipping faulted trial");
                    None
                }
            },
        }
    }
}

/// Seed `memory` with the pair, run it, and read the output cell
fn trial(memory: &mut [i64], parameters: Parameters) -> Result<i64, Fault> {
    memory.write(NOUN_ADDRESS, parameters.noun)?;
    memory.write(VERB_ADDRESS, parameters.verb)?;
    execute(memory)?;
    memory.read(OUTPUT_ADDRESS)
}

/// Fresh copy of `pristine` with the noun and verb written in
pub fn seeded_memory(pristine: &[i64], parameters: Parameters) -> Result<Vec<i64>, Fault> {
    let mut memory = pristine.to_vec();
    memory.write(NOUN_ADDRESS, parameters.noun)?;
    memory.write(VERB_ADDRESS, parameters.verb)?;
    Ok(memory)
}

/// Run a fresh copy of `pristine` with the given noun and verb and return
/// the value left at address 0
pub fn run_with_inputs(pristine: &[i64], parameters: Parameters) -> Result<i64, Fault> {
    let mut memory = seeded_memory(pristine, parameters)?;
    execute(&mut memory)?;
    memory.read(OUTPUT_ADDRESS)
}

/// Sequential search over `[0, range)`, aborting on the first faulting trial
pub fn find_parameters(
    pristine: &[i64],
    target: i64,
    range: i64,
) -> Result<Parameters, SearchError> {
    Search::new(range).run(pristine, target)
}

/// Parallel search over `[0, range)`, returning the same result as
/// [`find_parameters`]
pub fn find_parameters_parallel(
    pristine: &[i64],
    target: i64,
    range: i64,
) -> Result<Parameters, SearchError> {
    Search::new(range).parallel(true).run(pristine, target)
}
