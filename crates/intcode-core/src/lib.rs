//! Intcode Core - stored-program integer machine
//!
//! This crate provides the Intcode interpreter and the noun/verb parameter
//! search built on top of it. It performs no I/O beyond reading a program
//! file; printing results is left to the CLI crate.

#![forbid(unsafe_code)]

/// Bounds-checked access to machine memory
pub mod memory;
/// Opcode decoding
pub mod opcode;
/// Interpreter and machine state
pub mod machine;
/// Program loading and parsing
pub mod program;
/// Noun/verb parameter search
pub mod search;
