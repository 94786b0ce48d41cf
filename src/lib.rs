//! This crate provides the execution engine for an educational automata simulator.
//! It models Turing machines and deterministic finite-state automata as state graphs over
//! a finite alphabet, runs them step by step against an observable tape, validates them
//! for determinism and consistency, and loads and stores their definitions.

pub mod alphabet;
pub mod analyzer;
pub mod config;
pub mod encoder;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod persist;
pub mod programs;
pub mod simulator;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
pub use alphabet::Alphabet;
pub use analyzer::{analyze, AnalysisError};
pub use config::{RunConfig, Speed};
pub use encoder::encode;
pub use loader::{Format, ProgramLoader};
pub use machine::{Definition, Machine, Position, State, Transition};
pub use parser::parse;
pub use persist::MachineDocument;
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
pub use simulator::Simulator;
pub use tape::{ArrayTape, SharedTape, SparseTape, Tape, TapeEvent};
/// Re-exports the symbol constants, labels, actions and error type shared by every module.
pub use types::{
    Action, Halt, InputSymbol, MachineError, MachineKind, NamingScheme, StateId, Step,
    TransitionId, BLANK_SYMBOL, MAX_EXECUTION_STEPS,
};
