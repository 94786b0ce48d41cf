//! This module defines the core data structures and types shared by the machine engine,
//! including symbol constants, transition labels and actions, execution results, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// The blank symbol every tape cell holds until written.
pub const BLANK_SYMBOL: char = '_';
/// The input label that matches any tape symbol.
pub const WILDCARD_SYMBOL: char = '*';
/// The placeholder printed for a label or write symbol that has not been assigned yet.
pub const UNDEFINED_SYMBOL: char = '?';
/// The write symbol meaning "write nothing". Distinct from writing [`BLANK_SYMBOL`].
pub const EMPTY_ACTION_SYMBOL: char = '-';
/// The maximum number of steps a batch run executes when no limit is configured.
pub const MAX_EXECUTION_STEPS: usize = 10000;

/// Whether `c` is one of the reserved control symbols that never appear on a tape.
pub fn is_control_symbol(c: char) -> bool {
    matches!(c, WILDCARD_SYMBOL | UNDEFINED_SYMBOL | EMPTY_ACTION_SYMBOL)
}

/// Normalizes a user-entered symbol: letters are folded to uppercase and a space
/// is read as the blank symbol.
pub fn normalize_symbol(c: char) -> char {
    if c == ' ' {
        BLANK_SYMBOL
    } else {
        c.to_ascii_uppercase()
    }
}

/// The two machine models the engine can execute.
///
/// The kind selects the halting/acceptance policy; graph, alphabet and tape handling
/// are shared.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineKind {
    /// A Turing machine: reads, writes and moves freely over the tape.
    #[default]
    Turing,
    /// A deterministic finite-state automaton: consumes its input left to right.
    Dfsa,
}

impl MachineKind {
    /// Returns the halting outcome for a configuration, or `None` if the
    /// computation should continue.
    ///
    /// A Turing machine halts successfully only in a final state with its head parked.
    /// A DFSA halts when it reaches the end of its input (a blank cell) and accepts
    /// iff it is in a final state there.
    pub fn halt(self, is_final: bool, symbol: char, parked: bool) -> Option<Halt> {
        match self {
            MachineKind::Turing => (is_final && parked).then_some(Halt::Accepted),
            MachineKind::Dfsa => (symbol == BLANK_SYMBOL).then_some(if is_final {
                Halt::Accepted
            } else {
                Halt::Rejected
            }),
        }
    }

    /// Whether a configuration counts as halted for run-to-halt loops.
    ///
    /// For a Turing machine this only requires a final state; whether the head is
    /// parked decides if the halt was successful.
    pub fn is_at_rest(self, is_final: bool, symbol: char) -> bool {
        match self {
            MachineKind::Turing => is_final,
            MachineKind::Dfsa => symbol == BLANK_SYMBOL,
        }
    }

    /// Whether this kind allows more than one final state.
    pub fn allows_multiple_finals(self) -> bool {
        matches!(self, MachineKind::Dfsa)
    }
}

impl fmt::Display for MachineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineKind::Turing => f.pad("tm"),
            MachineKind::Dfsa => f.pad("dfsa"),
        }
    }
}

/// How new states are labelled when the editor creates them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamingScheme {
    /// New states take the first unused `qN` label; existing labels are never touched.
    #[default]
    General,
    /// Labels are kept as a contiguous `q0..qN` sequence in creation order.
    Normalized,
}

impl fmt::Display for NamingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingScheme::General => write!(f, "general"),
            NamingScheme::Normalized => write!(f, "normalized"),
        }
    }
}

/// Identifies a state within its owning machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) usize);

/// Identifies a transition within its owning machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(pub(crate) usize);

/// The input label of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputSymbol {
    /// Matches exactly this (normalized) tape symbol.
    Symbol(char),
    /// Matches any tape symbol.
    Wildcard,
    /// Matches only when no `Symbol` or `Wildcard` transition from the same state matches.
    Otherwise,
    /// Not assigned yet. Never valid for execution.
    Undefined,
}

impl InputSymbol {
    /// Creates a concrete label, normalizing the symbol.
    pub fn symbol(c: char) -> Self {
        InputSymbol::Symbol(normalize_symbol(c))
    }

    /// Whether this label is a direct (concrete or wildcard) match for `symbol`.
    pub fn matches(&self, symbol: char) -> bool {
        match self {
            InputSymbol::Symbol(c) => *c == normalize_symbol(symbol),
            InputSymbol::Wildcard => true,
            InputSymbol::Otherwise | InputSymbol::Undefined => false,
        }
    }
}

impl fmt::Display for InputSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSymbol::Symbol(c) => write!(f, "{c}"),
            InputSymbol::Wildcard => write!(f, "{WILDCARD_SYMBOL}"),
            InputSymbol::Otherwise => write!(f, "otherwise"),
            InputSymbol::Undefined => write!(f, "{UNDEFINED_SYMBOL}"),
        }
    }
}

/// What a transition does to the tape.
///
/// `Write`, `Empty` and `Undefined` all leave the head in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Move the head one cell to the left.
    Left,
    /// Move the head one cell to the right.
    Right,
    /// Write a symbol under the head.
    Write(char),
    /// Write nothing.
    Empty,
    /// The write symbol has not been assigned yet.
    Undefined,
}

impl Action {
    /// Creates a write action, normalizing the symbol. The empty-action sentinel
    /// maps to [`Action::Empty`].
    pub fn write(c: char) -> Self {
        match c {
            EMPTY_ACTION_SYMBOL => Action::Empty,
            UNDEFINED_SYMBOL => Action::Undefined,
            c => Action::Write(normalize_symbol(c)),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Left => write!(f, "move L"),
            Action::Right => write!(f, "move R"),
            Action::Write(c) => write!(f, "write {c}"),
            Action::Empty => write!(f, "stay"),
            Action::Undefined => write!(f, "{UNDEFINED_SYMBOL}"),
        }
    }
}

/// Represents the outcome of a simulator step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The machine performed a step and continues execution.
    Continue,
    /// The computation has finished.
    Halt(Halt),
}

/// How a computation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// Turing machine: final state with the head parked. DFSA: final state at end of input.
    Accepted,
    /// DFSA only: end of input (or no move) in a non-final state.
    Rejected,
}

/// Represents the errors that can occur while editing, loading or running a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// The head was moved left of cell 0. The head is back at 0 when this is returned.
    #[error("Tape head moved past the left end of the tape")]
    TapeBounds,
    /// A step was attempted with no valid transition to apply.
    #[error("Undefined transition: {0}")]
    UndefinedTransition(String),
    /// The machine has no start state.
    #[error("No start state defined")]
    NoStartState,
    /// More than one state is flagged as the start state.
    #[error("Multiple start states: {0:?}")]
    MultipleStartStates(Vec<String>),
    /// Two or more transitions match the same state and symbol.
    #[error("Machine is nondeterministic: {0}")]
    Nondeterministic(String),
    /// A state label is already used in this machine.
    #[error("Duplicate state label: {0}")]
    DuplicateState(String),
    /// A state id or label does not refer to a live state.
    #[error("Unknown state: {0}")]
    UnknownState(String),
    /// A transition id does not refer to a live transition.
    #[error("Unknown transition: {0}")]
    UnknownTransition(String),
    /// A control symbol was used where a tape symbol is required.
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
    /// The action is not allowed for this kind of machine.
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    /// A machine definition could not be parsed.
    #[error("Definition parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// A machine definition is structurally or logically invalid.
    #[error("Machine validation error: {0}")]
    ValidationError(String),
    /// Reading or writing a machine file failed.
    #[error("File error: {0}")]
    FileError(String),
    /// A JSON document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for MachineError {
    fn from(error: serde_json::Error) -> Self {
        MachineError::SerializationError(error.to_string())
    }
}
