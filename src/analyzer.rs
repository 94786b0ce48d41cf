//! This module provides the pre-flight checks a host runs before starting a computation:
//! unset symbols, determinism, alphabet consistency, start state presence and
//! reachability. None of the checks mutate the machine.

use crate::alphabet::Alphabet;
use crate::machine::Machine;
use crate::types::{Action, InputSymbol, MachineError, MachineKind, TransitionId};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// Represents the findings of analyzing a machine.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// No state is flagged as the start state.
    NoStartState,
    /// A transition has an unset input label or write symbol.
    UndefinedSymbols(String),
    /// Two transitions from `state` can both fire on `symbol`.
    Nondeterministic { state: String, symbol: String },
    /// Transitions that read or write symbols outside the machine's alphabet.
    InconsistentTransitions(Vec<String>),
    /// States that cannot be reached from the start state.
    UnreachableStates(Vec<String>),
    /// No state is flagged final, so the machine can never accept.
    NoFinalState,
}

impl From<AnalysisError> for MachineError {
    /// Converts an `AnalysisError` into the matching `MachineError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::NoStartState => MachineError::NoStartState,
            AnalysisError::UndefinedSymbols(reason) => MachineError::UndefinedTransition(reason),
            AnalysisError::Nondeterministic { state, symbol } => MachineError::Nondeterministic(
                format!("state {state} has more than one transition on {symbol}"),
            ),
            AnalysisError::InconsistentTransitions(transitions) => {
                MachineError::ValidationError(format!(
                    "Transitions use symbols outside the alphabet: {:?}",
                    transitions
                ))
            }
            AnalysisError::UnreachableStates(states) => MachineError::ValidationError(format!(
                "Unreachable states detected: {:?}",
                states
            )),
            AnalysisError::NoFinalState => {
                MachineError::ValidationError("No final state defined".to_string())
            }
        }
    }
}

/// Runs every check against `machine`.
///
/// Findings that make execution impossible or meaningless are returned as the first
/// error: a missing start state, unset symbols, symbols outside the alphabet, and
/// nondeterminism in a DFSA. The remaining findings (unreachable states, no final state,
/// nondeterminism in a Turing machine, which the simulator resolves at random) are
/// logged and returned as warnings.
pub fn analyze(machine: &Machine) -> Result<Vec<AnalysisError>, MachineError> {
    check_start_state(machine)?;
    check_undefined_symbols(machine)?;
    check_alphabet(machine)?;

    let mut warnings = Vec::new();

    if let Err(e) = check_determinism(machine) {
        if machine.kind() == MachineKind::Dfsa {
            return Err(e.into());
        }
        warnings.push(e);
    }

    warnings.extend(
        [check_unreachable_states, check_final_state]
            .iter()
            .filter_map(|f| f(machine).err()),
    );

    for warning in &warnings {
        warn!(machine = machine.name(), "{}", MachineError::from(warning.clone()));
    }

    Ok(warnings)
}

/// Checks that a start state is flagged.
pub fn check_start_state(machine: &Machine) -> Result<(), AnalysisError> {
    machine
        .start_state()
        .map(|_| ())
        .ok_or(AnalysisError::NoStartState)
}

/// Checks that every transition has an input label and, for write actions, a symbol.
pub fn check_undefined_symbols(machine: &Machine) -> Result<(), AnalysisError> {
    for (id, transition) in machine.transitions() {
        if transition.input() == InputSymbol::Undefined {
            return Err(AnalysisError::UndefinedSymbols(format!(
                "{} has no input symbol",
                machine.describe(id)
            )));
        }

        if transition.action() == Action::Undefined {
            return Err(AnalysisError::UndefinedSymbols(format!(
                "{} has no action symbol",
                machine.describe(id)
            )));
        }
    }

    Ok(())
}

/// Checks that no two transitions from the same state can fire on the same symbol.
///
/// Any concrete symbol collides with a second transition on the same symbol and with a
/// wildcard or `otherwise` transition from the same state. Two wildcards or two
/// `otherwise` transitions collide with each other.
pub fn check_determinism(machine: &Machine) -> Result<(), AnalysisError> {
    for (state_id, state) in machine.states() {
        let mut symbols = HashSet::new();
        let mut wildcards = 0;
        let mut otherwise = 0;

        for (_, transition) in machine.outgoing(state_id) {
            match transition.input() {
                InputSymbol::Symbol(c) => {
                    if !symbols.insert(c) {
                        return Err(nondeterministic(state.label(), format!("symbol '{c}'")));
                    }
                }
                InputSymbol::Wildcard => wildcards += 1,
                InputSymbol::Otherwise => otherwise += 1,
                InputSymbol::Undefined => {}
            }
        }

        if wildcards > 1 {
            return Err(nondeterministic(state.label(), "the wildcard".to_string()));
        }

        if otherwise > 1 {
            return Err(nondeterministic(state.label(), "otherwise".to_string()));
        }

        if wildcards + otherwise > 0 {
            if let Some(c) = symbols.iter().min() {
                let overlap = if wildcards > 0 { "wildcard" } else { "otherwise" };
                return Err(nondeterministic(
                    state.label(),
                    format!("symbol '{c}' ({overlap} overlap)"),
                ));
            }
        }
    }

    Ok(())
}

fn nondeterministic(state: &str, symbol: String) -> AnalysisError {
    AnalysisError::Nondeterministic {
        state: state.to_string(),
        symbol,
    }
}

/// Returns the transitions whose input label or write symbol is a concrete symbol not in
/// `alphabet`. Wildcard, `otherwise` and empty actions never conflict.
pub fn inconsistent_transitions(machine: &Machine, alphabet: &Alphabet) -> Vec<TransitionId> {
    machine
        .transitions()
        .filter(|(_, transition)| {
            let bad_input = matches!(
                transition.input(),
                InputSymbol::Symbol(c) if !alphabet.contains_symbol(c)
            );
            let bad_write = matches!(
                transition.action(),
                Action::Write(c) if !alphabet.contains_symbol(c)
            );
            bad_input || bad_write
        })
        .map(|(id, _)| id)
        .collect()
}

/// Checks that the machine's transitions agree with its own alphabet.
pub fn check_alphabet(machine: &Machine) -> Result<(), AnalysisError> {
    let inconsistent = inconsistent_transitions(machine, machine.alphabet());
    if inconsistent.is_empty() {
        return Ok(());
    }

    Err(AnalysisError::InconsistentTransitions(
        inconsistent.into_iter().map(|id| machine.describe(id)).collect(),
    ))
}

/// Checks for states that no sequence of transitions reaches from the start state.
///
/// Without a start state nothing is reachable, which [`check_start_state`] reports, so
/// this check passes.
pub fn check_unreachable_states(machine: &Machine) -> Result<(), AnalysisError> {
    let Some(start) = machine.start_state() else {
        return Ok(());
    };

    let mut visited = HashSet::new();
    let mut queue = vec![start];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        for (_, transition) in machine.outgoing(state) {
            if !visited.contains(&transition.to()) {
                queue.push(transition.to());
            }
        }
    }

    let unreachable: BTreeMap<_, _> = machine
        .states()
        .filter(|(id, _)| !visited.contains(id))
        .map(|(id, state)| (id, state.label().to_string()))
        .collect();

    if !unreachable.is_empty() {
        return Err(AnalysisError::UnreachableStates(
            unreachable.into_values().collect(),
        ));
    }

    Ok(())
}

/// Checks that at least one state is final.
pub fn check_final_state(machine: &Machine) -> Result<(), AnalysisError> {
    match machine.final_states().next() {
        Some(_) => Ok(()),
        None => Err(AnalysisError::NoFinalState),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::Position;
    use crate::types::StateId;

    fn create_machine(kind: MachineKind) -> (Machine, StateId, StateId) {
        let mut machine = Machine::new(kind, Alphabet::binary());
        let q0 = machine.add_state("q0", Position::default()).unwrap();
        let q1 = machine.add_state("q1", Position::default()).unwrap();
        machine.set_start_state(q0, true).unwrap();
        machine.set_final_state(q1, true).unwrap();
        (machine, q0, q1)
    }

    #[test]
    fn test_two_transitions_on_same_symbol_are_nondeterministic() {
        let (mut machine, q0, q1) = create_machine(MachineKind::Turing);
        machine
            .add_transition(q0, q1, InputSymbol::symbol('1'), Action::Right)
            .unwrap();
        machine
            .add_transition(q0, q0, InputSymbol::symbol('1'), Action::Left)
            .unwrap();

        assert_eq!(
            check_determinism(&machine),
            Err(AnalysisError::Nondeterministic {
                state: "q0".to_string(),
                symbol: "symbol '1'".to_string(),
            })
        );
        assert!(!machine.is_deterministic());
    }

    #[test]
    fn test_symbol_and_wildcard_are_nondeterministic() {
        let (mut machine, q0, q1) = create_machine(MachineKind::Turing);
        machine
            .add_transition(q0, q1, InputSymbol::symbol('1'), Action::Right)
            .unwrap();
        machine
            .add_transition(q0, q0, InputSymbol::Wildcard, Action::Right)
            .unwrap();

        let error = machine.check_deterministic().unwrap_err();
        assert!(matches!(error, MachineError::Nondeterministic(_)));
        assert!(error.to_string().contains("q0"));
        assert!(error.to_string().contains("'1'"));
    }

    #[test]
    fn test_disjoint_symbols_are_deterministic() {
        let (mut machine, q0, q1) = create_machine(MachineKind::Turing);
        machine
            .add_transition(q0, q1, InputSymbol::symbol('1'), Action::Right)
            .unwrap();
        machine
            .add_transition(q0, q0, InputSymbol::symbol('0'), Action::Right)
            .unwrap();
        machine
            .add_transition(q1, q1, InputSymbol::symbol('1'), Action::Right)
            .unwrap();

        assert!(machine.is_deterministic());
        assert!(check_determinism(&machine).is_ok());
    }

    #[test]
    fn test_symbol_and_otherwise_are_nondeterministic() {
        let (mut machine, q0, q1) = create_machine(MachineKind::Turing);
        machine
            .add_transition(q1, q1, InputSymbol::Otherwise, Action::Right)
            .unwrap();
        assert!(machine.is_deterministic());

        machine
            .add_transition(q1, q0, InputSymbol::symbol('0'), Action::Left)
            .unwrap();
        assert_eq!(
            check_determinism(&machine),
            Err(AnalysisError::Nondeterministic {
                state: "q1".to_string(),
                symbol: "symbol '0' (otherwise overlap)".to_string(),
            })
        );
    }

    #[test]
    fn test_undefined_symbols_are_reported() {
        let (mut machine, q0, q1) = create_machine(MachineKind::Turing);
        assert_eq!(machine.has_undefined_symbols(), None);

        let id = machine
            .add_transition(q0, q1, InputSymbol::Undefined, Action::Right)
            .unwrap();
        let reason = machine.has_undefined_symbols().unwrap();
        assert!(reason.contains("no input symbol"));

        machine.set_input(id, InputSymbol::symbol('1')).unwrap();
        machine.set_action(id, Action::Undefined).unwrap();
        let reason = machine.has_undefined_symbols().unwrap();
        assert!(reason.contains("no action symbol"));
    }

    #[test]
    fn test_alphabet_consistency() {
        let (mut machine, q0, q1) = create_machine(MachineKind::Turing);
        machine
            .add_transition(q0, q1, InputSymbol::symbol('1'), Action::Right)
            .unwrap();
        let bad_write = machine
            .add_transition(q0, q0, InputSymbol::symbol('0'), Action::write('X'))
            .unwrap();
        let bad_input = machine
            .add_transition(q1, q1, InputSymbol::symbol('A'), Action::Empty)
            .unwrap();
        machine
            .add_transition(q1, q0, InputSymbol::Wildcard, Action::Left)
            .unwrap();

        let binary = Alphabet::binary();
        assert!(!machine.is_consistent_with_alphabet(&binary));
        assert_eq!(
            machine.inconsistent_transitions(&binary),
            vec![bad_write, bad_input]
        );

        let mut wide = binary.clone();
        wide.set_alphabetical(true);
        assert!(machine.is_consistent_with_alphabet(&wide));
    }

    #[test]
    fn test_unreachable_states() {
        let (mut machine, q0, q1) = create_machine(MachineKind::Turing);
        machine
            .add_transition(q0, q1, InputSymbol::symbol('1'), Action::Right)
            .unwrap();
        machine.add_state("orphan", Position::default()).unwrap();

        assert_eq!(
            check_unreachable_states(&machine),
            Err(AnalysisError::UnreachableStates(vec!["orphan".to_string()]))
        );
    }

    #[test]
    fn test_analyze_fatal_findings() {
        let mut machine = Machine::new(MachineKind::Turing, Alphabet::binary());
        machine.add_state("q0", Position::default()).unwrap();
        assert_eq!(analyze(&machine), Err(MachineError::NoStartState));

        let (mut dfsa, a, b) = create_machine(MachineKind::Dfsa);
        dfsa.add_transition(a, b, InputSymbol::symbol('1'), Action::Right)
            .unwrap();
        dfsa.add_transition(a, a, InputSymbol::symbol('1'), Action::Right)
            .unwrap();
        assert!(matches!(
            analyze(&dfsa),
            Err(MachineError::Nondeterministic(_))
        ));
    }

    #[test]
    fn test_analyze_warnings() {
        let (mut machine, q0, q1) = create_machine(MachineKind::Turing);
        machine
            .add_transition(q0, q1, InputSymbol::symbol('1'), Action::Right)
            .unwrap();
        machine
            .add_transition(q0, q0, InputSymbol::Wildcard, Action::Right)
            .unwrap();
        machine.add_state("orphan", Position::default()).unwrap();

        let warnings = analyze(&machine).unwrap();
        assert_eq!(warnings.len(), 2);
        assert!(matches!(warnings[0], AnalysisError::Nondeterministic { .. }));
        assert_eq!(
            warnings[1],
            AnalysisError::UnreachableStates(vec!["orphan".to_string()])
        );
    }
}
