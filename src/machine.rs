//! This module defines the [`Machine`] struct, the state/transition graph shared by Turing
//! machines and DFSAs. It owns the alphabet and the naming scheme, keeps the graph free of
//! dangling transitions and duplicate labels, resolves candidate moves and applies a single
//! transition to a tape.

use crate::alphabet::Alphabet;
use crate::analyzer;
use crate::tape::Tape;
use crate::types::{
    is_control_symbol, Action, InputSymbol, MachineError, MachineKind, NamingScheme, StateId,
    TransitionId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Layout position of a state in the diagram. Never used by execution.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A named node of the machine graph.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    label: String,
    start: bool,
    accepting: bool,
    position: Position,
}

impl State {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_start(&self) -> bool {
        self.start
    }

    pub fn is_final(&self) -> bool {
        self.accepting
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

/// A directed edge between two states, labelled with an input symbol and an action.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    from: StateId,
    to: StateId,
    input: InputSymbol,
    action: Action,
}

impl Transition {
    pub fn from(&self) -> StateId {
        self.from
    }

    pub fn to(&self) -> StateId {
        self.to
    }

    pub fn input(&self) -> InputSymbol {
        self.input
    }

    pub fn action(&self) -> Action {
        self.action
    }
}

/// A machine together with the tape content it is meant to run on.
#[derive(Debug, Clone)]
pub struct Definition {
    pub machine: Machine,
    /// Initial tape content, cell 0 first.
    pub tape: String,
}

impl Definition {
    pub fn new(machine: Machine, tape: impl Into<String>) -> Self {
        Self {
            machine,
            tape: tape.into(),
        }
    }

    pub fn name(&self) -> &str {
        self.machine.name()
    }
}

/// A Turing machine or DFSA: states, transitions, alphabet and naming scheme.
///
/// States and transitions are addressed by ids that stay valid until the element is
/// removed. Iteration always follows creation order.
#[derive(Debug, Clone)]
pub struct Machine {
    name: String,
    kind: MachineKind,
    alphabet: Alphabet,
    naming: NamingScheme,
    states: BTreeMap<StateId, State>,
    transitions: BTreeMap<TransitionId, Transition>,
    next_state: usize,
    next_transition: usize,
}

impl Machine {
    /// Creates an empty machine of the given kind over `alphabet`.
    pub fn new(kind: MachineKind, alphabet: Alphabet) -> Self {
        Self {
            name: String::from("Untitled"),
            kind,
            alphabet,
            naming: NamingScheme::default(),
            states: BTreeMap::new(),
            transitions: BTreeMap::new(),
            next_state: 0,
            next_transition: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> MachineKind {
        self.kind
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Commits an edited copy of the alphabet.
    pub fn set_alphabet(&mut self, alphabet: Alphabet) {
        self.alphabet = alphabet;
    }

    pub fn naming(&self) -> NamingScheme {
        self.naming
    }

    /// Switches the naming scheme. Switching to [`NamingScheme::Normalized`] relabels
    /// every state immediately.
    pub fn set_naming(&mut self, naming: NamingScheme) {
        self.naming = naming;
        if naming == NamingScheme::Normalized {
            self.renumber();
        }
    }

    // --- states ---

    /// Adds a state with an explicit label.
    pub fn add_state(
        &mut self,
        label: impl Into<String>,
        position: Position,
    ) -> Result<StateId, MachineError> {
        let label = label.into();
        self.check_label(&label, None)?;

        let id = StateId(self.next_state);
        self.next_state += 1;
        self.states.insert(
            id,
            State {
                label,
                start: false,
                accepting: false,
                position,
            },
        );
        Ok(id)
    }

    /// Adds a state labelled by the naming scheme: the first unused `qN`.
    pub fn create_state(&mut self, position: Position) -> StateId {
        let label = self.next_label();
        let id = StateId(self.next_state);
        self.next_state += 1;
        self.states.insert(
            id,
            State {
                label,
                start: false,
                accepting: false,
                position,
            },
        );
        id
    }

    /// Removes a state together with every transition entering or leaving it.
    pub fn remove_state(&mut self, id: StateId) -> Result<State, MachineError> {
        let state = self
            .states
            .remove(&id)
            .ok_or_else(|| MachineError::UnknownState(format!("{id:?}")))?;

        let before = self.transitions.len();
        self.transitions.retain(|_, t| t.from != id && t.to != id);
        debug!(
            state = state.label(),
            removed = before - self.transitions.len(),
            "removed state and its transitions"
        );

        if self.naming == NamingScheme::Normalized {
            self.renumber();
        }
        Ok(state)
    }

    pub fn rename_state(
        &mut self,
        id: StateId,
        label: impl Into<String>,
    ) -> Result<(), MachineError> {
        let label = label.into();
        self.check_label(&label, Some(id))?;
        self.state_mut(id)?.label = label;
        Ok(())
    }

    /// Flags or unflags `id` as the start state. Flagging clears any other start state.
    pub fn set_start_state(&mut self, id: StateId, start: bool) -> Result<(), MachineError> {
        self.state_mut(id)?;
        if start {
            for state in self.states.values_mut() {
                state.start = false;
            }
        }
        self.state_mut(id)?.start = start;
        Ok(())
    }

    /// Flags or unflags `id` as final. A Turing machine keeps at most one final state, so
    /// flagging one clears the others.
    pub fn set_final_state(&mut self, id: StateId, accepting: bool) -> Result<(), MachineError> {
        self.state_mut(id)?;
        if accepting && !self.kind.allows_multiple_finals() {
            for state in self.states.values_mut() {
                state.accepting = false;
            }
        }
        self.state_mut(id)?.accepting = accepting;
        Ok(())
    }

    pub fn move_state(&mut self, id: StateId, position: Position) -> Result<(), MachineError> {
        self.state_mut(id)?.position = position;
        Ok(())
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(&id)
    }

    pub fn state_by_label(&self, label: &str) -> Option<StateId> {
        self.states
            .iter()
            .find(|(_, state)| state.label == label)
            .map(|(id, _)| *id)
    }

    /// Returns the label of `id`, or `?` for a dead id.
    pub fn label(&self, id: StateId) -> &str {
        self.states.get(&id).map_or("?", |state| state.label())
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &State)> {
        self.states.iter().map(|(id, state)| (*id, state))
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// The start state, if one is flagged.
    pub fn start_state(&self) -> Option<StateId> {
        self.states
            .iter()
            .find(|(_, state)| state.start)
            .map(|(id, _)| *id)
    }

    pub fn final_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states
            .iter()
            .filter(|(_, state)| state.accepting)
            .map(|(id, _)| *id)
    }

    pub fn is_final(&self, id: StateId) -> bool {
        self.states.get(&id).is_some_and(|state| state.accepting)
    }

    // --- transitions ---

    /// Adds a transition between two live states. DFSA transitions must move right.
    ///
    /// Symbols are normalized on entry, and a write of the empty-action or undefined
    /// sentinel becomes [`Action::Empty`] or [`Action::Undefined`].
    pub fn add_transition(
        &mut self,
        from: StateId,
        to: StateId,
        input: InputSymbol,
        action: Action,
    ) -> Result<TransitionId, MachineError> {
        self.state_mut(from)?;
        self.state_mut(to)?;
        let input = normalize_input(input)?;
        let action = self.normalize_action(action)?;

        let id = TransitionId(self.next_transition);
        self.next_transition += 1;
        self.transitions.insert(
            id,
            Transition {
                from,
                to,
                input,
                action,
            },
        );
        Ok(id)
    }

    pub fn remove_transition(&mut self, id: TransitionId) -> Result<Transition, MachineError> {
        self.transitions
            .remove(&id)
            .ok_or_else(|| MachineError::UnknownTransition(format!("{id:?}")))
    }

    pub fn set_input(&mut self, id: TransitionId, input: InputSymbol) -> Result<(), MachineError> {
        let input = normalize_input(input)?;
        self.transition_mut(id)?.input = input;
        Ok(())
    }

    pub fn set_action(&mut self, id: TransitionId, action: Action) -> Result<(), MachineError> {
        let action = self.normalize_action(action)?;
        self.transition_mut(id)?.action = action;
        Ok(())
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        self.transitions.get(&id)
    }

    pub fn transitions(&self) -> impl Iterator<Item = (TransitionId, &Transition)> {
        self.transitions.iter().map(|(id, t)| (*id, t))
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Transitions leaving `state`, self-loops included.
    pub fn outgoing(&self, state: StateId) -> impl Iterator<Item = (TransitionId, &Transition)> {
        self.transitions().filter(move |(_, t)| t.from == state)
    }

    /// Transitions entering `state`, self-loops included.
    pub fn incoming(&self, state: StateId) -> impl Iterator<Item = (TransitionId, &Transition)> {
        self.transitions().filter(move |(_, t)| t.to == state)
    }

    /// Human-readable form of a transition, e.g. `q0 -> q1 on 1 write _`.
    pub fn describe(&self, id: TransitionId) -> String {
        match self.transitions.get(&id) {
            Some(t) => format!(
                "{} -> {} on {} {}",
                self.label(t.from),
                self.label(t.to),
                t.input,
                t.action
            ),
            None => format!("{id:?}"),
        }
    }

    // --- execution ---

    /// Resolves the candidate moves from `state` when `symbol` is under the head.
    ///
    /// Candidates are the transitions whose label is `symbol` or the wildcard; only when
    /// there are none do `otherwise` transitions apply. An empty result means no move.
    pub fn candidates(&self, state: StateId, symbol: char) -> Vec<TransitionId> {
        let mut direct = Vec::new();
        let mut otherwise = Vec::new();

        for (id, t) in self.outgoing(state) {
            if t.input.matches(symbol) {
                direct.push(id);
            } else if t.input == InputSymbol::Otherwise {
                otherwise.push(id);
            }
        }

        if direct.is_empty() {
            otherwise
        } else {
            direct
        }
    }

    /// Applies `chosen`'s action to `tape` and returns the state it leads to.
    ///
    /// Fails with [`MachineError::UndefinedTransition`] when no transition was chosen or the
    /// chosen one still has an unset label or write symbol, and with
    /// [`MachineError::TapeBounds`] when the action moves the head left of cell 0.
    pub fn step(
        &self,
        tape: &mut dyn Tape,
        current: StateId,
        chosen: Option<TransitionId>,
    ) -> Result<StateId, MachineError> {
        let id = chosen.ok_or_else(|| {
            MachineError::UndefinedTransition(format!(
                "no transition from state {} on symbol '{}'",
                self.label(current),
                tape.read()
            ))
        })?;

        let transition = self
            .transitions
            .get(&id)
            .ok_or_else(|| MachineError::UnknownTransition(format!("{id:?}")))?;

        if transition.from != current {
            return Err(MachineError::UndefinedTransition(format!(
                "{} does not leave state {}",
                self.describe(id),
                self.label(current)
            )));
        }

        if transition.input == InputSymbol::Undefined {
            return Err(MachineError::UndefinedTransition(format!(
                "{} has no input symbol",
                self.describe(id)
            )));
        }

        match transition.action {
            Action::Left => tape.head_left()?,
            Action::Right => tape.head_right(),
            Action::Write(symbol) => tape.write(symbol),
            Action::Empty => {}
            Action::Undefined => {
                return Err(MachineError::UndefinedTransition(format!(
                    "{} has no action symbol",
                    self.describe(id)
                )))
            }
        }

        Ok(transition.to)
    }

    // --- validation ---

    /// Returns why the machine cannot run, if any transition has an unset input or write
    /// symbol.
    pub fn has_undefined_symbols(&self) -> Option<String> {
        analyzer::check_undefined_symbols(self)
            .err()
            .map(|e| MachineError::from(e).to_string())
    }

    pub fn is_deterministic(&self) -> bool {
        analyzer::check_determinism(self).is_ok()
    }

    /// Fails with [`MachineError::Nondeterministic`] naming the first offending state and
    /// symbol.
    pub fn check_deterministic(&self) -> Result<(), MachineError> {
        analyzer::check_determinism(self).map_err(MachineError::from)
    }

    pub fn is_consistent_with_alphabet(&self, alphabet: &Alphabet) -> bool {
        self.inconsistent_transitions(alphabet).is_empty()
    }

    /// Transitions that read or write a symbol outside `alphabet`.
    pub fn inconsistent_transitions(&self, alphabet: &Alphabet) -> Vec<TransitionId> {
        analyzer::inconsistent_transitions(self, alphabet)
    }

    // --- helpers ---

    fn state_mut(&mut self, id: StateId) -> Result<&mut State, MachineError> {
        self.states
            .get_mut(&id)
            .ok_or_else(|| MachineError::UnknownState(format!("{id:?}")))
    }

    fn transition_mut(&mut self, id: TransitionId) -> Result<&mut Transition, MachineError> {
        self.transitions
            .get_mut(&id)
            .ok_or_else(|| MachineError::UnknownTransition(format!("{id:?}")))
    }

    fn check_label(&self, label: &str, exclude: Option<StateId>) -> Result<(), MachineError> {
        if label.trim().is_empty() {
            return Err(MachineError::ValidationError(
                "State label must not be empty".to_string(),
            ));
        }

        let taken = self
            .states
            .iter()
            .any(|(id, state)| Some(*id) != exclude && state.label == label);
        if taken {
            return Err(MachineError::DuplicateState(label.to_string()));
        }
        Ok(())
    }

    fn normalize_action(&self, action: Action) -> Result<Action, MachineError> {
        let action = match action {
            Action::Write(c) => Action::write(c),
            other => other,
        };

        if let Action::Write(c) = action {
            if is_control_symbol(c) {
                return Err(MachineError::InvalidSymbol(format!(
                    "'{c}' is a control symbol and cannot be written"
                )));
            }
        }

        if self.kind == MachineKind::Dfsa && action != Action::Right {
            return Err(MachineError::InvalidAction(format!(
                "DFSA transitions always move right, got \"{action}\""
            )));
        }
        Ok(action)
    }

    fn next_label(&self) -> String {
        let taken: HashSet<&str> = self.states.values().map(|s| s.label.as_str()).collect();
        (0..)
            .map(|n| format!("q{n}"))
            .find(|label| !taken.contains(label.as_str()))
            .unwrap_or_default()
    }

    fn renumber(&mut self) {
        for (n, state) in self.states.values_mut().enumerate() {
            state.label = format!("q{n}");
        }
    }
}

/// Folds a concrete label to its normalized form. Control symbols are only valid as
/// their dedicated variants.
fn normalize_input(input: InputSymbol) -> Result<InputSymbol, MachineError> {
    match input {
        InputSymbol::Symbol(c) if is_control_symbol(c) => Err(MachineError::InvalidSymbol(
            format!("'{c}' is a control symbol and cannot label a transition"),
        )),
        InputSymbol::Symbol(c) => Ok(InputSymbol::symbol(c)),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tape::ArrayTape;
    use crate::types::{BLANK_SYMBOL, WILDCARD_SYMBOL};

    fn machine() -> (Machine, StateId, StateId) {
        let mut machine = Machine::new(MachineKind::Turing, Alphabet::binary());
        let q0 = machine.add_state("q0", Position::default()).unwrap();
        let q1 = machine.add_state("q1", Position::new(100.0, 0.0)).unwrap();
        (machine, q0, q1)
    }

    #[test]
    fn test_duplicate_labels_are_rejected() {
        let (mut machine, q0, _) = machine();

        assert_eq!(
            machine.add_state("q1", Position::default()),
            Err(MachineError::DuplicateState("q1".to_string()))
        );
        assert_eq!(
            machine.rename_state(q0, "q1"),
            Err(MachineError::DuplicateState("q1".to_string()))
        );
        assert!(machine.rename_state(q0, "q0").is_ok());
        assert!(machine.add_state("  ", Position::default()).is_err());
    }

    #[test]
    fn test_remove_state_cascades_transitions() {
        let (mut machine, q0, q1) = machine();
        machine
            .add_transition(q0, q1, InputSymbol::symbol('1'), Action::Right)
            .unwrap();
        machine
            .add_transition(q1, q1, InputSymbol::Wildcard, Action::Right)
            .unwrap();
        let keep = machine
            .add_transition(q0, q0, InputSymbol::symbol('0'), Action::Right)
            .unwrap();

        machine.remove_state(q1).unwrap();

        assert_eq!(machine.transition_count(), 1);
        assert!(machine.transition(keep).is_some());
        assert!(machine.transitions().all(|(_, t)| t.to() != q1 && t.from() != q1));
    }

    #[test]
    fn test_transitions_need_live_endpoints() {
        let (mut machine, q0, q1) = machine();
        machine.remove_state(q1).unwrap();

        let result = machine.add_transition(q0, q1, InputSymbol::Wildcard, Action::Left);
        assert!(matches!(result, Err(MachineError::UnknownState(_))));
    }

    #[test]
    fn test_start_state_is_unique() {
        let (mut machine, q0, q1) = machine();
        assert_eq!(machine.start_state(), None);

        machine.set_start_state(q0, true).unwrap();
        machine.set_start_state(q1, true).unwrap();

        assert_eq!(machine.start_state(), Some(q1));
        assert!(!machine.state(q0).unwrap().is_start());
    }

    #[test]
    fn test_final_states_per_kind() {
        let (mut machine, q0, q1) = machine();
        machine.set_final_state(q0, true).unwrap();
        machine.set_final_state(q1, true).unwrap();
        assert_eq!(machine.final_states().collect::<Vec<_>>(), vec![q1]);

        let mut dfsa = Machine::new(MachineKind::Dfsa, Alphabet::binary());
        let a = dfsa.create_state(Position::default());
        let b = dfsa.create_state(Position::default());
        dfsa.set_final_state(a, true).unwrap();
        dfsa.set_final_state(b, true).unwrap();
        assert_eq!(dfsa.final_states().count(), 2);
    }

    #[test]
    fn test_dfsa_transitions_must_move_right() {
        let mut dfsa = Machine::new(MachineKind::Dfsa, Alphabet::binary());
        let a = dfsa.create_state(Position::default());

        let result = dfsa.add_transition(a, a, InputSymbol::symbol('0'), Action::Write('1'));
        assert!(matches!(result, Err(MachineError::InvalidAction(_))));

        let id = dfsa
            .add_transition(a, a, InputSymbol::symbol('0'), Action::Right)
            .unwrap();
        assert!(dfsa.set_action(id, Action::Left).is_err());
    }

    #[test]
    fn test_symbols_are_normalized_on_entry() {
        let (mut machine, q0, q1) = machine();
        let id = machine
            .add_transition(q0, q1, InputSymbol::Symbol('a'), Action::Write('b'))
            .unwrap();
        assert_eq!(machine.transition(id).unwrap().input(), InputSymbol::Symbol('A'));
        assert_eq!(machine.transition(id).unwrap().action(), Action::Write('B'));

        machine.set_action(id, Action::Write('-')).unwrap();
        assert_eq!(machine.transition(id).unwrap().action(), Action::Empty);
        machine.set_action(id, Action::Write('?')).unwrap();
        assert_eq!(machine.transition(id).unwrap().action(), Action::Undefined);

        machine.set_input(id, InputSymbol::Symbol(' ')).unwrap();
        assert_eq!(
            machine.transition(id).unwrap().input(),
            InputSymbol::Symbol(BLANK_SYMBOL)
        );
    }

    #[test]
    fn test_control_symbols_are_rejected() {
        let (mut machine, q0, q1) = machine();
        for c in [WILDCARD_SYMBOL, '?', '-'] {
            let result = machine.add_transition(q0, q1, InputSymbol::Symbol(c), Action::Right);
            assert!(matches!(result, Err(MachineError::InvalidSymbol(_))));
        }

        let result = machine.add_transition(q0, q1, InputSymbol::Wildcard, Action::Write('*'));
        assert!(matches!(result, Err(MachineError::InvalidSymbol(_))));

        let id = machine
            .add_transition(q0, q1, InputSymbol::symbol('1'), Action::Right)
            .unwrap();
        assert!(machine.set_input(id, InputSymbol::Symbol('*')).is_err());
        assert_eq!(machine.transition(id).unwrap().input(), InputSymbol::Symbol('1'));
        assert_eq!(machine.transition_count(), 1);
    }

    #[test]
    fn test_general_naming_fills_gaps() {
        let mut machine = Machine::new(MachineKind::Turing, Alphabet::binary());
        let q0 = machine.create_state(Position::default());
        let q1 = machine.create_state(Position::default());
        let _q2 = machine.create_state(Position::default());

        machine.remove_state(q1).unwrap();
        let next = machine.create_state(Position::default());

        assert_eq!(machine.label(q0), "q0");
        assert_eq!(machine.label(next), "q1");
    }

    #[test]
    fn test_normalized_naming_renumbers() {
        let mut machine = Machine::new(MachineKind::Turing, Alphabet::binary());
        machine.add_state("start", Position::default()).unwrap();
        let middle = machine.add_state("middle", Position::default()).unwrap();
        let end = machine.add_state("end", Position::default()).unwrap();

        machine.set_naming(NamingScheme::Normalized);
        assert_eq!(machine.label(end), "q2");

        machine.remove_state(middle).unwrap();
        assert_eq!(machine.label(end), "q1");
        assert_eq!(machine.state_by_label("q0").map(|id| machine.label(id)), Some("q0"));
    }

    #[test]
    fn test_candidates_prefer_direct_matches() {
        let (mut machine, q0, q1) = machine();
        let exact = machine
            .add_transition(q0, q1, InputSymbol::symbol('1'), Action::Right)
            .unwrap();
        let otherwise = machine
            .add_transition(q0, q0, InputSymbol::Otherwise, Action::Right)
            .unwrap();

        assert_eq!(machine.candidates(q0, '1'), vec![exact]);
        assert_eq!(machine.candidates(q0, '0'), vec![otherwise]);
        assert!(machine.candidates(q1, '1').is_empty());

        let wildcard = machine
            .add_transition(q0, q0, InputSymbol::Wildcard, Action::Left)
            .unwrap();
        assert_eq!(machine.candidates(q0, '1'), vec![exact, wildcard]);
        assert_eq!(machine.candidates(q0, BLANK_SYMBOL), vec![wildcard]);
    }

    #[test]
    fn test_step_applies_action() {
        let (mut machine, q0, q1) = machine();
        let write = machine
            .add_transition(q0, q1, InputSymbol::symbol('1'), Action::write('0'))
            .unwrap();
        let left = machine
            .add_transition(q1, q0, InputSymbol::Wildcard, Action::Left)
            .unwrap();

        let mut tape = ArrayTape::new("1");
        let next = machine.step(&mut tape, q0, Some(write)).unwrap();
        assert_eq!(next, q1);
        assert_eq!(tape.read(), '0');

        assert_eq!(
            machine.step(&mut tape, q1, Some(left)),
            Err(MachineError::TapeBounds)
        );
        assert!(tape.is_parked());
    }

    #[test]
    fn test_step_requires_a_transition() {
        let (mut machine, q0, q1) = machine();
        let mut tape = ArrayTape::new("1");

        let result = machine.step(&mut tape, q0, None);
        assert!(matches!(result, Err(MachineError::UndefinedTransition(_))));

        let unset = machine
            .add_transition(q0, q1, InputSymbol::Undefined, Action::Right)
            .unwrap();
        let result = machine.step(&mut tape, q0, Some(unset));
        assert!(matches!(result, Err(MachineError::UndefinedTransition(_))));

        let no_write = machine
            .add_transition(q0, q1, InputSymbol::symbol('1'), Action::Undefined)
            .unwrap();
        let result = machine.step(&mut tape, q0, Some(no_write));
        assert!(matches!(result, Err(MachineError::UndefinedTransition(_))));
        assert_eq!(tape.contents(), "1");

        let result = machine.step(&mut tape, q1, Some(no_write));
        assert!(matches!(result, Err(MachineError::UndefinedTransition(_))));
    }

    #[test]
    fn test_empty_action_writes_nothing() {
        let (mut machine, q0, q1) = machine();
        let stay = machine
            .add_transition(q0, q1, InputSymbol::symbol('1'), Action::Empty)
            .unwrap();
        let mut tape = ArrayTape::new("1");

        machine.step(&mut tape, q0, Some(stay)).unwrap();
        assert_eq!(tape.read(), '1');
        assert_eq!(tape.position(), 0);
    }

    #[test]
    fn test_describe() {
        let (mut machine, q0, q1) = machine();
        let id = machine
            .add_transition(q0, q1, InputSymbol::Wildcard, Action::write(BLANK_SYMBOL))
            .unwrap();

        assert_eq!(
            machine.describe(id),
            format!("q0 -> q1 on {WILDCARD_SYMBOL} write _")
        );
    }
}
