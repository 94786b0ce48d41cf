//! JSON persistence for machines and their tapes.
//!
//! States are stored with their labels, flags and layout positions; transitions refer to
//! their endpoints by label, so loading rebuilds the graph with fresh ids. Tapes are stored
//! as their symbol sequence only, which means a loaded tape always has its head at cell 0.

use crate::alphabet::Alphabet;
use crate::machine::{Definition, Machine, Position};
use crate::types::{
    normalize_symbol, Action, InputSymbol, MachineError, MachineKind, NamingScheme,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The serialized form of a [`Definition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineDocument {
    pub name: String,
    #[serde(default)]
    pub kind: MachineKind,
    #[serde(default)]
    pub alphabet: Alphabet,
    #[serde(default)]
    pub naming: NamingScheme,
    pub states: Vec<StateRecord>,
    #[serde(default)]
    pub transitions: Vec<TransitionRecord>,
    #[serde(default)]
    pub tape: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub label: String,
    #[serde(default)]
    pub start: bool,
    #[serde(default, rename = "final")]
    pub accepting: bool,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: String,
    pub to: String,
    pub input: InputSymbol,
    pub action: Action,
}

impl From<&Definition> for MachineDocument {
    fn from(definition: &Definition) -> Self {
        let machine = &definition.machine;

        let states = machine
            .states()
            .map(|(_, state)| StateRecord {
                label: state.label().to_string(),
                start: state.is_start(),
                accepting: state.is_final(),
                x: state.position().x,
                y: state.position().y,
            })
            .collect();

        let transitions = machine
            .transitions()
            .map(|(_, t)| TransitionRecord {
                from: machine.label(t.from()).to_string(),
                to: machine.label(t.to()).to_string(),
                input: t.input(),
                action: t.action(),
            })
            .collect();

        Self {
            name: machine.name().to_string(),
            kind: machine.kind(),
            alphabet: machine.alphabet().clone(),
            naming: machine.naming(),
            states,
            transitions,
            tape: definition.tape.clone(),
        }
    }
}

impl TryFrom<MachineDocument> for Definition {
    type Error = MachineError;

    /// Rebuilds the machine, resolving transition endpoints by label.
    fn try_from(document: MachineDocument) -> Result<Self, Self::Error> {
        check_flags(&document)?;

        let mut machine = Machine::new(document.kind, document.alphabet);
        machine.set_name(document.name);

        let mut ids = HashMap::new();
        for record in &document.states {
            let id = machine.add_state(record.label.clone(), Position::new(record.x, record.y))?;
            if record.start {
                machine.set_start_state(id, true)?;
            }
            if record.accepting {
                machine.set_final_state(id, true)?;
            }
            ids.insert(record.label.as_str(), id);
        }

        for record in &document.transitions {
            let endpoint = |label: &str| {
                ids.get(label)
                    .copied()
                    .ok_or_else(|| MachineError::UnknownState(label.to_string()))
            };
            machine.add_transition(
                endpoint(record.from.as_str())?,
                endpoint(record.to.as_str())?,
                record.input,
                record.action,
            )?;
        }

        machine.set_naming(document.naming);
        let tape: String = document.tape.chars().map(normalize_symbol).collect();
        Ok(Definition::new(machine, tape))
    }
}

/// Rejects flag combinations the machine itself would silently repair.
fn check_flags(document: &MachineDocument) -> Result<(), MachineError> {
    let starts: Vec<String> = document
        .states
        .iter()
        .filter(|s| s.start)
        .map(|s| s.label.clone())
        .collect();
    if starts.len() > 1 {
        return Err(MachineError::MultipleStartStates(starts));
    }

    let finals = document.states.iter().filter(|s| s.accepting).count();
    if finals > 1 && !document.kind.allows_multiple_finals() {
        return Err(MachineError::ValidationError(format!(
            "A {} machine allows at most one final state, found {}",
            document.kind, finals
        )));
    }

    Ok(())
}

/// Serializes a definition to pretty-printed JSON.
pub fn to_json(definition: &Definition) -> Result<String, MachineError> {
    Ok(serde_json::to_string_pretty(&MachineDocument::from(definition))?)
}

/// Parses a definition from JSON.
pub fn from_json(content: &str) -> Result<Definition, MachineError> {
    let document: MachineDocument = serde_json::from_str(content)?;
    Definition::try_from(document)
}
