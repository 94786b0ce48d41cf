//! This module renders a [`Definition`] back into the `.tm` text format read by
//! [`crate::parser::parse`].

use crate::alphabet::Alphabet;
use crate::machine::{Definition, Machine};
use crate::types::{MachineError, MachineKind, NamingScheme};

/// Encodes a definition as `.tm` text.
///
/// Sections are written in a fixed order and every state carries its position, so
/// parsing the result yields an equivalent definition. Fails if a label cannot be written
/// as a `.tm` identifier (letters, digits and `_`).
pub fn encode(definition: &Definition) -> Result<String, MachineError> {
    let machine = &definition.machine;
    let mut out = format!("name: {}\n", encode_name(machine.name()));

    if machine.kind() != MachineKind::default() {
        out.push_str(&format!("kind: {}\n", machine.kind()));
    }
    if machine.naming() != NamingScheme::default() {
        out.push_str(&format!("naming: {}\n", machine.naming()));
    }
    out.push_str(&format!("alphabet: {}\n", encode_alphabet(machine.alphabet())));
    if !definition.tape.is_empty() {
        out.push_str(&format!("tape: {}\n", definition.tape));
    }

    out.push_str("\nstates:\n");
    out.push_str(&encode_states(machine)?);

    if machine.transition_count() > 0 {
        out.push_str("\ntransitions:\n");
        for (id, _) in machine.transitions() {
            out.push_str(&format!("  {}\n", machine.describe(id)));
        }
    }

    Ok(out)
}

/// Encodes one `label [start] [final] (x, y)` line per state.
fn encode_states(machine: &Machine) -> Result<String, MachineError> {
    let mut lines = String::new();

    for (_, state) in machine.states() {
        check_label(state.label())?;

        let mut flags = String::new();
        if state.is_start() {
            flags.push_str(" start");
        }
        if state.is_final() {
            flags.push_str(" final");
        }
        let position = state.position();
        lines.push_str(&format!(
            "  {}{} ({}, {})\n",
            state.label(),
            flags,
            position.x,
            position.y
        ));
    }

    Ok(lines)
}

/// Collapses full letter and digit ranges into the `letters` and `digits` keywords.
fn encode_alphabet(alphabet: &Alphabet) -> String {
    let letters = alphabet.has_all_letters();
    let digits = alphabet.has_all_digits();

    let mut items = Vec::new();
    if letters {
        items.push("letters".to_string());
    }
    if digits {
        items.push("digits".to_string());
    }
    items.extend(
        alphabet
            .symbols()
            .filter(|c| !(letters && c.is_ascii_uppercase()) && !(digits && c.is_ascii_digit()))
            .map(String::from),
    );

    items.join(" ")
}

/// Names run to the end of the line, and `#` would start a comment.
fn encode_name(name: &str) -> String {
    let name: String = name
        .chars()
        .map(|c| if matches!(c, '\n' | '\r' | '#') { ' ' } else { c })
        .collect();
    let name = name.trim();

    if name.is_empty() {
        "Untitled".to_string()
    } else {
        name.to_string()
    }
}

fn check_label(label: &str) -> Result<(), MachineError> {
    if label.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(MachineError::ValidationError(format!(
            "State label \"{label}\" cannot be encoded; use letters, digits and '_' only"
        )))
    }
}
