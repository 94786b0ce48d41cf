//! This module provides the parser for machine definitions, utilizing the `pest` crate.
//! It defines the grammar for `.tm` files and functions to parse the input into a [`Definition`].

use crate::{
    alphabet::Alphabet,
    machine::{Definition, Machine, Position},
    types::{
        normalize_symbol, Action, InputSymbol, MachineError, MachineKind, NamingScheme, StateId,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;

/// Horizontal distance between states that are declared without a position.
const DEFAULT_STATE_SPACING: f64 = 120.0;

/// Derives a `PestParser` for the machine grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct MachineParser;

/// Parses the given input string into a [`Definition`].
///
/// Sections may appear in any order, but each at most once. `name:` and `states:` are
/// required; the kind defaults to a Turing machine, the alphabet to `{0, 1, _}` and the
/// tape to empty. Labels are resolved after all states are declared, so a transition may
/// only refer to a state declared in the `states:` section.
///
/// # Returns
///
/// * `Ok(Definition)` if the input is successfully parsed.
/// * `Err(MachineError::ParseError)` for syntax errors and for duplicate sections,
///   duplicate labels, unknown states or conflicting flags, pointing at the offending span.
/// * `Err(MachineError::ValidationError)` if a required section is missing.
pub fn parse(input: &str) -> Result<Definition, MachineError> {
    let root = MachineParser::parse(Rule::program, input)
        .map_err(|e| MachineError::ParseError(Box::new(e)))?
        .next()
        .unwrap();

    parse_program(root)
}

/// Parses the top-level structure of a definition from a `Pair<Rule::program>`.
fn parse_program(pair: Pair<Rule>) -> Result<Definition, MachineError> {
    let mut name: Option<String> = None;
    let mut kind: Option<MachineKind> = None;
    let mut naming: Option<NamingScheme> = None;
    let mut alphabet: Option<Alphabet> = None;
    let mut tape: Option<String> = None;
    let mut states: Option<Pair<Rule>> = None;
    let mut transitions: Option<Pair<Rule>> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let rule = p.as_rule();
        check_unique_rule(rule, p.as_span(), &mut seen)?;

        match rule {
            Rule::name => name = Some(parse_inner_string(p).trim().to_string()),
            Rule::kind => kind = Some(parse_kind(p)),
            Rule::naming => naming = Some(parse_naming(p)),
            Rule::alphabet => alphabet = Some(parse_alphabet(p)),
            Rule::tape => tape = Some(parse_tape(p)),
            Rule::states => states = Some(p),
            Rule::transitions => transitions = Some(p),
            _ => {} // EOI
        }
    }

    let name = check_required_rule(name, "name")?;
    let states = check_required_rule(states, "states")?;

    let mut machine = Machine::new(kind.unwrap_or_default(), alphabet.unwrap_or_default());
    machine.set_name(name);

    parse_states(&mut machine, states)?;
    if let Some(transitions) = transitions {
        parse_transitions(&mut machine, transitions)?;
    }

    // Relabelling must wait until every transition has been resolved by its written label.
    machine.set_naming(naming.unwrap_or_default());

    Ok(Definition::new(machine, tape.unwrap_or_default()))
}

fn parse_kind(pair: Pair<Rule>) -> MachineKind {
    match parse_inner_string(pair).as_str() {
        "dfsa" => MachineKind::Dfsa,
        _ => MachineKind::Turing,
    }
}

fn parse_naming(pair: Pair<Rule>) -> NamingScheme {
    match parse_inner_string(pair).as_str() {
        "normalized" => NamingScheme::Normalized,
        _ => NamingScheme::General,
    }
}

/// Parses `alphabet: letters digits 0 1 _`. An empty section yields an empty alphabet.
fn parse_alphabet(pair: Pair<Rule>) -> Alphabet {
    let mut alphabet = Alphabet::empty();

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::letters => alphabet.set_alphabetical(true),
            Rule::digits => alphabet.set_digits(true),
            Rule::symbol => {
                alphabet.set_symbol(parse_symbol(item.as_str()), true);
            }
            _ => {}
        }
    }

    alphabet
}

fn parse_tape(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|symbols| symbols.as_str().chars().map(normalize_symbol).collect())
        .unwrap_or_default()
}

/// Declares every state of a `Pair<Rule::states>` on the machine.
fn parse_states(machine: &mut Machine, pair: Pair<Rule>) -> Result<(), MachineError> {
    for (index, decl) in pair.into_inner().enumerate() {
        let span = decl.as_span();
        let mut pairs = decl.into_inner();
        let label = pairs.next().unwrap().as_str();

        if machine.state_by_label(label).is_some() {
            return Err(parse_error(&format!("Duplicate state: {label}"), span));
        }

        let mut start = false;
        let mut accepting = false;
        let mut position = Position::new(DEFAULT_STATE_SPACING * index as f64, 0.0);

        for p in pairs {
            match p.as_rule() {
                Rule::start_flag => start = true,
                Rule::final_flag => accepting = true,
                Rule::position => position = parse_position(p)?,
                _ => {}
            }
        }

        let id = machine.add_state(label, position)?;

        if start {
            if let Some(other) = machine.start_state() {
                return Err(parse_error(
                    &format!(
                        "Multiple start states: {} and {label}",
                        machine.label(other)
                    ),
                    span,
                ));
            }
            machine.set_start_state(id, true)?;
        }

        if accepting {
            if let Some(other) = machine.final_states().next() {
                if !machine.kind().allows_multiple_finals() {
                    return Err(parse_error(
                        &format!(
                            "A {} machine allows one final state, found {} and {label}",
                            machine.kind(),
                            machine.label(other)
                        ),
                        span,
                    ));
                }
            }
            machine.set_final_state(id, true)?;
        }
    }

    Ok(())
}

fn parse_position(pair: Pair<Rule>) -> Result<Position, MachineError> {
    let mut coords = [0.0; 2];

    for (coord, p) in coords.iter_mut().zip(pair.into_inner()) {
        *coord = p
            .as_str()
            .parse::<f64>()
            .map_err(|e| parse_error(&format!("Invalid coordinate: {e}"), p.as_span()))?;
    }

    Ok(Position::new(coords[0], coords[1]))
}

/// Adds every transition of a `Pair<Rule::transitions>`, resolving endpoints by label.
fn parse_transitions(machine: &mut Machine, pair: Pair<Rule>) -> Result<(), MachineError> {
    for decl in pair.into_inner() {
        let span = decl.as_span();
        let mut pairs = decl.into_inner();

        let from = resolve_state(machine, pairs.next().unwrap())?;
        let to = resolve_state(machine, pairs.next().unwrap())?;
        let input = parse_input(pairs.next().unwrap());
        let action = parse_action(pairs.next().unwrap());

        machine
            .add_transition(from, to, input, action)
            .map_err(|e| parse_error(&e.to_string(), span))?;
    }

    Ok(())
}

fn resolve_state(machine: &Machine, pair: Pair<Rule>) -> Result<StateId, MachineError> {
    let label = pair.as_str();
    machine
        .state_by_label(label)
        .ok_or_else(|| parse_error(&format!("Unknown state: {label}"), pair.as_span()))
}

/// Parses a transition input label: a symbol, `*`, `otherwise` or `?`.
fn parse_input(pair: Pair<Rule>) -> InputSymbol {
    match pair.as_rule() {
        Rule::wildcard => InputSymbol::Wildcard,
        Rule::otherwise => InputSymbol::Otherwise,
        Rule::undefined => InputSymbol::Undefined,
        _ => InputSymbol::symbol(parse_symbol(pair.as_str())),
    }
}

/// Parses a transition action: `move L`, `move R`, `write S`, `stay` or `?`.
///
/// `write -` and `stay` both mean "write nothing".
fn parse_action(pair: Pair<Rule>) -> Action {
    match pair.as_rule() {
        Rule::move_left => Action::Left,
        Rule::move_right => Action::Right,
        Rule::write => match pair.into_inner().next() {
            Some(p) if p.as_rule() == Rule::symbol => Action::write(parse_symbol(p.as_str())),
            _ => Action::Empty,
        },
        Rule::stay => Action::Empty,
        _ => Action::Undefined,
    }
}

/// Parses a single normalized symbol from a one-character token.
fn parse_symbol(input: &str) -> char {
    input.chars().next().map(normalize_symbol).unwrap_or_default()
}

/// Extracts the inner string content from a `Pair`.
fn parse_inner_string(pair: Pair<Rule>) -> String {
    pair.into_inner().next().unwrap().as_str().into()
}

/// Creates a `MachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> MachineError {
    MachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Checks if a given section has already been declared.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), MachineError> {
    if !matches!(
        rule,
        Rule::name
            | Rule::kind
            | Rule::naming
            | Rule::alphabet
            | Rule::tape
            | Rule::states
            | Rule::transitions
    ) {
        return Ok(());
    };

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{rule:?}:\" declaration"),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, MachineError> {
    value.ok_or_else(|| MachineError::ValidationError(format!("Missing '{name}' section")))
}
