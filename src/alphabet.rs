//! The set of symbols a machine is allowed to read and write.

use crate::types::{normalize_symbol, BLANK_SYMBOL};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A finite set over the domain `A-Z`, `0-9` and the blank symbol.
///
/// Membership is case-insensitive. Control symbols (wildcard, empty action, undefined)
/// are outside the domain and are never members. Cloning gives an independent copy, so a
/// candidate alphabet can be edited and committed with [`crate::Machine::set_alphabet`].
///
/// Serialized as the list of its members. Deserializing rebuilds the set through
/// [`Alphabet::set_symbol`] and rejects symbols outside the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<char>", into = "Vec<char>")]
pub struct Alphabet {
    symbols: BTreeSet<char>,
}

impl Default for Alphabet {
    /// The binary alphabet `{0, 1, _}`.
    fn default() -> Self {
        Self::binary()
    }
}

impl Alphabet {
    /// Creates an alphabet with no symbols.
    pub fn empty() -> Self {
        Self {
            symbols: BTreeSet::new(),
        }
    }

    /// Creates the alphabet `{0, 1, _}`.
    pub fn binary() -> Self {
        Self::from_symbols(['0', '1', BLANK_SYMBOL])
    }

    /// Creates an alphabet from the in-domain symbols of `symbols`.
    pub fn from_symbols(symbols: impl IntoIterator<Item = char>) -> Self {
        let mut alphabet = Self::empty();
        for c in symbols {
            alphabet.set_symbol(c, true);
        }
        alphabet
    }

    /// Whether `c` is in the symbol domain at all.
    pub fn in_domain(c: char) -> bool {
        let c = normalize_symbol(c);
        c.is_ascii_uppercase() || c.is_ascii_digit() || c == BLANK_SYMBOL
    }

    pub fn contains_symbol(&self, c: char) -> bool {
        Self::in_domain(c) && self.symbols.contains(&normalize_symbol(c))
    }

    /// Adds or removes a single symbol. Returns `false` if `c` is outside the domain.
    pub fn set_symbol(&mut self, c: char, enabled: bool) -> bool {
        if !Self::in_domain(c) {
            return false;
        }

        let c = normalize_symbol(c);
        if enabled {
            self.symbols.insert(c);
        } else {
            self.symbols.remove(&c);
        }
        true
    }

    /// Adds or removes every letter `A-Z`.
    pub fn set_alphabetical(&mut self, enabled: bool) {
        for c in 'A'..='Z' {
            self.set_symbol(c, enabled);
        }
    }

    /// Adds or removes every digit `0-9`.
    pub fn set_digits(&mut self, enabled: bool) {
        for c in '0'..='9' {
            self.set_symbol(c, enabled);
        }
    }

    pub fn set_blank(&mut self, enabled: bool) {
        self.set_symbol(BLANK_SYMBOL, enabled);
    }

    /// Whether every letter `A-Z` is a member.
    pub fn has_all_letters(&self) -> bool {
        ('A'..='Z').all(|c| self.symbols.contains(&c))
    }

    /// Whether every digit `0-9` is a member.
    pub fn has_all_digits(&self) -> bool {
        ('0'..='9').all(|c| self.symbols.contains(&c))
    }

    /// Iterates the members in sorted order.
    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl TryFrom<Vec<char>> for Alphabet {
    type Error = String;

    fn try_from(symbols: Vec<char>) -> Result<Self, Self::Error> {
        let mut alphabet = Self::empty();
        for c in symbols {
            if !alphabet.set_symbol(c, true) {
                return Err(format!("'{c}' cannot be an alphabet symbol"));
            }
        }
        Ok(alphabet)
    }
}

impl From<Alphabet> for Vec<char> {
    fn from(alphabet: Alphabet) -> Self {
        alphabet.symbols.into_iter().collect()
    }
}

impl fmt::Display for Alphabet {
    /// Formats the alphabet as `{0, 1, _}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols = self
            .symbols
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{{{symbols}}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EMPTY_ACTION_SYMBOL, UNDEFINED_SYMBOL, WILDCARD_SYMBOL};

    #[test]
    fn test_default_alphabet_membership() {
        let alphabet = Alphabet::default();

        assert!(!alphabet.contains_symbol('a'));
        assert!(alphabet.contains_symbol('1'));
        assert!(alphabet.contains_symbol('0'));
        assert!(alphabet.contains_symbol(BLANK_SYMBOL));
        assert!(!alphabet.contains_symbol(WILDCARD_SYMBOL));
    }

    #[test]
    fn test_control_symbols_never_members() {
        let mut alphabet = Alphabet::empty();
        alphabet.set_alphabetical(true);
        alphabet.set_digits(true);
        alphabet.set_blank(true);

        assert!(!alphabet.set_symbol(WILDCARD_SYMBOL, true));
        assert!(!alphabet.set_symbol(EMPTY_ACTION_SYMBOL, true));
        assert!(!alphabet.contains_symbol(WILDCARD_SYMBOL));
        assert!(!alphabet.contains_symbol(EMPTY_ACTION_SYMBOL));
        assert!(!alphabet.contains_symbol(UNDEFINED_SYMBOL));
        assert_eq!(alphabet.len(), 37);
    }

    #[test]
    fn test_membership_is_case_insensitive() {
        let mut alphabet = Alphabet::empty();
        alphabet.set_symbol('x', true);

        assert!(alphabet.contains_symbol('X'));
        assert!(alphabet.contains_symbol('x'));

        alphabet.set_symbol('X', false);
        assert!(!alphabet.contains_symbol('x'));
    }

    #[test]
    fn test_bulk_toggles() {
        let mut alphabet = Alphabet::empty();
        alphabet.set_digits(true);
        assert!(alphabet.has_all_digits());
        assert!(!alphabet.has_all_letters());

        alphabet.set_alphabetical(true);
        alphabet.set_digits(false);
        assert!(alphabet.has_all_letters());
        assert!(!alphabet.contains_symbol('5'));
    }

    #[test]
    fn test_clone_is_independent() {
        let live = Alphabet::binary();
        let mut candidate = live.clone();
        candidate.set_symbol('A', true);

        assert!(candidate.contains_symbol('A'));
        assert!(!live.contains_symbol('A'));
    }

    #[test]
    fn test_serialized_as_normalized_list() {
        assert_eq!(
            serde_json::to_string(&Alphabet::binary()).unwrap(),
            r#"["0","1","_"]"#
        );

        let alphabet: Alphabet = serde_json::from_str(r#"["a", "_", "7"]"#).unwrap();
        assert!(alphabet.contains_symbol('A'));
        assert_eq!(alphabet.symbols().collect::<Vec<_>>(), vec!['7', 'A', '_']);

        assert!(serde_json::from_str::<Alphabet>(r#"["0", "*"]"#).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Alphabet::binary().to_string(), "{0, 1, _}");
    }
}
