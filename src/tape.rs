//! This module defines the [`Tape`] abstraction: a one-ended, right-infinite sequence of
//! symbols with a single read/write head, plus two backing strategies and the change
//! notification hook hosts use to keep several views of one tape in sync.

use crate::types::{normalize_symbol, MachineError, BLANK_SYMBOL};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// Number of cells an [`ArrayTape`] materializes up front.
pub const DEFAULT_TAPE_CAPACITY: usize = 32;

/// A tape shared between several simulators, e.g. one per open machine view.
///
/// Only one simulator should be stepping at a time; the others observe.
pub type SharedTape = Rc<RefCell<dyn Tape>>;

/// Wraps a tape so it can be shared between simulators.
pub fn shared<T: Tape + 'static>(tape: T) -> SharedTape {
    Rc::new(RefCell::new(tape))
}

/// A change made to a tape, delivered to every subscribed observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapeEvent {
    /// A symbol was written at `position`.
    Written { position: usize, symbol: char },
    /// The head moved to `position`.
    HeadMoved { position: usize },
    /// The head was reset to cell 0.
    HeadReset,
    /// Every cell was reset to blank.
    Cleared,
    /// The whole content was replaced.
    Replaced,
}

/// Handle returned by [`Tape::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Observer = Box<dyn FnMut(&TapeEvent)>;

/// The observers subscribed to one tape.
///
/// Callbacks run while the tape is mutably borrowed, so they must not reach back into a
/// [`SharedTape`] they are subscribed to; everything they need is in the event.
#[derive(Default)]
pub struct Observers {
    next_id: usize,
    observers: Vec<(SubscriptionId, Observer)>,
}

impl Observers {
    pub fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Removes an observer. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(other, _)| *other != id);
        self.observers.len() != before
    }

    pub fn notify(&mut self, event: TapeEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.observers.len())
            .finish()
    }
}

/// A logically right-infinite tape with a read/write head.
///
/// Cells default to [`BLANK_SYMBOL`]. The head is a non-negative cell index; cell 0 is the
/// leftmost cell.
pub trait Tape: fmt::Debug {
    /// Returns the symbol under the head.
    fn read(&self) -> char;

    /// Overwrites the cell under the head with the normalized `symbol`.
    fn write(&mut self, symbol: char);

    /// Moves the head one cell left.
    ///
    /// Fails with [`MachineError::TapeBounds`] at cell 0; the head is left (reset) at 0.
    fn head_left(&mut self) -> Result<(), MachineError>;

    /// Moves the head one cell right, materializing blank cells as needed.
    fn head_right(&mut self);

    /// Moves the head back to cell 0.
    fn reset_rw_head(&mut self);

    /// The head's cell index.
    fn position(&self) -> usize;

    /// The number of materialized cells. Every cell at or beyond this reads blank.
    fn len(&self) -> usize;

    /// Returns `length` symbols starting at `start`. Never mutates the tape.
    fn partial_string(&self, start: usize, length: usize) -> String;

    /// Resets every cell to blank and the head to 0.
    fn clear_tape(&mut self);

    /// Replaces this tape's content with `content` and resets the head to 0.
    fn load(&mut self, content: &str);

    fn observers(&mut self) -> &mut Observers;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the head is at cell 0.
    fn is_parked(&self) -> bool {
        self.position() == 0
    }

    /// Replaces this tape's content with a copy of `other`'s and resets the head to 0.
    fn copy_other(&mut self, other: &dyn Tape) {
        let content = other.partial_string(0, other.len());
        self.load(&content);
    }

    /// The persisted form: every symbol up to the last non-blank cell.
    fn contents(&self) -> String {
        let content = self.partial_string(0, self.len());
        content.trim_end_matches(BLANK_SYMBOL).to_string()
    }

    fn subscribe(&mut self, observer: Box<dyn FnMut(&TapeEvent)>) -> SubscriptionId {
        self.observers().subscribe(observer)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers().unsubscribe(id)
    }
}

/// Array-backed tape. Storage doubles whenever the head walks off the end.
#[derive(Debug, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ArrayTape {
    cells: Vec<char>,
    head: usize,
    observers: Observers,
}

impl ArrayTape {
    /// Creates a tape holding `content` from cell 0, with blanks after it.
    pub fn new(content: &str) -> Self {
        let mut tape = Self {
            cells: Vec::new(),
            head: 0,
            observers: Observers::default(),
        };
        tape.fill(content);
        tape
    }

    fn fill(&mut self, content: &str) {
        self.cells = content.chars().map(normalize_symbol).collect();
        let capacity = self.cells.len().max(DEFAULT_TAPE_CAPACITY);
        self.cells.resize(capacity, BLANK_SYMBOL);
        self.head = 0;
    }

    fn grow(&mut self) {
        let capacity = (self.cells.len() * 2).max(DEFAULT_TAPE_CAPACITY);
        trace!(from = self.cells.len(), to = capacity, "growing array tape");
        self.cells.resize(capacity, BLANK_SYMBOL);
    }
}

impl Default for ArrayTape {
    fn default() -> Self {
        Self::new("")
    }
}

impl Clone for ArrayTape {
    /// Copies content and head position; observers are not carried over.
    fn clone(&self) -> Self {
        Self {
            cells: self.cells.clone(),
            head: self.head,
            observers: Observers::default(),
        }
    }
}

impl PartialEq for ArrayTape {
    fn eq(&self, other: &Self) -> bool {
        self.contents() == other.contents()
    }
}

impl From<String> for ArrayTape {
    fn from(content: String) -> Self {
        Self::new(&content)
    }
}

impl From<ArrayTape> for String {
    fn from(tape: ArrayTape) -> Self {
        tape.contents()
    }
}

impl Tape for ArrayTape {
    fn read(&self) -> char {
        self.cells.get(self.head).copied().unwrap_or(BLANK_SYMBOL)
    }

    fn write(&mut self, symbol: char) {
        let symbol = normalize_symbol(symbol);
        while self.head >= self.cells.len() {
            self.grow();
        }
        self.cells[self.head] = symbol;
        self.observers.notify(TapeEvent::Written {
            position: self.head,
            symbol,
        });
    }

    fn head_left(&mut self) -> Result<(), MachineError> {
        if self.head == 0 {
            self.reset_rw_head();
            return Err(MachineError::TapeBounds);
        }

        self.head -= 1;
        self.observers.notify(TapeEvent::HeadMoved {
            position: self.head,
        });
        Ok(())
    }

    fn head_right(&mut self) {
        self.head += 1;
        while self.head >= self.cells.len() {
            self.grow();
        }
        self.observers.notify(TapeEvent::HeadMoved {
            position: self.head,
        });
    }

    fn reset_rw_head(&mut self) {
        self.head = 0;
        self.observers.notify(TapeEvent::HeadReset);
    }

    fn position(&self) -> usize {
        self.head
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    fn partial_string(&self, start: usize, length: usize) -> String {
        (start..start.saturating_add(length))
            .map(|i| self.cells.get(i).copied().unwrap_or(BLANK_SYMBOL))
            .collect()
    }

    fn clear_tape(&mut self) {
        self.fill("");
        self.observers.notify(TapeEvent::Cleared);
    }

    fn load(&mut self, content: &str) {
        self.fill(content);
        self.observers.notify(TapeEvent::Replaced);
    }

    fn observers(&mut self) -> &mut Observers {
        &mut self.observers
    }
}

/// Auto-growing tape that only stores cells that hold a non-blank symbol.
///
/// The materialized length is one past the furthest cell the head or the content has
/// reached.
#[derive(Debug, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SparseTape {
    cells: BTreeMap<usize, char>,
    extent: usize,
    head: usize,
    observers: Observers,
}

impl SparseTape {
    pub fn new(content: &str) -> Self {
        let mut tape = Self {
            cells: BTreeMap::new(),
            extent: 0,
            head: 0,
            observers: Observers::default(),
        };
        tape.fill(content);
        tape
    }

    fn fill(&mut self, content: &str) {
        self.cells = content
            .chars()
            .map(normalize_symbol)
            .enumerate()
            .filter(|(_, c)| *c != BLANK_SYMBOL)
            .collect();
        self.extent = content.chars().count().max(1);
        self.head = 0;
    }
}

impl Default for SparseTape {
    fn default() -> Self {
        Self::new("")
    }
}

impl Clone for SparseTape {
    /// Copies content and head position; observers are not carried over.
    fn clone(&self) -> Self {
        Self {
            cells: self.cells.clone(),
            extent: self.extent,
            head: self.head,
            observers: Observers::default(),
        }
    }
}

impl PartialEq for SparseTape {
    fn eq(&self, other: &Self) -> bool {
        self.contents() == other.contents()
    }
}

impl From<String> for SparseTape {
    fn from(content: String) -> Self {
        Self::new(&content)
    }
}

impl From<SparseTape> for String {
    fn from(tape: SparseTape) -> Self {
        tape.contents()
    }
}

impl Tape for SparseTape {
    fn read(&self) -> char {
        self.cells.get(&self.head).copied().unwrap_or(BLANK_SYMBOL)
    }

    fn write(&mut self, symbol: char) {
        let symbol = normalize_symbol(symbol);
        if symbol == BLANK_SYMBOL {
            self.cells.remove(&self.head);
        } else {
            self.cells.insert(self.head, symbol);
        }
        self.observers.notify(TapeEvent::Written {
            position: self.head,
            symbol,
        });
    }

    fn head_left(&mut self) -> Result<(), MachineError> {
        if self.head == 0 {
            self.reset_rw_head();
            return Err(MachineError::TapeBounds);
        }

        self.head -= 1;
        self.observers.notify(TapeEvent::HeadMoved {
            position: self.head,
        });
        Ok(())
    }

    fn head_right(&mut self) {
        self.head += 1;
        self.extent = self.extent.max(self.head + 1);
        self.observers.notify(TapeEvent::HeadMoved {
            position: self.head,
        });
    }

    fn reset_rw_head(&mut self) {
        self.head = 0;
        self.observers.notify(TapeEvent::HeadReset);
    }

    fn position(&self) -> usize {
        self.head
    }

    fn len(&self) -> usize {
        self.extent
    }

    fn partial_string(&self, start: usize, length: usize) -> String {
        (start..start.saturating_add(length))
            .map(|i| self.cells.get(&i).copied().unwrap_or(BLANK_SYMBOL))
            .collect()
    }

    fn clear_tape(&mut self) {
        self.fill("");
        self.observers.notify(TapeEvent::Cleared);
    }

    fn load(&mut self, content: &str) {
        self.fill(content);
        self.observers.notify(TapeEvent::Replaced);
    }

    fn observers(&mut self) -> &mut Observers {
        &mut self.observers
    }
}
