//! This module defines the [`Simulator`], which binds a [`Machine`] to a tape and drives the
//! computation one transition at a time.
//!
//! A simulator is `NotStarted` until its first [`Simulator::step`] enters the start state,
//! then `Running` until the machine kind's halting policy reports a [`Halt`].

use crate::config::RunConfig;
use crate::machine::Machine;
use crate::tape::{shared, SharedTape, Tape};
use crate::types::{Halt, MachineError, MachineKind, Step, StateId, TransitionId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Runs a machine against a tape.
///
/// Nondeterministic choices are resolved with the injected random source `R`; seed it to
/// make runs reproducible.
pub struct Simulator<R: Rng = StdRng> {
    machine: Machine,
    tape: SharedTape,
    rng: R,
    current_state: Option<StateId>,
    potential: Vec<TransitionId>,
    next: Option<TransitionId>,
    halt: Option<Halt>,
    step_count: usize,
}

impl Simulator<StdRng> {
    /// Creates a simulator over its own tape, seeded from system entropy.
    pub fn new<T: Tape + 'static>(machine: Machine, tape: T) -> Self {
        Self::with_rng(machine, shared(tape), StdRng::from_entropy())
    }

    /// Creates a simulator whose random choices are reproducible.
    pub fn with_seed<T: Tape + 'static>(machine: Machine, tape: T, seed: u64) -> Self {
        Self::with_rng(machine, shared(tape), StdRng::seed_from_u64(seed))
    }

    /// Creates a simulator over a tape other simulators may also hold.
    pub fn with_shared_tape(machine: Machine, tape: SharedTape) -> Self {
        Self::with_rng(machine, tape, StdRng::from_entropy())
    }

    /// Creates a simulator seeded according to `config`.
    pub fn from_config(machine: Machine, tape: SharedTape, config: &RunConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(machine, tape, rng)
    }
}

impl<R: Rng> Simulator<R> {
    /// Binds `machine` to `tape` and resolves the first candidate move.
    pub fn with_rng(machine: Machine, tape: SharedTape, rng: R) -> Self {
        let mut simulator = Self {
            machine,
            tape,
            rng,
            current_state: None,
            potential: Vec::new(),
            next: None,
            halt: None,
            step_count: 0,
        };
        simulator.compute_potential_transitions(false);
        simulator
    }

    /// Advances the computation by one step.
    ///
    /// The first call only enters the start state and fails with
    /// [`MachineError::NoStartState`] if there is none. Later calls apply the chosen
    /// transition. Errors leave the simulator in a consistent state: after
    /// [`MachineError::TapeBounds`] the head is at cell 0, the current state is unchanged
    /// and the candidate moves are recomputed.
    ///
    /// Once the computation has halted, every further call returns the same halt.
    pub fn step(&mut self) -> Result<Step, MachineError> {
        if let Some(halt) = self.halt {
            return Ok(Step::Halt(halt));
        }

        let Some(current) = self.current_state else {
            let start = self
                .machine
                .start_state()
                .ok_or(MachineError::NoStartState)?;
            debug!(state = self.machine.label(start), "entering start state");
            self.current_state = Some(start);
            self.compute_potential_transitions(false);
            return Ok(self.check_halt(start));
        };

        let result = {
            let mut tape = self.tape.borrow_mut();
            self.machine.step(&mut *tape, current, self.next)
        };

        let next = match result {
            Ok(next) => next,
            Err(e) => {
                self.compute_potential_transitions(false);
                return Err(e);
            }
        };

        if let Some(id) = self.next {
            debug!(step = self.step_count + 1, "{}", self.machine.describe(id));
        }

        self.current_state = Some(next);
        self.step_count += 1;
        self.compute_potential_transitions(true);
        Ok(self.check_halt(next))
    }

    /// Steps until the machine halts or `max_steps` steps have run (`0` means no limit).
    ///
    /// Returns `true` only for a successful halt within the limit: for a Turing machine a
    /// final state with the head parked, for a DFSA a final state at the end of the input.
    /// With `verbose`, every configuration is logged.
    pub fn run_until_halt(
        &mut self,
        max_steps: usize,
        verbose: bool,
    ) -> Result<bool, MachineError> {
        self.run_observed(max_steps, |simulator| {
            if verbose {
                info!(step = simulator.step_count, "{}", simulator.configuration());
            }
        })
    }

    /// Like [`Simulator::run_until_halt`], calling `observe` after every step.
    ///
    /// The step entering the start state counts against `max_steps` like any other.
    pub fn run_observed(
        &mut self,
        max_steps: usize,
        mut observe: impl FnMut(&Self),
    ) -> Result<bool, MachineError> {
        let mut steps = 0;

        loop {
            if self.current_state.is_some() && self.is_halted()? {
                break;
            }

            if max_steps != 0 && steps >= max_steps {
                warn!(max_steps, "step limit reached before the machine halted");
                return Ok(false);
            }

            self.step()?;
            steps += 1;
            observe(self);
        }

        Ok(self.is_accepted())
    }

    /// Runs to halt with the limits from `config`.
    pub fn run(&mut self, config: &RunConfig) -> Result<bool, MachineError> {
        self.run_until_halt(config.max_steps, config.verbose)
    }

    /// Forgets the current state so the next step re-enters the start state.
    ///
    /// The tape is left alone.
    pub fn reset_machine(&mut self) {
        self.current_state = None;
        self.halt = None;
        self.step_count = 0;
        self.compute_potential_transitions(false);
    }

    /// Recomputes the candidate moves for the current state and the symbol under the head.
    ///
    /// Before the first step, the start state is used. The chosen move is kept if it is
    /// still a candidate, unless `randomize` is set; otherwise one candidate is picked
    /// uniformly at random.
    pub fn compute_potential_transitions(&mut self, randomize: bool) {
        let state = self.current_state.or_else(|| self.machine.start_state());
        let symbol = self.tape.borrow().read();

        self.potential = state
            .map(|state| self.machine.candidates(state, symbol))
            .unwrap_or_default();

        let keep = !randomize && self.next.is_some_and(|id| self.potential.contains(&id));
        if !keep {
            self.next = self.potential.choose(&mut self.rng).copied();
            if self.potential.len() > 1 {
                if let (Some(state), Some(id)) = (state, self.next) {
                    debug!(
                        state = self.machine.label(state),
                        symbol = %symbol,
                        candidates = self.potential.len(),
                        "resolved nondeterministic choice: {}",
                        self.machine.describe(id)
                    );
                }
            }
        }
    }

    /// Re-resolves candidate moves after the host edited the tape between steps.
    pub fn refresh(&mut self) {
        self.compute_potential_transitions(false);
    }

    /// The moves applicable in the current configuration.
    pub fn potential_transitions(&self) -> &[TransitionId] {
        &self.potential
    }

    /// The move the next step will apply.
    pub fn current_next_transition(&self) -> Option<TransitionId> {
        self.next
    }

    /// Pins the next move. Ignored (returns `false`) unless `id` is a current candidate.
    pub fn set_current_next_transition(&mut self, id: TransitionId) -> bool {
        if !self.potential.contains(&id) {
            return false;
        }
        self.next = Some(id);
        true
    }

    /// Whether the computation is at rest: a Turing machine in a final state, or a DFSA at
    /// the end of its input or without a move.
    ///
    /// Fails with [`MachineError::NoStartState`] before the first step.
    pub fn is_halted(&self) -> Result<bool, MachineError> {
        let state = self.current_state.ok_or(MachineError::NoStartState)?;
        if self.halt.is_some() {
            return Ok(true);
        }

        let symbol = self.tape.borrow().read();
        Ok(self
            .machine
            .kind()
            .is_at_rest(self.machine.is_final(state), symbol))
    }

    /// Like [`Simulator::is_halted`], additionally requiring the head at cell 0.
    pub fn is_halted_with_head_parked(&self) -> Result<bool, MachineError> {
        Ok(self.is_halted()? && self.tape.borrow().is_parked())
    }

    /// Whether the computation halted successfully.
    pub fn is_accepted(&self) -> bool {
        self.halt == Some(Halt::Accepted)
    }

    pub fn halt(&self) -> Option<Halt> {
        self.halt
    }

    /// The current state, `None` before the first step.
    pub fn current_state(&self) -> Option<StateId> {
        self.current_state
    }

    /// The number of transitions applied since the last reset.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Swaps in an edited machine and resets.
    pub fn replace_machine(&mut self, machine: Machine) {
        self.machine = machine;
        self.next = None;
        self.reset_machine();
    }

    /// A handle to the tape, shared with this simulator.
    pub fn tape(&self) -> SharedTape {
        Rc::clone(&self.tape)
    }

    /// The configuration as `"tape-contents", state-label`, e.g. `"1111", q4`.
    pub fn configuration(&self) -> String {
        let state = self
            .current_state
            .map_or("-", |state| self.machine.label(state));
        format!("\"{}\", {}", self.tape.borrow().contents(), state)
    }

    fn check_halt(&mut self, state: StateId) -> Step {
        let kind = self.machine.kind();
        let (symbol, parked) = {
            let tape = self.tape.borrow();
            (tape.read(), tape.is_parked())
        };

        let halt = kind
            .halt(self.machine.is_final(state), symbol, parked)
            .or_else(|| {
                // A DFSA without a move has fallen into the implicit dead state.
                (kind == MachineKind::Dfsa && self.potential.is_empty())
                    .then_some(Halt::Rejected)
            });

        match halt {
            Some(halt) => {
                info!(
                    machine = self.machine.name(),
                    steps = self.step_count,
                    ?halt,
                    "{}",
                    self.configuration()
                );
                self.halt = Some(halt);
                Step::Halt(halt)
            }
            None => Step::Continue,
        }
    }
}
