use machina::{ArrayTape, MachineError, SparseTape, Tape, BLANK_SYMBOL};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Left,
    Right,
    Write(char),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::Left),
        2 => Just(Op::Right),
        1 => prop_oneof![Just('0'), Just('1'), Just('A'), Just(BLANK_SYMBOL)].prop_map(Op::Write),
    ]
}

fn content() -> impl Strategy<Value = String> {
    proptest::collection::vec(prop_oneof![Just('0'), Just('1'), Just('B'), Just('_')], 0..40)
        .prop_map(|symbols| symbols.into_iter().collect())
}

/// A plain vector model of a right-infinite tape.
struct Model {
    cells: Vec<char>,
    head: usize,
}

impl Model {
    fn render(&self, length: usize) -> String {
        (0..length)
            .map(|i| self.cells.get(i).copied().unwrap_or(BLANK_SYMBOL))
            .collect()
    }
}

fn apply(tape: &mut dyn Tape, op: &Op) -> Result<(), MachineError> {
    match op {
        Op::Left => tape.head_left(),
        Op::Right => {
            tape.head_right();
            Ok(())
        }
        Op::Write(symbol) => {
            tape.write(*symbol);
            Ok(())
        }
    }
}

proptest! {
    #[test]
    fn tapes_agree_with_model(initial in content(), ops in proptest::collection::vec(op(), 0..200)) {
        let mut array = ArrayTape::new(&initial);
        let mut sparse = SparseTape::new(&initial);
        let mut model = Model { cells: initial.chars().collect(), head: 0 };

        for op in &ops {
            let at_left_edge = model.head == 0;
            match op {
                Op::Left => model.head = model.head.saturating_sub(1),
                Op::Right => model.head += 1,
                Op::Write(symbol) => {
                    if model.cells.len() <= model.head {
                        model.cells.resize(model.head + 1, BLANK_SYMBOL);
                    }
                    model.cells[model.head] = *symbol;
                }
            }

            for tape in [&mut array as &mut dyn Tape, &mut sparse as &mut dyn Tape] {
                let result = apply(tape, op);
                if matches!(op, Op::Left) && at_left_edge {
                    prop_assert_eq!(result, Err(MachineError::TapeBounds));
                } else {
                    prop_assert!(result.is_ok());
                }
                prop_assert_eq!(tape.position(), model.head);
            }
        }

        let length = model.cells.len().max(model.head) + 8;
        prop_assert_eq!(array.partial_string(0, length), model.render(length));
        prop_assert_eq!(sparse.partial_string(0, length), model.render(length));
        prop_assert_eq!(array.contents(), sparse.contents());
    }

    #[test]
    fn reading_past_the_end_is_blank(initial in content(), offset in 0usize..100) {
        let array = ArrayTape::new(&initial);
        let sparse = SparseTape::new(&initial);

        for tape in [&array as &dyn Tape, &sparse as &dyn Tape] {
            let beyond = tape.partial_string(tape.len() + offset, 3);
            prop_assert_eq!(beyond, "___");
        }
    }

    #[test]
    fn persisted_tapes_reload_with_head_parked(
        initial in content(),
        moves in 0usize..50,
    ) {
        let mut tape = ArrayTape::new(&initial);
        for _ in 0..moves {
            tape.head_right();
        }

        let json = serde_json::to_string(&tape).unwrap();
        let reloaded: SparseTape = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(reloaded.position(), 0);
        prop_assert_eq!(reloaded.contents(), initial.trim_end_matches(BLANK_SYMBOL));
        let length = initial.len() + 4;
        prop_assert_eq!(reloaded.partial_string(0, length), tape.partial_string(0, length));
    }
}
