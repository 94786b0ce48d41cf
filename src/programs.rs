//! The catalog of sample machines embedded in the crate.

use crate::analyzer::analyze;
use crate::machine::Definition;
use crate::parser::parse;
use crate::types::{MachineError, MachineKind};
use std::sync::RwLock;
use tracing::warn;

// Embedded sample machines
const PROGRAM_TEXTS: [&str; 3] = [
    include_str!("../machines/unary-successor.tm"),
    include_str!("../machines/even-ones.tm"),
    include_str!("../machines/ends-in-zero.tm"),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: RwLock<Vec<Definition>> = RwLock::new(Vec::new());
}

pub struct ProgramManager;

impl ProgramManager {
    /// Parses the embedded samples into [`PROGRAMS`]. Samples that fail to parse or
    /// validate are skipped with a warning.
    pub fn load() -> Result<(), MachineError> {
        let mut programs = Vec::new();

        for (index, text) in PROGRAM_TEXTS.iter().enumerate() {
            match parse(text).and_then(|definition| {
                analyze(&definition.machine)?;
                Ok(definition)
            }) {
                Ok(definition) => programs.push(definition),
                Err(e) => warn!(index, error = %e, "skipping invalid sample machine"),
            }
        }

        let mut guard = PROGRAMS
            .write()
            .map_err(|_| MachineError::FileError("Failed to acquire write lock".to_string()))?;
        *guard = programs;

        Ok(())
    }

    /// Loads the catalog on first use.
    fn ensure_loaded() {
        let loaded = PROGRAMS.read().map(|p| !p.is_empty()).unwrap_or(false);
        if !loaded {
            let _ = Self::load();
        }
    }

    fn with_programs<T>(f: impl FnOnce(&[Definition]) -> T) -> Result<T, MachineError> {
        Self::ensure_loaded();
        PROGRAMS
            .read()
            .map(|programs| f(&programs))
            .map_err(|_| MachineError::FileError("Failed to acquire read lock".to_string()))
    }

    pub fn get_program_count() -> usize {
        Self::with_programs(|programs| programs.len()).unwrap_or(0)
    }

    pub fn get_program_by_index(index: usize) -> Result<Definition, MachineError> {
        Self::with_programs(|programs| programs.get(index).cloned())?.ok_or_else(|| {
            MachineError::ValidationError(format!("Program index {} out of range", index))
        })
    }

    /// Looks a sample up by name, ignoring case.
    pub fn get_program_by_name(name: &str) -> Result<Definition, MachineError> {
        Self::with_programs(|programs| {
            programs
                .iter()
                .find(|definition| definition.name().eq_ignore_ascii_case(name))
                .cloned()
        })?
        .ok_or_else(|| MachineError::ValidationError(format!("Program '{}' not found", name)))
    }

    pub fn list_program_names() -> Vec<String> {
        Self::with_programs(|programs| {
            programs
                .iter()
                .map(|definition| definition.name().to_string())
                .collect()
        })
        .unwrap_or_default()
    }

    pub fn get_program_info(index: usize) -> Result<ProgramInfo, MachineError> {
        let definition = Self::get_program_by_index(index)?;
        let machine = &definition.machine;

        Ok(ProgramInfo {
            index,
            name: definition.name().to_string(),
            kind: machine.kind(),
            start_state: machine
                .start_state()
                .map(|id| machine.label(id).to_string()),
            initial_tape: definition.tape.clone(),
            state_count: machine.state_count(),
            transition_count: machine.transition_count(),
        })
    }

    /// Returns the indices of samples whose name contains `query`, ignoring case.
    pub fn search_programs(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();
        Self::with_programs(|programs| {
            programs
                .iter()
                .enumerate()
                .filter(|(_, definition)| definition.name().to_lowercase().contains(&query))
                .map(|(index, _)| index)
                .collect()
        })
        .unwrap_or_default()
    }

    pub fn get_program_text_by_index(index: usize) -> Result<&'static str, MachineError> {
        PROGRAM_TEXTS.get(index).copied().ok_or_else(|| {
            MachineError::ValidationError(format!("Program text index {} out of range", index))
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub kind: MachineKind,
    pub start_state: Option<String>,
    pub initial_tape: String,
    pub state_count: usize,
    pub transition_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::Simulator;
    use crate::tape::ArrayTape;
    use crate::types::Halt;

    #[test]
    fn test_program_manager_initialization() {
        assert!(ProgramManager::load().is_ok());
        assert_eq!(ProgramManager::get_program_count(), PROGRAM_TEXTS.len());
    }

    #[test]
    fn test_program_names() {
        let names = ProgramManager::list_program_names();
        assert!(names.contains(&"Unary successor".to_string()));
        assert!(names.contains(&"Even number of ones".to_string()));
        assert!(names.contains(&"Ends in zero".to_string()));
    }

    #[test]
    fn test_all_programs_are_valid() {
        for i in 0..ProgramManager::get_program_count() {
            let definition = ProgramManager::get_program_by_index(i).unwrap();
            let warnings = analyze(&definition.machine).unwrap();
            assert!(warnings.is_empty(), "'{}': {:?}", definition.name(), warnings);
        }
    }

    #[test]
    fn test_programs_accept_their_sample_tape() {
        for i in 0..ProgramManager::get_program_count() {
            let definition = ProgramManager::get_program_by_index(i).unwrap();
            let name = definition.name().to_string();
            let mut simulator =
                Simulator::with_seed(definition.machine, ArrayTape::new(&definition.tape), 0);

            assert!(simulator.run_until_halt(1000, false).unwrap(), "'{name}' rejected");
            assert_eq!(simulator.halt(), Some(Halt::Accepted));
        }
    }

    #[test]
    fn test_program_manager_get_program_by_index() {
        assert!(ProgramManager::get_program_by_index(0).is_ok());
        assert!(ProgramManager::get_program_by_index(999).is_err());
    }

    #[test]
    fn test_program_manager_get_program_by_name() {
        let definition = ProgramManager::get_program_by_name("unary SUCCESSOR").unwrap();
        assert_eq!(definition.tape, "111");

        assert!(ProgramManager::get_program_by_name("Nonexistent").is_err());
    }

    #[test]
    fn test_program_manager_get_program_info() {
        let info = ProgramManager::get_program_info(0).unwrap();
        assert_eq!(info.index, 0);
        assert_eq!(info.name, "Unary successor");
        assert_eq!(info.kind, MachineKind::Turing);
        assert_eq!(info.start_state.as_deref(), Some("q0"));
        assert_eq!(info.state_count, 5);
        assert_eq!(info.transition_count, 6);

        assert!(ProgramManager::get_program_info(999).is_err());
    }

    #[test]
    fn test_program_manager_search_programs() {
        assert_eq!(ProgramManager::search_programs("ONES"), vec![1]);
        assert_eq!(ProgramManager::search_programs("e").len(), 3);
        assert!(ProgramManager::search_programs("nonexistent").is_empty());
    }

    #[test]
    fn test_program_text_by_index() {
        assert!(ProgramManager::get_program_text_by_index(2)
            .unwrap()
            .contains("name: Ends in zero"));
        assert!(ProgramManager::get_program_text_by_index(3).is_err());
    }
}
