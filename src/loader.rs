//! This module provides the `ProgramLoader` struct, responsible for loading machine
//! definitions from files, directories and strings.
//!
//! Two formats are recognised by file extension: the `.tm` text format and JSON documents
//! (`.json`).

use crate::machine::Definition;
use crate::parser::parse;
use crate::persist;
use crate::types::MachineError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The on-disk formats a definition can be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// The `.tm` text format.
    Text,
    /// A JSON document.
    Json,
}

impl Format {
    /// Picks the format for `path` from its extension, or `None` for unknown files.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "tm" => Some(Format::Text),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

/// `ProgramLoader` is a utility struct for loading machine definitions.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single definition from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Definition)` if the file is read and parsed successfully.
    /// * `Err(MachineError::FileError)` if the file cannot be read or has an unknown extension.
    /// * `Err(MachineError::ParseError)` or `Err(MachineError::SerializationError)` if the
    ///   content is not a valid definition.
    pub fn load_program(path: &Path) -> Result<Definition, MachineError> {
        let format = Format::from_path(path).ok_or_else(|| {
            MachineError::FileError(format!(
                "Unsupported file {} (expected .tm or .json)",
                path.display()
            ))
        })?;

        let content = fs::read_to_string(path).map_err(|e| {
            MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), ?format, "loading definition");
        Self::load_program_from_string(&content, format)
    }

    /// Loads a single definition from string content in the given format.
    pub fn load_program_from_string(
        content: &str,
        format: Format,
    ) -> Result<Definition, MachineError> {
        match format {
            Format::Text => parse(content),
            Format::Json => persist::from_json(content),
        }
    }

    /// Saves a definition as JSON.
    pub fn save_program(definition: &Definition, path: &Path) -> Result<(), MachineError> {
        let content = persist::to_json(definition)?;
        fs::write(path, content).map_err(|e| {
            MachineError::FileError(format!("Failed to write file {}: {}", path.display(), e))
        })
    }

    /// Loads every `.tm` and `.json` file of a directory.
    ///
    /// Subdirectories and files with other extensions are skipped. Each loaded file yields
    /// either its path and definition or the error that prevented loading it.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Definition), MachineError>> {
        if !directory.exists() {
            return vec![Err(MachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(MachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths: Vec<PathBuf> = Vec::new();
        let mut results = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => results.push(Err(MachineError::FileError(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }
        paths.sort();

        results.extend(
            paths
                .into_iter()
                .filter(|path| !path.is_dir() && Format::from_path(path).is_some())
                .map(|path| match Self::load_program(&path) {
                    Ok(definition) => Ok((path, definition)),
                    Err(e) => Err(MachineError::FileError(format!(
                        "Failed to load program from {}: {}",
                        path.display(),
                        e
                    ))),
                }),
        );
        results
    }
}
