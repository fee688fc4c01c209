//! Process dependency declaration
//!
//! The input is a JSON document shaped like a docker-compose `depends_on` list:
//!
//! ```json
//! { "processes": [ { "name": "app", "dependencies": ["postgresql"] } ] }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// All processes to be ordered
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Declaration {
    #[serde(default)]
    pub processes: Vec<Process>,
}

/// A process and the names of the processes it depends on
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Process {
    pub name: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Process {
    pub fn new(name: &str, dependencies: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeclarationError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed declaration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Process '{0}' is declared more than once")]
    DuplicateProcess(String),

    #[error("Process at position {0} has an empty name")]
    EmptyName(usize),
}

impl Declaration {
    pub fn new(processes: Vec<Process>) -> Self {
        Self { processes }
    }

    /// Parse and validate a declaration from JSON text
    pub fn from_json(content: &str) -> Result<Self, DeclarationError> {
        let declaration: Declaration = serde_json::from_str(content)?;
        declaration.validate()?;
        Ok(declaration)
    }

    /// Read a declaration file from disk
    pub fn load(path: &Path) -> Result<Self, DeclarationError> {
        let content = std::fs::read_to_string(path).map_err(|source| DeclarationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let declaration = Self::from_json(&content)?;
        log::debug!(
            "Loaded {} processes from {}",
            declaration.processes.len(),
            path.display()
        );
        Ok(declaration)
    }

    /// Reject empty and duplicate process names
    pub fn validate(&self) -> Result<(), DeclarationError> {
        let mut seen = HashSet::new();
        for (idx, process) in self.processes.iter().enumerate() {
            if process.name.is_empty() {
                return Err(DeclarationError::EmptyName(idx));
            }
            if !seen.insert(process.name.as_str()) {
                return Err(DeclarationError::DuplicateProcess(process.name.clone()));
            }
        }
        Ok(())
    }
}
