//! Unit file contents generated from the declaration
//!
//! Services are ordered through a drop-in (`<name>.service.d/dependencies.conf`)
//! so the installed unit file itself is never modified. An optional
//! application target groups every declared service.

use std::fmt;

use super::parser::{self, ParseError, ParsedFile};
use crate::declaration::Process;

/// Drop-in file name inside `<service>.service.d/`
pub const DROPIN_NAME: &str = "dependencies.conf";

/// Target that application targets are installed into
pub const DEFAULT_WANTED_BY: &str = "multi-user.target";

/// A single `key=value` line of a unit file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOption {
    pub section: String,
    pub name: String,
    pub value: String,
}

impl UnitOption {
    pub fn new(section: &str, name: &str, value: impl Into<String>) -> Self {
        Self {
            section: section.to_string(),
            name: name.to_string(),
            value: value.into(),
        }
    }
}

/// An entire unit file or drop-in as an ordered list of options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitFile {
    pub options: Vec<UnitOption>,
}

impl UnitFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: &str, name: &str, value: impl Into<String>) {
        self.options.push(UnitOption::new(section, name, value));
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Parse the serialized form back into sections
    pub fn parsed(&self) -> Result<ParsedFile, ParseError> {
        parser::parse_file(&self.to_string())
    }

    /// True if `existing` holds the same directives as this file
    pub fn matches(&self, existing: &str) -> bool {
        match (self.parsed(), parser::parse_file(existing)) {
            (Ok(desired), Ok(existing)) => parser::equivalent(&desired, &existing),
            (_, Err(e)) => {
                log::debug!("Existing unit file does not parse ({}), treating as changed", e);
                false
            }
            (Err(_), _) => false,
        }
    }
}

impl fmt::Display for UnitFile {
    /// Consecutive options of one section share a header; sections are
    /// separated by a blank line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut current: Option<&str> = None;
        for opt in &self.options {
            if current != Some(opt.section.as_str()) {
                if current.is_some() {
                    writeln!(f)?;
                }
                writeln!(f, "[{}]", opt.section)?;
                current = Some(opt.section.as_str());
            }
            writeln!(f, "{}={}", opt.name, opt.value)?;
        }
        Ok(())
    }
}

/// Dashify an application name: "My Test App" -> "my-test-app"
pub fn format_app_name(app_name: &str) -> String {
    app_name.to_lowercase().replace(' ', "-")
}

/// Unit name of the application target: "My Test App" -> "my-test-app.target"
pub fn app_unit_name(app_name: &str) -> String {
    format!("{}.target", format_app_name(app_name))
}

/// Unit name of a declared process
pub fn service_unit_name(process: &str) -> String {
    format!("{}.service", process)
}

/// Uppercase the first letter of every word, where any non-letter starts a word
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !c.is_alphanumeric();
    }
    out
}

/// Top level target that manages every declared service as one group
pub fn application_target(app_name: &str) -> UnitFile {
    let mut file = UnitFile::new();
    file.push("Unit", "Description", format!("{} top level service", title_case(app_name)));
    file.push("Install", "WantedBy", DEFAULT_WANTED_BY);
    file
}

/// Units a process wants and is ordered after: the application target
/// (if any) followed by each dependency's service unit
pub fn ordering_units(app_unit: Option<&str>, process: &Process) -> Vec<String> {
    app_unit
        .map(str::to_string)
        .into_iter()
        .chain(process.dependencies.iter().map(|d| service_unit_name(d)))
        .collect()
}

/// Ordering drop-in for one process
pub fn dependency_dropin(app_unit: Option<&str>, process: &Process) -> UnitFile {
    let mut file = UnitFile::new();

    if let Some(app_unit) = app_unit {
        file.push("Install", "WantedBy", app_unit);
        file.push("Unit", "PartOf", app_unit);
    }

    let units = ordering_units(app_unit, process);
    if !units.is_empty() {
        let joined = units.join(" ");
        file.push("Unit", "Wants", joined.clone());
        file.push("Unit", "After", joined);
    }

    file
}

/// Example service unit for a process, used to stand up a demo system
pub fn example_service(process: &str) -> UnitFile {
    let mut file = UnitFile::new();
    file.push("Unit", "Description", format!("{} example service", title_case(process)));
    file.push("Service", "Type", "simple");
    file.push("Service", "ExecStart", "/bin/sleep infinity");
    file.push("Service", "Restart", "on-failure");
    file
}
