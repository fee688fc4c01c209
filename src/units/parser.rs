//! INI-style unit file parser
//!
//! Parses systemd unit files and drop-ins into per-section value lists.

use std::collections::{BTreeSet, HashMap};

/// A section contains key-value pairs, where each key can have multiple values
/// The u32 is the order the value appeared (for stable ordering)
pub type ParsedSection = HashMap<String, Vec<(u32, String)>>;

/// A parsed unit file is a map of section names to their contents
pub type ParsedFile = HashMap<String, ParsedSection>;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Section '{0}' appears more than once")]
    DuplicateSection(String),
}

/// Parse a unit file from a string
pub fn parse_file(content: &str) -> Result<ParsedFile, ParseError> {
    let mut sections = HashMap::new();
    let mut lines = content.lines().map(str::trim).peekable();

    // Skip lines before the first section
    while lines.peek().is_some_and(|l| !l.starts_with('[')) {
        lines.next();
    }

    let Some(first_section) = lines.next() else {
        return Ok(sections); // Empty file
    };

    let mut current_section_name = first_section.to_string();
    let mut current_section_lines = Vec::new();

    for line in lines {
        if line.starts_with('[') {
            if sections.contains_key(&current_section_name) {
                return Err(ParseError::DuplicateSection(current_section_name));
            }
            sections.insert(
                current_section_name.clone(),
                parse_section(&current_section_lines),
            );
            current_section_name = line.to_string();
            current_section_lines.clear();
        } else {
            current_section_lines.push(line);
        }
    }

    if sections.contains_key(&current_section_name) {
        return Err(ParseError::DuplicateSection(current_section_name));
    }
    sections.insert(current_section_name, parse_section(&current_section_lines));

    Ok(sections)
}

/// Keys that accept space-separated multiple values
const SPACE_SEPARATED_KEYS: &[&str] = &[
    "AFTER", "BEFORE", "REQUIRES", "WANTS", "CONFLICTS", "PARTOF", "WANTEDBY", "REQUIREDBY",
];

/// Parse a single section's lines into key-value pairs
fn parse_section(lines: &[&str]) -> ParsedSection {
    let mut entries: ParsedSection = HashMap::new();
    let mut entry_number = 0u32;

    for line in lines {
        if line.starts_with('#') || line.starts_with(';') || line.is_empty() {
            continue;
        }

        let Some((name, value)) = line.split_once('=') else {
            continue;
        };
        let name = name.trim().to_uppercase();
        let value = value.trim();

        let values: Vec<&str> = if SPACE_SEPARATED_KEYS.contains(&name.as_str()) {
            value.split_whitespace().collect()
        } else {
            vec![value]
        };

        let vec = entries.entry(name).or_default();
        for v in values {
            if !v.is_empty() {
                vec.push((entry_number, v.to_string()));
                entry_number += 1;
            }
        }
    }

    entries
}

/// Compare two parsed files as sets
///
/// Per section and key the value sets must match; ordering and repeated
/// values are ignored. Keys without any value count as absent.
pub fn equivalent(a: &ParsedFile, b: &ParsedFile) -> bool {
    as_sets(a) == as_sets(b)
}

type SectionSets<'a> = BTreeSet<(&'a str, &'a str, BTreeSet<&'a str>)>;

fn as_sets(file: &ParsedFile) -> SectionSets<'_> {
    file.iter()
        .flat_map(|(section, entries)| {
            entries.iter().filter(|(_, v)| !v.is_empty()).map(move |(key, values)| {
                (
                    section.as_str(),
                    key.as_str(),
                    values.iter().map(|(_, v)| v.as_str()).collect(),
                )
            })
        })
        .collect()
}
