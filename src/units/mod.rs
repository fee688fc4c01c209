//! Unit file grammar and generated unit contents
//!
//! Parses existing unit files and drop-ins, and builds the options
//! written for the application target and each service's ordering drop-in.

mod fragment;
mod parser;

pub use fragment::{
    app_unit_name, application_target, dependency_dropin, example_service, format_app_name,
    ordering_units, service_unit_name, title_case, UnitFile, UnitOption, DEFAULT_WANTED_BY,
    DROPIN_NAME,
};
pub use parser::{equivalent, parse_file, ParseError, ParsedFile, ParsedSection};
