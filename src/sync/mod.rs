//! Unit synchronization
//!
//! Turns a validated declaration into the minimal set of unit file writes,
//! then reloads systemd once if anything changed.
//!
//! ```text
//! declaration -> DepGraph -> detect ─┬─ cycle ─> RunOutcome::Cycle (nothing touched)
//!                                    └─ acyclic ─> synchronize each unit -> reload_changed
//! ```

mod reload;
mod writer;

pub use reload::reload_changed;
pub use writer::{needs_update, synchronize, SyncError, SyncStatus};

use std::path::{Path, PathBuf};

use crate::dbus::{BusScope, Connect};
use crate::declaration::Declaration;
use crate::graph::{detect, DepGraph, Witness};
use crate::units;
use crate::Error;

/// Where and how to write unit files
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// systemd unit directory, e.g. /etc/systemd/system
    pub unit_dir: PathBuf,
    /// Optional application target grouping every service
    pub app_name: Option<String>,
    /// Compute changes only: no writes, no service manager connection
    pub dry_run: bool,
    pub scope: BusScope,
}

impl SyncOptions {
    /// Options for `unit_dir`, with the bus scope derived from the path
    pub fn new(unit_dir: impl Into<PathBuf>) -> Self {
        let unit_dir = unit_dir.into();
        Self {
            scope: BusScope::for_unit_dir(&unit_dir),
            unit_dir,
            app_name: None,
            dry_run: false,
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        let app_name = app_name.into();
        self.app_name = (!app_name.is_empty()).then_some(app_name);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_scope(mut self, scope: BusScope) -> Self {
        self.scope = scope;
        self
    }

    /// Unit name of the application target, if configured
    pub fn app_unit(&self) -> Option<String> {
        self.app_name.as_deref().map(units::app_unit_name)
    }

    /// Path of a unit file in the unit directory
    pub fn unit_path(&self, unit_name: &str) -> PathBuf {
        self.unit_dir.join(unit_name)
    }

    /// Path of a process's ordering drop-in
    pub fn dropin_path(&self, process: &str) -> PathBuf {
        self.unit_dir
            .join(format!("{}.d", units::service_unit_name(process)))
            .join(units::DROPIN_NAME)
    }
}

/// A unit whose configuration was (or in a dry run, would be) rewritten
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedUnit {
    pub name: String,
    /// Unit file handed to the service manager for enabling
    pub unit_path: PathBuf,
}

/// Content a dry run would have written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub path: PathBuf,
    pub content: String,
}

/// What a configure run did
#[derive(Debug, Default)]
pub struct ConfigureReport {
    /// Change set, in processing order
    pub changed: Vec<ChangedUnit>,
    /// Dry run only
    pub pending: Vec<PendingWrite>,
    /// True if systemd was reloaded and the changed units enabled
    pub reloaded: bool,
}

impl ConfigureReport {
    fn record(&mut self, name: String, unit_path: PathBuf, path: &Path, status: SyncStatus) {
        if let SyncStatus::Pending(content) = &status {
            self.pending.push(PendingWrite {
                path: path.to_path_buf(),
                content: content.clone(),
            });
        }
        if status.changed() {
            self.changed.push(ChangedUnit { name, unit_path });
        }
    }
}

/// Result of a full run
#[derive(Debug)]
pub enum RunOutcome {
    /// The declaration has a dependency cycle; nothing was written
    Cycle(Witness),
    Configured(ConfigureReport),
}

/// Check the declaration for cycles, then configure systemd
pub async fn run<C: Connect>(
    options: &SyncOptions,
    declaration: &Declaration,
    connector: &C,
) -> Result<RunOutcome, Error> {
    let graph = DepGraph::build(declaration);
    if let Some(witness) = detect(&graph) {
        log::warn!("Cycle found between {} and {}", witness.start, witness.end);
        return Ok(RunOutcome::Cycle(witness));
    }
    drop(graph);

    log::info!("No dependency cycles found, starting systemd configuration");
    let report = configure(options, declaration, connector).await?;
    Ok(RunOutcome::Configured(report))
}

/// Write the application target and every ordering drop-in for an acyclic
/// declaration, then reload systemd if anything changed
///
/// The service manager connection is opened up front (never in a dry run)
/// and closed when this returns, on error paths included.
pub async fn configure<C: Connect>(
    options: &SyncOptions,
    declaration: &Declaration,
    connector: &C,
) -> Result<ConfigureReport, Error> {
    let manager = if options.dry_run {
        None
    } else {
        Some(connector.connect(options.scope).await?)
    };

    let mut report = ConfigureReport::default();
    let app_unit = options.app_unit();

    if let (Some(app_name), Some(app_unit)) = (&options.app_name, &app_unit) {
        let path = options.unit_path(app_unit);
        let status = synchronize(&path, &units::application_target(app_name), options.dry_run)?;
        report.record(app_unit.clone(), path.clone(), &path, status);
    }

    for process in &declaration.processes {
        let path = options.dropin_path(&process.name);
        let dropin = units::dependency_dropin(app_unit.as_deref(), process);
        let status = synchronize(&path, &dropin, options.dry_run)?;

        let unit_name = units::service_unit_name(&process.name);
        let unit_path = options.unit_path(&unit_name);
        report.record(unit_name, unit_path, &path, status);
    }

    if let Some(manager) = &manager {
        report.reloaded = reload_changed(manager, &report.changed).await?;
    }

    Ok(report)
}
