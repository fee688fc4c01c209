//! sysdeps - systemd service ordering from a dependency list
//!
//! Reads a list of processes and the processes they depend on, proves the
//! list is acyclic, and writes systemd drop-ins so the services start in
//! order:
//! - One `<service>.service.d/dependencies.conf` per process with `Wants=`/`After=`
//! - An optional `<app>.target` that groups every service
//! - Only files whose directives changed are rewritten; systemd is reloaded
//!   once at the end if anything changed
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                    sysdeps                       │
//! ├─────────────────────────────────────────────────┤
//! │  Declaration  │  Graph + Cycles │  Unit grammar  │
//! ├─────────────────────────────────────────────────┤
//! │     Synchronizer      │   systemd over D-Bus     │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod dbus;
pub mod declaration;
mod error;
pub mod graph;
pub mod sync;
pub mod units;

pub use declaration::{Declaration, Process};
pub use error::{Error, Result};
pub use graph::{detect, DepGraph, Witness};
pub use sync::{configure, run, ConfigureReport, RunOutcome, SyncOptions};
