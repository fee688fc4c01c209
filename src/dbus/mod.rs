//! Service manager boundary
//!
//! The pipeline only needs two calls from systemd: reload the unit files
//! and enable the units whose configuration changed. Both sit behind
//! [`ServiceManager`] so runs can be exercised without a live bus.

mod systemd;

pub use systemd::{SystemdConnector, SystemdManager};

use std::fmt;
use std::path::Path;

/// Which systemd instance to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusScope {
    /// Per-user manager on the session bus
    User,
    /// System manager on the system bus
    System,
}

impl BusScope {
    /// User scope for unit directories like `~/.config/systemd/user`
    pub fn for_unit_dir(path: &Path) -> Self {
        if path.to_string_lossy().contains("user") {
            Self::User
        } else {
            Self::System
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
        }
    }
}

impl fmt::Display for BusScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("Failed to connect to the {scope} service manager: {source}")]
    Connect {
        scope: BusScope,
        source: zbus::Error,
    },

    #[error("{operation} failed: {source}")]
    Call {
        operation: &'static str,
        source: zbus::Error,
    },
}

/// Calls made against a connected service manager
#[allow(async_fn_in_trait)]
pub trait ServiceManager {
    /// Re-read all unit files (daemon-reload)
    async fn reload(&self) -> Result<(), ManagerError>;

    /// Persistently enable the given unit files
    async fn enable_unit_files(
        &self,
        files: &[String],
        runtime: bool,
        force: bool,
    ) -> Result<(), ManagerError>;
}

/// Opens a connection to a service manager
///
/// The returned manager owns the connection; dropping it closes the connection.
#[allow(async_fn_in_trait)]
pub trait Connect {
    type Manager: ServiceManager;

    async fn connect(&self, scope: BusScope) -> Result<Self::Manager, ManagerError>;
}
