//! Crate-level error type

use crate::dbus::ManagerError;
use crate::declaration::DeclarationError;
use crate::sync::SyncError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Manager(#[from] ManagerError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
