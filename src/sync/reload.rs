//! Reload and re-enable changed units

use crate::dbus::{ManagerError, ServiceManager};

use super::ChangedUnit;

/// Reload systemd once and enable every changed unit in a single call
///
/// Returns false without touching the manager when nothing changed.
pub async fn reload_changed<M: ServiceManager>(
    manager: &M,
    changed: &[ChangedUnit],
) -> Result<bool, ManagerError> {
    if changed.is_empty() {
        log::info!("No unit files changed, nothing to do");
        return Ok(false);
    }

    log::info!("{} unit files updated, reloading systemd", changed.len());
    manager.reload().await?;

    let files: Vec<String> = changed
        .iter()
        .map(|unit| unit.unit_path.to_string_lossy().into_owned())
        .collect();
    manager.enable_unit_files(&files, false, false).await?;

    Ok(true)
}
