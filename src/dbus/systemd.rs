//! org.freedesktop.systemd1.Manager client

use zbus::{proxy, Connection};

use super::{BusScope, Connect, ManagerError, ServiceManager};

#[proxy(
    interface = "org.freedesktop.systemd1.Manager",
    default_service = "org.freedesktop.systemd1",
    default_path = "/org/freedesktop/systemd1"
)]
trait Systemd1Manager {
    fn reload(&self) -> zbus::Result<()>;

    /// Returns (carries_install_info, [(type, file, destination)])
    fn enable_unit_files(
        &self,
        files: &[&str],
        runtime: bool,
        force: bool,
    ) -> zbus::Result<(bool, Vec<(String, String, String)>)>;
}

/// Connects to the real systemd over D-Bus
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemdConnector;

/// A live connection to systemd, closed on drop
pub struct SystemdManager {
    scope: BusScope,
    proxy: Systemd1ManagerProxy<'static>,
}

impl SystemdManager {
    pub async fn connect(scope: BusScope) -> Result<Self, ManagerError> {
        let connect_err = |source| ManagerError::Connect { scope, source };

        let connection = match scope {
            BusScope::User => Connection::session().await,
            BusScope::System => Connection::system().await,
        }
        .map_err(connect_err)?;

        let proxy = Systemd1ManagerProxy::new(&connection)
            .await
            .map_err(connect_err)?;

        log::debug!("Connected to {} service manager", scope);
        Ok(Self { scope, proxy })
    }

    pub fn scope(&self) -> BusScope {
        self.scope
    }
}

impl ServiceManager for SystemdManager {
    async fn reload(&self) -> Result<(), ManagerError> {
        self.proxy
            .reload()
            .await
            .map_err(|source| ManagerError::Call { operation: "Reload", source })
    }

    async fn enable_unit_files(
        &self,
        files: &[String],
        runtime: bool,
        force: bool,
    ) -> Result<(), ManagerError> {
        let files: Vec<&str> = files.iter().map(String::as_str).collect();
        let (_, changes) = self
            .proxy
            .enable_unit_files(&files, runtime, force)
            .await
            .map_err(|source| ManagerError::Call { operation: "EnableUnitFiles", source })?;

        for (change, file, destination) in changes {
            log::debug!("{}: {} -> {}", change, file, destination);
        }
        Ok(())
    }
}

impl Connect for SystemdConnector {
    type Manager = SystemdManager;

    async fn connect(&self, scope: BusScope) -> Result<SystemdManager, ManagerError> {
        SystemdManager::connect(scope).await
    }
}
