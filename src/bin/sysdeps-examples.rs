//! sysdeps-examples - install example services for a dependency file
//!
//! Writes a placeholder `<name>.service` (sleeps forever) for every declared
//! process and reloads systemd, so `sysdeps` can be tried on a scratch system.

use std::path::PathBuf;

use clap::Parser;
use sysdeps::dbus::{BusScope, Connect, ServiceManager, SystemdConnector};
use sysdeps::sync::synchronize;
use sysdeps::{units, Declaration};

#[derive(Parser)]
#[command(name = "sysdeps-examples")]
#[command(about = "Install example services for every process in a dependency file")]
struct Args {
    /// Path of the JSON dependency file
    #[arg(long, short = 'c', default_value = "dependencies.json")]
    config: PathBuf,

    /// systemd unit directory [default: ~/.config/systemd/user]
    #[arg(long = "systemdpath", short = 'p')]
    systemd_path: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let unit_dir = match args.systemd_path {
        Some(path) => path,
        None => dirs::config_dir()
            .map(|p| p.join("systemd/user"))
            .ok_or("Cannot determine the user config directory")?,
    };
    let declaration = Declaration::load(&args.config)?;

    let mut written = 0;
    for process in &declaration.processes {
        let path = unit_dir.join(units::service_unit_name(&process.name));
        println!("Adding unit file: {}", path.display());
        if synchronize(&path, &units::example_service(&process.name), false)?.changed() {
            written += 1;
        }
    }

    if written == 0 {
        println!("All example units already installed");
        return Ok(());
    }

    let manager = SystemdConnector
        .connect(BusScope::for_unit_dir(&unit_dir))
        .await?;
    manager.reload().await?;
    log::info!("Reloaded {} service manager", manager.scope());

    Ok(())
}
