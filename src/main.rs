use std::path::PathBuf;

use clap::Parser;
use sysdeps::dbus::{BusScope, SystemdConnector};
use sysdeps::{Declaration, DepGraph, RunOutcome, SyncOptions};

#[derive(Parser)]
#[command(name = "sysdeps")]
#[command(about = "Order systemd services from a dependency list using drop-in files")]
struct Args {
    /// Path of the JSON dependency file
    #[arg(long, short = 'c', default_value = "dependencies.json")]
    config: PathBuf,

    /// systemd unit directory [default: /etc/systemd/system, or
    /// ~/.config/systemd/user with --user]
    #[arg(long = "systemdpath", short = 'p')]
    systemd_path: Option<PathBuf>,

    /// Create a top-level application target to manage all services
    #[arg(long)]
    app: Option<String>,

    /// Don't modify the system, print out the files that would change
    #[arg(long, short = 'n', alias = "dryrun")]
    dry_run: bool,

    /// Talk to the user service manager instead of the system one
    #[arg(long)]
    user: bool,

    /// Print the dependency graph before checking it
    #[arg(long)]
    print_graph: bool,
}

impl Args {
    fn sync_options(&self) -> Result<SyncOptions, Box<dyn std::error::Error>> {
        let unit_dir = match (&self.systemd_path, self.user) {
            (Some(path), _) => path.clone(),
            (None, true) => dirs::config_dir()
                .map(|p| p.join("systemd/user"))
                .ok_or("Cannot determine the user config directory")?,
            (None, false) => PathBuf::from("/etc/systemd/system"),
        };

        let mut options = SyncOptions::new(unit_dir).with_dry_run(self.dry_run);
        if let Some(app) = &self.app {
            options = options.with_app_name(app.as_str());
        }
        if self.user {
            options = options.with_scope(BusScope::User);
        }
        Ok(options)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let options = args.sync_options()?;
    let declaration = Declaration::load(&args.config)?;

    if args.print_graph {
        print!("{}", DepGraph::build(&declaration));
    }

    match sysdeps::run(&options, &declaration, &SystemdConnector).await? {
        RunOutcome::Cycle(witness) => {
            println!("Cycle found between {} and {}", witness.start, witness.end);
            std::process::exit(1);
        }
        RunOutcome::Configured(report) => {
            for write in &report.pending {
                println!("##### {} #####", write.path.display());
                println!("{}", write.content);
                println!("##########\n");
            }

            if report.changed.is_empty() {
                println!("Nothing to do, all unit files are up to date");
            } else if options.dry_run {
                println!("{} unit files would change", report.changed.len());
            } else {
                println!("Updated and enabled {} units:", report.changed.len());
                for unit in &report.changed {
                    println!("  {}", unit.name);
                }
            }
        }
    }

    Ok(())
}
