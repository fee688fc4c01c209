//! Shared helpers: scratch directories and a recording service manager

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use sysdeps::dbus::{BusScope, Connect, ManagerError, ServiceManager};

static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

pub fn unique_test_dir(prefix: &str) -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = PathBuf::from(format!("/tmp/sysdeps-{}-{}-{}", prefix, std::process::id(), id));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Every file under `dir` with its content, sorted by path
pub fn snapshot(dir: &Path) -> Vec<(PathBuf, String)> {
    fn walk(dir: &Path, out: &mut Vec<(PathBuf, String)>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                out.push((path.clone(), String::from("<dir>")));
                walk(&path, out);
            } else {
                out.push((path.clone(), fs::read_to_string(&path).unwrap_or_default()));
            }
        }
    }

    let mut out = Vec::new();
    walk(dir, &mut out);
    out.sort();
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect(BusScope),
    Reload,
    Enable {
        files: Vec<String>,
        runtime: bool,
        force: bool,
    },
    Close,
}

/// Connector whose managers log every call instead of talking to systemd
#[derive(Clone, Default)]
pub struct RecordingConnector {
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub fail_connect: bool,
    pub fail_reload: bool,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

pub struct RecordingManager {
    calls: Arc<Mutex<Vec<Call>>>,
    fail_reload: bool,
}

impl Drop for RecordingManager {
    fn drop(&mut self) {
        self.calls.lock().unwrap().push(Call::Close);
    }
}

fn failure(operation: &'static str) -> ManagerError {
    ManagerError::Call {
        operation,
        source: zbus::Error::Failure(String::from("mock failure")),
    }
}

impl ServiceManager for RecordingManager {
    async fn reload(&self) -> Result<(), ManagerError> {
        self.calls.lock().unwrap().push(Call::Reload);
        if self.fail_reload {
            return Err(failure("Reload"));
        }
        Ok(())
    }

    async fn enable_unit_files(
        &self,
        files: &[String],
        runtime: bool,
        force: bool,
    ) -> Result<(), ManagerError> {
        self.calls.lock().unwrap().push(Call::Enable {
            files: files.to_vec(),
            runtime,
            force,
        });
        Ok(())
    }
}

impl Connect for RecordingConnector {
    type Manager = RecordingManager;

    async fn connect(&self, scope: BusScope) -> Result<RecordingManager, ManagerError> {
        if self.fail_connect {
            return Err(ManagerError::Connect {
                scope,
                source: zbus::Error::Failure(String::from("no bus")),
            });
        }
        self.calls.lock().unwrap().push(Call::Connect(scope));
        Ok(RecordingManager {
            calls: Arc::clone(&self.calls),
            fail_reload: self.fail_reload,
        })
    }
}
