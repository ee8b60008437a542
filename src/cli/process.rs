use std::{
    env,
    path::Path,
    process::{Command, Stdio},
};

use anyhow::{anyhow, bail, Result};
use sysinfo::{get_current_pid, Signal, System};
use tracing::info;

use super::daemon_path::to_daemon_path;

/// Terminates every running process started from `name`, except this one and its children.
pub fn kill_previous_daemons(name: &Path) -> Result<()> {
    let system = System::new_all();
    let current_id = get_current_pid().map_err(|e| anyhow!("Can't find own pid {e}"))?;
    for (pid, process) in system.processes().iter() {
        if *pid == current_id {
            continue;
        }
        if matches!(process.parent(), Some(p) if p == current_id) {
            continue;
        }

        if process
            .exe()
            .filter(|v| v.exists())
            .filter(|v| name == *v)
            .is_some()
        {
            info!("Stopping daemon {pid}");
            // This will forcefully terminate the process on Windows. The open session is only
            // flushed when the signal can be delivered.
            if process.kill_with(Signal::Term).is_none() {
                process.kill();
            }
            process.wait();
        }
    }
    Ok(())
}

pub fn stop_daemon() -> Result<()> {
    kill_previous_daemons(&to_daemon_path(env::current_exe()?))
}

/// Shuts down a previous daemon and starts a new one. The daemon detaches itself, so this only
/// waits for the launcher to exit.
pub fn restart_daemon(app_dir: &Path, interval_ms: u64) -> Result<()> {
    let daemon = to_daemon_path(env::current_exe()?);
    kill_previous_daemons(&daemon)?;

    let mut command = Command::new(&daemon);
    command
        .arg("--dir")
        .arg(app_dir)
        .arg("--interval-ms")
        .arg(interval_ms.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::null());

    println!("Spawning {daemon:?}");
    let status = command.status()?;
    if !status.success() {
        bail!("Daemon launcher exited with {status}");
    }
    println!("Success");
    Ok(())
}
