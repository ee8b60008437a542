use std::path::Path;

use anyhow::{anyhow, Result};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use tracing::instrument;
use xcb::{
    x::{Atom, GetProperty, GrabServer, InternAtom, UngrabServer, Window, ATOM_ANY},
    Connection, Xid,
};

use super::{ForegroundProcess, WindowManager};

fn intern_atom(conn: &Connection, name: &[u8]) -> Result<Atom> {
    let reply = conn.wait_for_reply(conn.send_request(&InternAtom {
        only_if_exists: false,
        name,
    }))?;
    Ok(reply.atom())
}

fn get_pid(conn: &Connection, window: Window, pid_atom: Atom) -> Result<Option<u32>> {
    let result = conn.wait_for_reply(conn.send_request(&GetProperty {
        delete: false,
        window,
        property: pid_atom,
        r#type: ATOM_ANY,
        long_offset: 0,
        long_length: 1,
    }))?;
    Ok(result.value::<u32>().first().copied())
}

fn get_active_window(
    conn: &Connection,
    root: Window,
    active_window_atom: Atom,
) -> Result<Option<Window>> {
    let result = conn.wait_for_reply(conn.send_request(&GetProperty {
        delete: false,
        window: root,
        property: active_window_atom,
        r#type: ATOM_ANY,
        long_offset: 0,
        long_length: 1,
    }))?;
    Ok(result
        .value::<Window>()
        .first()
        .copied()
        .filter(|window| !window.is_none()))
}

pub struct LinuxWindowManager {
    connection: Connection,
    preferred_screen: i32,
    active_window_atom: Atom,
    pid_atom: Atom,
    system: System,
}

impl LinuxWindowManager {
    pub fn new() -> Result<Self> {
        let (connection, preferred_screen) = xcb::Connection::connect(None)?;
        let active_window_atom = intern_atom(&connection, b"_NET_ACTIVE_WINDOW")?;
        let pid_atom = intern_atom(&connection, b"_NET_WM_PID")?;
        Ok(Self {
            connection,
            preferred_screen,
            active_window_atom,
            pid_atom,
            system: System::new(),
        })
    }

    fn root(&self) -> Result<Window> {
        // Currently the application only supports 1 x11 screen.
        self.connection
            .get_setup()
            .roots()
            .nth(self.preferred_screen.max(0) as usize)
            .map(|screen| screen.root())
            .ok_or_else(|| anyhow!("Screen {} is missing", self.preferred_screen))
    }

    #[instrument(skip(self))]
    fn get_foreground_pid(&self) -> Result<Option<u32>> {
        let Some(active_window) =
            get_active_window(&self.connection, self.root()?, self.active_window_atom)?
        else {
            return Ok(None);
        };
        get_pid(&self.connection, active_window, self.pid_atom)?
            .map(Some)
            .ok_or_else(|| anyhow!("Active window {active_window:?} doesn't expose a pid"))
    }

    fn describe_process(&mut self, pid: u32) -> Result<ForegroundProcess> {
        let pid = Pid::from_u32(pid);
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_exe(UpdateKind::OnlyIfNotSet),
        );
        let process = self
            .system
            .process(pid)
            .ok_or_else(|| anyhow!("Process {pid} exited before it could be read"))?;

        Ok(ForegroundProcess {
            pid: pid.as_u32(),
            process_name: process.name().to_string_lossy().as_ref().into(),
            executable: process.exe().map(Path::to_path_buf),
        })
    }
}

impl WindowManager for LinuxWindowManager {
    #[instrument(skip(self))]
    fn get_foreground_process(&mut self) -> Result<Option<ForegroundProcess>> {
        let _ = self.connection.send_request(&GrabServer {});
        let pid = self.get_foreground_pid();
        let _ = self.connection.send_request(&UngrabServer {});

        match pid? {
            Some(pid) => self.describe_process(pid).map(Some),
            None => Ok(None),
        }
    }

    fn get_file_description(&mut self, executable: &Path) -> Result<String> {
        Err(anyhow!(
            "{executable:?} has no version resource to read a description from"
        ))
    }
}
