//! Contains logic for finding out which application currently holds focus.
//! [GenericWindowManager] is the main artifact of this module that abstracts
//! the operations, [resolve_foreground_app] turns its answers into an application name.

#[cfg(feature = "win")]
pub mod win;
#[cfg(feature = "x11")]
pub mod x11;

#[cfg(feature = "win")]
extern crate windows;

#[cfg(feature = "x11")]
extern crate xcb;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use tracing::debug;

/// Human readable name of an application. Either a file description like 'Firefox' or a
/// process name like 'firefox.exe'.
pub type AppIdentity = Arc<str>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundProcess {
    pub pid: u32,
    /// Name reported by the operating system. For example 'Code.exe' or 'nvim'
    pub process_name: Arc<str>,
    /// Full path to an executable. Absent when the process doesn't let us read it.
    pub executable: Option<PathBuf>,
}

/// Intended to serve as a contract windows and linux systems must implement.
#[cfg_attr(test, mockall::automock)]
pub trait WindowManager: Send {
    /// Returns the process owning the focused window. `None` means nothing holds focus.
    fn get_foreground_process(&mut self) -> Result<Option<ForegroundProcess>>;

    /// Reads the localized `FileDescription` from the version resource of an executable.
    fn get_file_description(&mut self, executable: &Path) -> Result<String>;
}

/// Maps the focused process to an [AppIdentity].
///
/// The file description is preferred, the process name is used when the description can't be
/// read. Any failure to resolve the window or its process is treated as no application at all, so
/// a single bad sample never stops tracking.
pub fn resolve_foreground_app(manager: &mut dyn WindowManager) -> Option<AppIdentity> {
    let process = match manager.get_foreground_process() {
        Ok(Some(process)) => process,
        Ok(None) => return None,
        Err(e) => {
            debug!("Failed to resolve foreground process {e:?}");
            return None;
        }
    };

    let Some(executable) = process.executable.as_deref() else {
        return Some(process.process_name);
    };

    match manager.get_file_description(executable) {
        Ok(description) if !description.trim().is_empty() => Some(description.trim().into()),
        Ok(_) => Some(process.process_name),
        Err(e) => {
            debug!(
                "No file description for {:?}, using process name {e:?}",
                process.pid
            );
            Some(process.process_name)
        }
    }
}

/// Serves as a cross-compatible WindowManager implementation.
pub struct GenericWindowManager {
    inner: Box<dyn WindowManager>,
}

impl GenericWindowManager {
    pub fn new() -> Result<Self> {
        cfg_if::cfg_if! {
            if #[cfg(feature = "win")] {
                use win::WindowsWindowManager;
                Ok(Self {
                    inner: Box::new(WindowsWindowManager::new()),
                })
            }
            else if #[cfg(feature = "x11")] {
                use x11::LinuxWindowManager;
                Ok(Self {
                    inner: Box::new(LinuxWindowManager::new()?),
                })
            }
            else {
                Err(anyhow::anyhow!(
                    "No window manager was compiled in. Enable the `win` or `x11` feature"
                ))
            }
        }
    }
}

impl WindowManager for GenericWindowManager {
    fn get_foreground_process(&mut self) -> Result<Option<ForegroundProcess>> {
        self.inner.get_foreground_process()
    }

    fn get_file_description(&mut self, executable: &Path) -> Result<String> {
        self.inner.get_file_description(executable)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use anyhow::anyhow;

    use super::{resolve_foreground_app, ForegroundProcess, MockWindowManager};

    fn editor_process(executable: Option<&str>) -> ForegroundProcess {
        ForegroundProcess {
            pid: 42,
            process_name: "code.exe".into(),
            executable: executable.map(PathBuf::from),
        }
    }

    #[test]
    fn test_description_is_preferred() {
        let mut manager = MockWindowManager::new();
        manager
            .expect_get_foreground_process()
            .returning(|| Ok(Some(editor_process(Some("C:\\Code\\code.exe")))));
        manager
            .expect_get_file_description()
            .returning(|_| Ok("Visual Studio Code".into()));

        assert_eq!(
            resolve_foreground_app(&mut manager).as_deref(),
            Some("Visual Studio Code")
        );
    }

    #[test]
    fn test_process_name_when_description_fails() {
        let mut manager = MockWindowManager::new();
        manager
            .expect_get_foreground_process()
            .returning(|| Ok(Some(editor_process(Some("C:\\Code\\code.exe")))));
        manager
            .expect_get_file_description()
            .returning(|_| Err(anyhow!("no version resource")));

        assert_eq!(resolve_foreground_app(&mut manager).as_deref(), Some("code.exe"));
    }

    #[test]
    fn test_process_name_when_description_blank() {
        let mut manager = MockWindowManager::new();
        manager
            .expect_get_foreground_process()
            .returning(|| Ok(Some(editor_process(Some("C:\\Code\\code.exe")))));
        manager
            .expect_get_file_description()
            .returning(|_| Ok("  ".into()));

        assert_eq!(resolve_foreground_app(&mut manager).as_deref(), Some("code.exe"));
    }

    #[test]
    fn test_process_name_without_executable() {
        let mut manager = MockWindowManager::new();
        manager
            .expect_get_foreground_process()
            .returning(|| Ok(Some(editor_process(None))));
        manager.expect_get_file_description().never();

        assert_eq!(resolve_foreground_app(&mut manager).as_deref(), Some("code.exe"));
    }

    #[test]
    fn test_no_window_is_no_application() {
        let mut manager = MockWindowManager::new();
        manager.expect_get_foreground_process().returning(|| Ok(None));

        assert_eq!(resolve_foreground_app(&mut manager), None);
    }

    #[test]
    fn test_process_failure_is_no_application() {
        let mut manager = MockWindowManager::new();
        manager
            .expect_get_foreground_process()
            .returning(|| Err(anyhow!("process exited")));
        manager.expect_get_file_description().never();

        assert_eq!(resolve_foreground_app(&mut manager), None);
    }
}
