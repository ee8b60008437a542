use std::{
    ffi::c_void,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};
use tracing::error;
use windows::{
    core::{w, HSTRING, PCWSTR},
    Win32::{
        Foundation::{CloseHandle, BOOL, HANDLE},
        Storage::FileSystem::{GetFileVersionInfoSizeW, GetFileVersionInfoW, VerQueryValueW},
        System::Threading::{
            OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
            PROCESS_QUERY_LIMITED_INFORMATION,
        },
        UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowThreadProcessId},
    },
};

use super::{ForegroundProcess, WindowManager};

#[tracing::instrument]
pub fn get_foreground_process() -> Result<Option<ForegroundProcess>> {
    let window = unsafe { GetForegroundWindow() };

    // Happens while focus is switching or on the secure desktop.
    if window.is_invalid() {
        return Ok(None);
    }

    let mut pid = 0u32;
    unsafe { GetWindowThreadProcessId(window, Some(&mut pid)) };
    if pid == 0 {
        return Err(anyhow!("Failed to get process of the foreground window"));
    }

    let process_handle =
        unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, BOOL::from(false), pid) }
            .inspect_err(|e| error!("Failed to open process {pid} {e:?}"))?;

    let mut text: [u16; 4096] = [0; 4096];
    let path = unsafe { get_process_path(process_handle, &mut text) };

    unsafe { CloseHandle(process_handle) }
        .inspect_err(|e| error!("Failed to close handle {e:?}"))?;

    let executable = PathBuf::from(path?);
    let process_name = executable
        .file_name()
        .map(|v| v.to_string_lossy().to_string())
        .ok_or_else(|| anyhow!("Process {pid} has no executable name"))?;

    Ok(Some(ForegroundProcess {
        pid,
        process_name: process_name.into(),
        executable: Some(executable),
    }))
}

unsafe fn get_process_path(process_handle: HANDLE, text: &mut [u16]) -> Result<String> {
    unsafe {
        let mut length = text.len() as u32;
        QueryFullProcessImageNameW(
            process_handle,
            PROCESS_NAME_WIN32,
            windows::core::PWSTR(text.as_mut_ptr()),
            &mut length,
        )?;
        Ok(String::from_utf16_lossy(&text[..length as usize]))
    }
}

/// Reads `FileDescription` of the first language/codepage pair listed in the version resource.
pub fn get_file_description(executable: &Path) -> Result<String> {
    let path = HSTRING::from(executable.as_os_str());
    let path = PCWSTR(path.as_ptr());

    let size = unsafe { GetFileVersionInfoSizeW(path, None) };
    if size == 0 {
        return Err(anyhow!("{executable:?} has no version information"));
    }

    let mut data = vec![0u8; size as usize];
    unsafe { GetFileVersionInfoW(path, 0, size, data.as_mut_ptr() as *mut c_void) }?;

    let (translation, length) = unsafe { query_value(&data, w!("\\VarFileInfo\\Translation")) }?;
    if (length as usize) < 2 * size_of::<u16>() {
        return Err(anyhow!("{executable:?} lists no translations"));
    }
    let (language, codepage) = unsafe {
        let pair = std::slice::from_raw_parts(translation as *const u16, 2);
        (pair[0], pair[1])
    };

    let key = HSTRING::from(format!(
        "\\StringFileInfo\\{language:04x}{codepage:04x}\\FileDescription"
    ));
    let (description, length) = unsafe { query_value(&data, PCWSTR(key.as_ptr())) }?;

    // For string values the length is given in characters.
    let description = unsafe {
        let chars = std::slice::from_raw_parts(description as *const u16, length as usize);
        String::from_utf16_lossy(chars)
    };
    Ok(description.trim_end_matches('\0').to_string())
}

unsafe fn query_value(data: &[u8], sub_block: PCWSTR) -> Result<(*const c_void, u32)> {
    let mut buffer: *mut c_void = std::ptr::null_mut();
    let mut length = 0u32;
    let found = unsafe {
        VerQueryValueW(
            data.as_ptr() as *const c_void,
            sub_block,
            &mut buffer,
            &mut length,
        )
    };
    if !found.as_bool() || buffer.is_null() || length == 0 {
        return Err(anyhow!("Version value is missing"));
    }
    Ok((buffer as *const c_void, length))
}

pub struct WindowsWindowManager {}

impl WindowsWindowManager {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for WindowsWindowManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowManager for WindowsWindowManager {
    fn get_foreground_process(&mut self) -> Result<Option<ForegroundProcess>> {
        get_foreground_process()
            .inspect_err(|e| error!("Failed to get foreground process {e:?}"))
    }

    fn get_file_description(&mut self, executable: &Path) -> Result<String> {
        get_file_description(executable)
    }
}
