//! Windows shell backend.
//!
//! Reveal and launch go through `ShellExecuteW`; association handlers come
//! from `SHAssocEnumHandlers` and are invoked on a shell item's data object.
//! The backend initializes COM as a single-threaded apartment on the thread
//! that creates it and must stay on that thread.

// SAFETY boundary: this module owns the shell FFI calls.
#![allow(unsafe_code)]

use super::{AssociationHandler, ShellBackend, ShellStatus};
use crate::encoding::WideString;
use crate::error::{LauncherError, Result};
use std::ffi::c_void;
use std::marker::PhantomData;
use tracing::{debug, warn};
use windows::core::{PCWSTR, PWSTR};
use windows::Win32::System::Com::{
    CoInitializeEx, CoTaskMemFree, CoUninitialize, IDataObject, COINIT_APARTMENTTHREADED,
    COINIT_DISABLE_OLE1DDE,
};
use windows::Win32::UI::Shell::{
    BHID_DataObject, IAssocHandler, IShellItem, SHAssocEnumHandlers,
    SHCreateItemFromParsingName, ASSOC_FILTER_RECOMMENDED,
};
use windows_sys::Win32::UI::Shell::ShellExecuteW;
use windows_sys::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

/// Shell access for the current thread's COM apartment.
pub struct WindowsShell {
    // COM initialization is per thread; keep the backend on its thread.
    _not_send: PhantomData<*const ()>,
}

impl WindowsShell {
    /// Initialize COM for this thread and create the backend.
    pub fn new() -> Result<Self> {
        // SAFETY: called once per backend on the owning thread; balanced by
        // CoUninitialize in Drop.
        unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED | COINIT_DISABLE_OLE1DDE) }
            .ok()
            .map_err(|e| com_error("initialize COM", "", e))?;
        debug!("COM initialized for shell dispatcher thread");
        Ok(Self {
            _not_send: PhantomData,
        })
    }

    fn shell_execute(&self, file: &WideString, parameters: Option<&WideString>) -> ShellStatus {
        let operation = encode_literal("open");
        let file = file.to_nul_terminated();
        let parameters = parameters.map(WideString::to_nul_terminated);

        // SAFETY: every pointer refers to a live NUL-terminated buffer for
        // the duration of the call; null is allowed for hwnd, parameters
        // and directory.
        let instance = unsafe {
            ShellExecuteW(
                std::ptr::null_mut(),
                operation.as_ptr(),
                file.as_ptr(),
                parameters.as_ref().map_or(std::ptr::null(), |p| p.as_ptr()),
                std::ptr::null(),
                SW_SHOWNORMAL,
            )
        };
        ShellStatus(instance as isize as i32)
    }
}

impl Drop for WindowsShell {
    fn drop(&mut self) {
        // SAFETY: balances the successful CoInitializeEx in `new` on the
        // same thread.
        unsafe { CoUninitialize() };
    }
}

impl ShellBackend for WindowsShell {
    type Handler = ShellAssocHandler;

    fn reveal(&self, path: &WideString) -> Result<ShellStatus> {
        let explorer = WideString::from_utf8("explorer.exe")?;
        // Quoted so explorer does not split paths containing commas or spaces.
        let mut select = WideString::from_utf8("/select,\"")?;
        select.push(path);
        select.push(&WideString::from_utf8("\"")?);
        Ok(self.shell_execute(&explorer, Some(&select)))
    }

    fn open(&self, path: &WideString) -> Result<ShellStatus> {
        Ok(self.shell_execute(path, None))
    }

    fn associated_handlers(&self, extension: &WideString) -> Result<Vec<ShellAssocHandler>> {
        let mut dotted = WideString::from_utf8(".")?;
        dotted.push(extension);
        let display = dotted.to_utf8()?;
        let dotted = dotted.to_nul_terminated();

        // SAFETY: `dotted` is NUL-terminated and outlives the call.
        let enumerator =
            unsafe { SHAssocEnumHandlers(PCWSTR(dotted.as_ptr()), ASSOC_FILTER_RECOMMENDED) }
                .map_err(|e| com_error("enumerate association handlers", &display, e))?;

        let mut handlers = Vec::new();
        loop {
            let mut slot: [Option<IAssocHandler>; 1] = [None];
            let mut fetched = 0u32;
            // SAFETY: `slot` has room for one element and `fetched` is a
            // valid out pointer.
            let hr = unsafe { enumerator.Next(&mut slot, Some(&mut fetched as *mut u32)) };
            if hr.is_err() {
                return Err(com_error(
                    "enumerate association handlers",
                    &display,
                    windows::core::Error::from(hr),
                ));
            }
            if fetched == 0 {
                break;
            }
            if let Some(handler) = slot[0].take() {
                handlers.push(ShellAssocHandler(handler));
            }
        }
        debug!("{} recommended handlers for {}", handlers.len(), display);
        Ok(handlers)
    }

    fn invoke_handler(&self, handler: &ShellAssocHandler, path: &WideString) -> Result<()> {
        let display = path.to_utf8()?;
        let file = path.to_nul_terminated();

        // SAFETY: `file` is NUL-terminated and outlives the call.
        let item: IShellItem = unsafe { SHCreateItemFromParsingName(PCWSTR(file.as_ptr()), None) }
            .map_err(|e| com_error("resolve shell item", &display, e))?;
        // SAFETY: `item` is a valid shell item on this apartment.
        let data_object: IDataObject = unsafe { item.BindToHandler(None, &BHID_DataObject) }
            .map_err(|e| com_error("bind shell item data object", &display, e))?;

        // SAFETY: handler and data object belong to this apartment.
        if let Err(e) = unsafe { handler.0.Invoke(&data_object) } {
            warn!("Association handler reported {} for {}", e, display);
        }
        Ok(())
    }
}

/// An `IAssocHandler` retained from a listing. Dropping it releases the COM
/// reference.
pub struct ShellAssocHandler(IAssocHandler);

impl AssociationHandler for ShellAssocHandler {
    fn display_name(&self) -> Result<WideString> {
        // SAFETY: plain COM getter on a live interface.
        take_co_string(unsafe { self.0.GetUIName() }, "read handler name")
    }

    fn identity(&self) -> Result<WideString> {
        // SAFETY: plain COM getter on a live interface.
        take_co_string(unsafe { self.0.GetName() }, "read handler path")
    }
}

/// Copy a shell-allocated string and free it.
fn take_co_string(result: windows::core::Result<PWSTR>, operation: &str) -> Result<WideString> {
    let raw = result.map_err(|e| com_error(operation, "", e))?;
    if raw.is_null() {
        return Ok(WideString::default());
    }
    // SAFETY: the shell returned a NUL-terminated string allocated with
    // CoTaskMemAlloc; it is copied before being freed exactly once.
    let text = WideString::from_wide(unsafe { raw.as_wide() });
    unsafe { CoTaskMemFree(Some(raw.0 as *const c_void)) };
    Ok(text)
}

fn encode_literal(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

fn com_error(operation: &str, path: &str, err: windows::core::Error) -> LauncherError {
    LauncherError::internal(operation, path, err.to_string(), Some(err.code().0))
}
