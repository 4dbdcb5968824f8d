//! Win32 implementation of the windowing protocol
//!
//! Every class registered through [`Win32Platform`] uses one window procedure,
//! the trampoline, which hands each message to
//! [`crate::window::dispatch::route`]. The per-handle user-data slot
//! (`GWLP_USERDATA`) holds a boxed [`Slot`] with the object back-reference and,
//! for subclassed system controls, the control's original procedure. The slot
//! is freed on `WM_NCDESTROY`, the last message a handle receives.
//!
//! The creation target cannot travel in `lpCreateParams` as a raw pointer
//! without leaking it when creation fails early, so it is parked in a
//! thread-local for the duration of `CreateWindowExW` and picked up on
//! `WM_NCCREATE`.
//!
//! A panic inside the trampoline (a contract violation under
//! [`crate::window::ContractPolicy::Abort`]) aborts the process.

#![allow(unsafe_code)]

use std::cell::RefCell;
use std::ffi::OsStr;
use std::iter::once;
use std::mem;
use std::os::windows::ffi::OsStrExt;
use std::ptr;

use raw_window_handle::{
    HasRawDisplayHandle, HasRawWindowHandle, RawDisplayHandle, RawWindowHandle,
    Win32WindowHandle, WindowsDisplayHandle,
};
use winapi::ctypes::c_void;
use winapi::shared::minwindef::{HINSTANCE, LPARAM, LRESULT, TRUE, UINT, WPARAM};
use winapi::shared::windef::{HBRUSH, HFONT, HGDIOBJ, HICON, HMENU, HWND, POINT, RECT};
use winapi::shared::winerror::ERROR_CLASS_ALREADY_EXISTS;
use winapi::um::errhandlingapi::{GetLastError, SetLastError};
use winapi::um::libloaderapi::GetModuleHandleW;
use winapi::um::wingdi::{
    CreateFontIndirectW, DeleteObject, GetObjectW, GetStockObject, DEFAULT_GUI_FONT, LOGFONTW,
};
use winapi::um::winuser::{
    CallWindowProcW, CopyIcon, CreateWindowExW, DefWindowProcW, DestroyIcon, DestroyWindow,
    DispatchMessageW, GetClassNameW, GetClientRect, GetMessageW, GetParent, GetWindowLongPtrW,
    GetWindowRect, GetWindowTextLengthW, GetWindowTextW, IsWindow, LoadCursorW, LoadIconW,
    MapWindowPoints, PostMessageW, PostQuitMessage, RegisterClassExW, SendMessageW, SetParent,
    SetWindowLongPtrW, SetWindowPos, SetWindowTextW, ShowWindow, TranslateMessage, COLOR_WINDOW,
    CS_HREDRAW, CS_VREDRAW, GWLP_USERDATA, GWLP_WNDPROC, ICON_BIG, ICON_SMALL, IDC_ARROW,
    IDI_APPLICATION, MSG, SWP_NOACTIVATE, SWP_NOZORDER, SW_HIDE, SW_SHOW, WM_NCDESTROY,
    WM_SETFONT, WM_SETICON, WNDCLASSEXW, WNDPROC,
};

use super::{
    CreateParams, NativeHandle, NativeMessage, Platform, PlatformError, PlatformResult,
    RawResource, TargetRef, WindowStyle,
};
use crate::events::{codes, Event};
use crate::foundation::{Rect, Size};
use crate::resources::{stock, ResourceKind};
use crate::window::{dispatch, Window};

thread_local! {
    static PENDING_TARGET: RefCell<Option<TargetRef>> = const { RefCell::new(None) };
}

/// Contents of a handle's user-data slot
struct Slot {
    target: Option<TargetRef>,
    original_proc: WNDPROC,
}

type SlotCell = RefCell<Slot>;

fn wide(text: &str) -> Vec<u16> {
    OsStr::new(text).encode_wide().chain(once(0)).collect()
}

fn hwnd_of(handle: NativeHandle) -> HWND {
    handle.as_raw() as HWND
}

fn handle_of(hwnd: HWND) -> NativeHandle {
    NativeHandle::from_raw(hwnd as usize)
}

fn rect_of(rect: &RECT) -> Rect {
    Rect::new(
        rect.left,
        rect.top,
        rect.right - rect.left,
        rect.bottom - rect.top,
    )
}

fn last_error(call: &'static str) -> PlatformError {
    PlatformError::Os {
        call,
        code: unsafe { GetLastError() },
    }
}

/// The user-data slot of `hwnd`, if one was installed
///
/// Callers only borrow the returned cell for the duration of a field access;
/// the slot is freed on `WM_NCDESTROY` after routing has finished.
fn slot<'a>(hwnd: HWND) -> Option<&'a SlotCell> {
    let ptr = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *const SlotCell;
    unsafe { ptr.as_ref() }
}

fn install_slot(hwnd: HWND, slot: Slot) {
    let boxed = Box::into_raw(Box::new(RefCell::new(slot)));
    unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, boxed as isize) };
}

fn free_slot(hwnd: HWND) {
    let ptr = unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) } as *mut SlotCell;
    if !ptr.is_null() {
        drop(unsafe { Box::from_raw(ptr) });
    }
}

unsafe extern "system" fn trampoline(
    hwnd: HWND,
    msg: UINT,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let platform = Win32Platform::current();
    let result = dispatch::route(&platform, Event::new(handle_of(hwnd), msg, wparam, lparam));
    if msg == WM_NCDESTROY {
        free_slot(hwnd);
    }
    result
}

fn to_msg(event: &Event) -> MSG {
    MSG {
        hwnd: hwnd_of(event.target()),
        message: event.code(),
        wParam: event.word_param(),
        lParam: event.long_param(),
        time: 0,
        pt: POINT { x: 0, y: 0 },
    }
}

/// The native Win32 windowing protocol
///
/// Stateless apart from the module instance; per-handle state lives in the
/// handles' user-data slots.
pub struct Win32Platform {
    instance: HINSTANCE,
}

impl Win32Platform {
    /// Platform bound to the current module
    pub fn current() -> Self {
        Self {
            instance: unsafe { GetModuleHandleW(ptr::null()) },
        }
    }
}

impl Platform for Win32Platform {
    fn name(&self) -> &'static str {
        "win32"
    }

    fn register_class(&self, class_name: &str) -> PlatformResult<()> {
        let class = wide(class_name);
        let class_info = WNDCLASSEXW {
            cbSize: mem::size_of::<WNDCLASSEXW>() as UINT,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(trampoline),
            cbClsExtra: 0,
            cbWndExtra: 0,
            hInstance: self.instance,
            hIcon: ptr::null_mut(),
            hCursor: unsafe { LoadCursorW(ptr::null_mut(), IDC_ARROW) },
            hbrBackground: (COLOR_WINDOW + 1) as usize as HBRUSH,
            lpszMenuName: ptr::null(),
            lpszClassName: class.as_ptr(),
            hIconSm: ptr::null_mut(),
        };
        if unsafe { RegisterClassExW(&class_info) } != 0 {
            return Ok(());
        }
        match unsafe { GetLastError() } {
            ERROR_CLASS_ALREADY_EXISTS => {
                log::debug!("Window class `{class_name}` already exists in this process");
                Ok(())
            }
            code => Err(PlatformError::ClassRegistration(format!(
                "RegisterClassExW failed for `{class_name}` with error {code}"
            ))),
        }
    }

    fn create_window(
        &self,
        params: &CreateParams<'_>,
        creation_target: Option<TargetRef>,
    ) -> PlatformResult<NativeHandle> {
        let class = wide(params.class_name);
        let title = wide(params.title);
        let menu = if params.style.contains(WindowStyle::CHILD) {
            usize::from(params.control_id) as HMENU
        } else {
            ptr::null_mut()
        };
        let parent = params.parent.map_or(ptr::null_mut(), hwnd_of);
        let expects_target = creation_target.is_some();

        PENDING_TARGET.with(|pending| *pending.borrow_mut() = creation_target);
        let hwnd = unsafe {
            CreateWindowExW(
                params.extended_style.bits(),
                class.as_ptr(),
                title.as_ptr(),
                params.style.bits(),
                params.rect.x,
                params.rect.y,
                params.rect.width,
                params.rect.height,
                parent,
                menu,
                self.instance,
                ptr::null_mut(),
            )
        };
        let unclaimed = PENDING_TARGET.with(|pending| pending.borrow_mut().take());

        if !hwnd.is_null() {
            return Ok(handle_of(hwnd));
        }
        if expects_target && unclaimed.is_none() {
            return Err(PlatformError::CreationRejected);
        }
        Err(PlatformError::WindowCreation(format!(
            "CreateWindowExW failed for `{}` with error {}",
            params.class_name,
            unsafe { GetLastError() }
        )))
    }

    fn destroy_window(&self, handle: NativeHandle) -> bool {
        self.is_window(handle) && unsafe { DestroyWindow(hwnd_of(handle)) } != 0
    }

    fn is_window(&self, handle: NativeHandle) -> bool {
        !handle.is_null() && unsafe { IsWindow(hwnd_of(handle)) } != 0
    }

    fn class_name(&self, handle: NativeHandle) -> Option<String> {
        if !self.is_window(handle) {
            return None;
        }
        let mut buffer = [0u16; 256];
        let copied =
            unsafe { GetClassNameW(hwnd_of(handle), buffer.as_mut_ptr(), buffer.len() as i32) };
        (copied > 0).then(|| String::from_utf16_lossy(&buffer[..copied as usize]))
    }

    fn take_creation_target(&self, event: &Event) -> Option<TargetRef> {
        if event.code() != codes::CREATE {
            return None;
        }
        PENDING_TARGET.with(|pending| pending.borrow_mut().take())
    }

    fn attach(&self, handle: NativeHandle, target: TargetRef) {
        let hwnd = hwnd_of(handle);
        match slot(hwnd) {
            Some(cell) => cell.borrow_mut().target = Some(target),
            None => install_slot(
                hwnd,
                Slot {
                    target: Some(target),
                    original_proc: None,
                },
            ),
        }
    }

    fn attached(&self, handle: NativeHandle) -> Option<TargetRef> {
        slot(hwnd_of(handle)).and_then(|cell| cell.borrow().target.clone())
    }

    fn detach(&self, handle: NativeHandle) {
        if let Some(cell) = slot(hwnd_of(handle)) {
            cell.borrow_mut().target = None;
        }
    }

    fn subclass(&self, handle: NativeHandle, target: TargetRef) -> PlatformResult<()> {
        if !self.is_window(handle) {
            return Err(PlatformError::InvalidHandle(handle));
        }
        let hwnd = hwnd_of(handle);
        if slot(hwnd).is_some() {
            return Err(PlatformError::AlreadySubclassed(handle));
        }
        install_slot(
            hwnd,
            Slot {
                target: Some(target),
                original_proc: None,
            },
        );
        let replacement: WNDPROC = Some(trampoline);
        let previous = unsafe {
            SetWindowLongPtrW(hwnd, GWLP_WNDPROC, mem::transmute::<WNDPROC, isize>(replacement))
        };
        let original = unsafe { mem::transmute::<isize, WNDPROC>(previous) };
        if let Some(cell) = slot(hwnd) {
            cell.borrow_mut().original_proc = original;
        }
        Ok(())
    }

    fn default_proc(&self, event: &Event) -> isize {
        let hwnd = hwnd_of(event.target());
        let original = slot(hwnd).and_then(|cell| cell.borrow().original_proc);
        let (msg, wparam, lparam) = (event.code(), event.word_param(), event.long_param());
        unsafe {
            match original {
                Some(_) => CallWindowProcW(original, hwnd, msg, wparam, lparam),
                None => DefWindowProcW(hwnd, msg, wparam, lparam),
            }
        }
    }

    fn parent(&self, handle: NativeHandle) -> Option<NativeHandle> {
        let parent = unsafe { GetParent(hwnd_of(handle)) };
        (!parent.is_null()).then(|| handle_of(parent))
    }

    fn set_parent(&self, child: NativeHandle, parent: Option<NativeHandle>) -> PlatformResult<()> {
        let previous = unsafe {
            SetLastError(0);
            SetParent(hwnd_of(child), parent.map_or(ptr::null_mut(), hwnd_of))
        };
        if previous.is_null() && unsafe { GetLastError() } != 0 {
            return Err(last_error("SetParent"));
        }
        Ok(())
    }

    fn window_rect(&self, handle: NativeHandle) -> Option<Rect> {
        let hwnd = hwnd_of(handle);
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
        };
        if unsafe { GetWindowRect(hwnd, &mut rect) } == 0 {
            return None;
        }
        let parent = unsafe { GetParent(hwnd) };
        if !parent.is_null() {
            unsafe {
                MapWindowPoints(
                    ptr::null_mut(),
                    parent,
                    (&mut rect as *mut RECT).cast::<POINT>(),
                    2,
                )
            };
        }
        Some(rect_of(&rect))
    }

    fn client_size(&self, handle: NativeHandle) -> Option<Size> {
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
        };
        if unsafe { GetClientRect(hwnd_of(handle), &mut rect) } == 0 {
            return None;
        }
        Some(rect_of(&rect).size())
    }

    fn set_window_rect(&self, handle: NativeHandle, rect: Rect) -> PlatformResult<()> {
        let moved = unsafe {
            SetWindowPos(
                hwnd_of(handle),
                ptr::null_mut(),
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                SWP_NOZORDER | SWP_NOACTIVATE,
            )
        };
        if moved == 0 {
            return Err(last_error("SetWindowPos"));
        }
        Ok(())
    }

    fn text(&self, handle: NativeHandle) -> String {
        let hwnd = hwnd_of(handle);
        let length = unsafe { GetWindowTextLengthW(hwnd) };
        if length <= 0 {
            return String::new();
        }
        let mut buffer = vec![0u16; length as usize + 1];
        let copied = unsafe { GetWindowTextW(hwnd, buffer.as_mut_ptr(), buffer.len() as i32) };
        String::from_utf16_lossy(&buffer[..copied.max(0) as usize])
    }

    fn set_text(&self, handle: NativeHandle, text: &str) -> PlatformResult<()> {
        let text = wide(text);
        if unsafe { SetWindowTextW(hwnd_of(handle), text.as_ptr()) } == 0 {
            return Err(last_error("SetWindowTextW"));
        }
        Ok(())
    }

    fn show(&self, handle: NativeHandle, visible: bool) {
        let command = if visible { SW_SHOW } else { SW_HIDE };
        unsafe { ShowWindow(hwnd_of(handle), command) };
    }

    fn set_icon(&self, handle: NativeHandle, icon: RawResource) {
        let hwnd = hwnd_of(handle);
        for size in [ICON_BIG, ICON_SMALL] {
            unsafe { SendMessageW(hwnd, WM_SETICON, size as WPARAM, icon.as_raw() as LPARAM) };
        }
    }

    fn set_font(&self, handle: NativeHandle, font: RawResource) {
        unsafe {
            SendMessageW(
                hwnd_of(handle),
                WM_SETFONT,
                font.as_raw() as WPARAM,
                TRUE as LPARAM,
            )
        };
    }

    fn load_resource(&self, kind: ResourceKind, name: &str) -> PlatformResult<RawResource> {
        match (kind, name) {
            (ResourceKind::Icon, stock::APPLICATION_ICON) => {
                let shared = unsafe { LoadIconW(ptr::null_mut(), IDI_APPLICATION) };
                if shared.is_null() {
                    return Err(last_error("LoadIconW"));
                }
                // Shared icons must not be destroyed; hand out a private copy
                self.duplicate_resource(kind, RawResource::from_raw(shared as usize))
            }
            (ResourceKind::Font, stock::DEFAULT_GUI_FONT) => {
                let stock_font = unsafe { GetStockObject(DEFAULT_GUI_FONT as i32) };
                if stock_font.is_null() {
                    return Err(last_error("GetStockObject"));
                }
                self.duplicate_resource(kind, RawResource::from_raw(stock_font as usize))
            }
            _ => Err(PlatformError::ResourceUnavailable(name.to_string())),
        }
    }

    fn duplicate_resource(&self, kind: ResourceKind, raw: RawResource) -> PlatformResult<RawResource> {
        match kind {
            ResourceKind::Icon => {
                let copy = unsafe { CopyIcon(raw.as_raw() as HICON) };
                if copy.is_null() {
                    return Err(last_error("CopyIcon"));
                }
                Ok(RawResource::from_raw(copy as usize))
            }
            ResourceKind::Font => {
                let mut description: LOGFONTW = unsafe { mem::zeroed() };
                let read = unsafe {
                    GetObjectW(
                        raw.as_raw() as HGDIOBJ,
                        mem::size_of::<LOGFONTW>() as i32,
                        (&mut description as *mut LOGFONTW).cast::<c_void>(),
                    )
                };
                if read == 0 {
                    return Err(last_error("GetObjectW"));
                }
                let copy: HFONT = unsafe { CreateFontIndirectW(&description) };
                if copy.is_null() {
                    return Err(last_error("CreateFontIndirectW"));
                }
                Ok(RawResource::from_raw(copy as usize))
            }
        }
    }

    fn release_resource(&self, kind: ResourceKind, raw: RawResource) -> bool {
        if raw.is_null() {
            return false;
        }
        match kind {
            ResourceKind::Icon => unsafe { DestroyIcon(raw.as_raw() as HICON) != 0 },
            ResourceKind::Font => unsafe { DeleteObject(raw.as_raw() as HGDIOBJ) != 0 },
        }
    }

    fn next_message(&self) -> PlatformResult<NativeMessage> {
        let mut msg: MSG = unsafe { mem::zeroed() };
        match unsafe { GetMessageW(&mut msg, ptr::null_mut(), 0, 0) } {
            -1 => Err(last_error("GetMessageW")),
            0 => Ok(NativeMessage::Quit(msg.wParam as i32)),
            _ => Ok(NativeMessage::Event(Event::new(
                handle_of(msg.hwnd),
                msg.message,
                msg.wParam,
                msg.lParam,
            ))),
        }
    }

    fn translate(&self, event: &Event) {
        let msg = to_msg(event);
        unsafe { TranslateMessage(&msg) };
    }

    fn dispatch(&self, event: &Event) -> isize {
        let msg = to_msg(event);
        unsafe { DispatchMessageW(&msg) }
    }

    fn post(&self, event: Event) {
        let posted = unsafe {
            PostMessageW(
                hwnd_of(event.target()),
                event.code(),
                event.word_param(),
                event.long_param(),
            )
        };
        if posted == 0 {
            log::warn!("PostMessageW failed: {}", last_error("PostMessageW"));
        }
    }

    fn post_quit(&self, exit_code: i32) {
        unsafe { PostQuitMessage(exit_code) };
    }

    fn send(&self, event: Event) -> isize {
        unsafe {
            SendMessageW(
                hwnd_of(event.target()),
                event.code(),
                event.word_param(),
                event.long_param(),
            )
        }
    }
}

unsafe impl HasRawWindowHandle for Window {
    fn raw_window_handle(&self) -> RawWindowHandle {
        let mut handle = Win32WindowHandle::empty();
        handle.hwnd = self.native_handle().as_raw() as *mut std::ffi::c_void;
        handle.hinstance = unsafe { GetModuleHandleW(ptr::null()) }.cast();
        RawWindowHandle::Win32(handle)
    }
}

unsafe impl HasRawDisplayHandle for Window {
    fn raw_display_handle(&self) -> RawDisplayHandle {
        RawDisplayHandle::Windows(WindowsDisplayHandle::empty())
    }
}
