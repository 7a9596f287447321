use crate::placement::WindowBounds;
use taskmon_renderer::Frame;
use tracing::{debug, trace};

/// Puts a finished frame on screen with per-pixel alpha.
///
/// `present` never fails the tick: implementations log and drop the frame.
pub trait Presenter {
    fn present(&mut self, frame: &Frame, bounds: WindowBounds, opacity: f32);

    /// Release the surface; called once at shutdown.
    fn close(&mut self) {}
}

/// The last frame a [`HeadlessPresenter`] received, already composited.
#[derive(Debug, Clone)]
pub struct PresentedFrame {
    pub bounds: WindowBounds,
    /// Premultiplied BGRA rows with the global opacity applied.
    pub bgra:   Vec<u8>,
}

/// Presenter without a native surface: composites each frame, keeps the most
/// recent one and logs.
#[derive(Debug, Default)]
pub struct HeadlessPresenter {
    last:   Option<PresentedFrame>,
    count:  u64,
    closed: bool,
}

impl HeadlessPresenter {
    pub fn last(&self) -> Option<&PresentedFrame> {
        self.last.as_ref()
    }

    /// Frames presented so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Presenter for HeadlessPresenter {
    fn present(&mut self, frame: &Frame, bounds: WindowBounds, opacity: f32) {
        let bgra = frame.composite(opacity);
        self.count += 1;
        trace!(
            "frame #{} {}x{} at ({}, {})",
            self.count,
            frame.width(),
            frame.height(),
            bounds.x,
            bounds.y
        );
        self.last = Some(PresentedFrame { bounds, bgra });
    }

    fn close(&mut self) {
        debug!("Presenter closed after {} frames", self.count);
        self.last = None;
        self.closed = true;
    }
}

// ── Windows layered window ────────────────────────────────────────────────────

#[cfg(windows)]
mod layered {
    use super::Presenter;
    use crate::placement::WindowBounds;
    use std::ffi::c_void;
    use std::mem;
    use std::ptr;
    use std::sync::Once;
    use taskmon_core::{MonitorError, Result};
    use taskmon_renderer::Frame;
    use tracing::{debug, info, warn};
    use windows_sys::Win32::Foundation::{HWND, LPARAM, LRESULT, POINT, SIZE, WPARAM};
    use windows_sys::Win32::Graphics::Gdi::{
        CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject, GetDC, ReleaseDC,
        SelectObject, AC_SRC_ALPHA, AC_SRC_OVER, BITMAPINFO, BITMAPINFOHEADER, BI_RGB,
        BLENDFUNCTION, DIB_RGB_COLORS, HBITMAP, HDC, HGDIOBJ,
    };
    use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows_sys::Win32::UI::WindowsAndMessaging::{
        CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, PeekMessageW,
        RegisterClassW, SetWindowPos, ShowWindow, TranslateMessage, UpdateLayeredWindow,
        HWND_TOPMOST, MSG, PM_REMOVE, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SW_SHOWNOACTIVATE,
        ULW_ALPHA, WNDCLASSW, WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_EX_TOPMOST,
        WS_POPUP,
    };

    const CLASS_NAME: &str = "TaskmonOverlay";

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    fn last_error(call: &str) -> MonitorError {
        MonitorError::Window(format!("{call} failed: {}", std::io::Error::last_os_error()))
    }

    unsafe extern "system" fn window_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
        DefWindowProcW(hwnd, msg, wparam, lparam)
    }

    /// Memory DC with a top-down 32-bit DIB selected into it.
    struct Surface {
        dc:       HDC,
        bitmap:   HBITMAP,
        previous: HGDIOBJ,
        bits:     *mut u8,
        width:    i32,
        height:   i32,
    }

    impl Surface {
        fn new(width: i32, height: i32) -> Result<Self> {
            // SAFETY: every handle is checked before use and released on the
            // error paths; `bits` is owned by the DIB and lives as long as it.
            unsafe {
                let dc = CreateCompatibleDC(ptr::null_mut());
                if dc.is_null() {
                    return Err(last_error("CreateCompatibleDC"));
                }

                let mut info: BITMAPINFO = mem::zeroed();
                info.bmiHeader = BITMAPINFOHEADER {
                    biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: width,
                    biHeight: -height,
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB,
                    ..mem::zeroed()
                };

                let mut bits: *mut c_void = ptr::null_mut();
                let bitmap = CreateDIBSection(dc, &info, DIB_RGB_COLORS, &mut bits, ptr::null_mut(), 0);
                if bitmap.is_null() || bits.is_null() {
                    let err = last_error("CreateDIBSection");
                    if !bitmap.is_null() {
                        DeleteObject(bitmap);
                    }
                    DeleteDC(dc);
                    return Err(err);
                }

                let previous = SelectObject(dc, bitmap);
                Ok(Self { dc, bitmap, previous, bits: bits.cast(), width, height })
            }
        }

        fn len(&self) -> usize {
            self.width as usize * self.height as usize * 4
        }
    }

    impl Drop for Surface {
        fn drop(&mut self) {
            // SAFETY: handles were created in `new` and are released exactly once.
            unsafe {
                SelectObject(self.dc, self.previous);
                DeleteObject(self.bitmap);
                DeleteDC(self.dc);
            }
        }
    }

    /// Borderless, topmost, non-activating layered window updated with
    /// `UpdateLayeredWindow`, so every pixel keeps its own alpha.
    pub struct LayeredWindowPresenter {
        hwnd:    HWND,
        surface: Option<Surface>,
        shown:   bool,
    }

    impl LayeredWindowPresenter {
        pub fn new() -> Result<Self> {
            static REGISTER: Once = Once::new();
            let class = wide(CLASS_NAME);

            // SAFETY: the class name outlives both calls; the window proc only
            // forwards to DefWindowProcW.
            let hwnd = unsafe {
                let instance = GetModuleHandleW(ptr::null());
                REGISTER.call_once(|| {
                    let mut wc: WNDCLASSW = mem::zeroed();
                    wc.lpfnWndProc = Some(window_proc);
                    wc.hInstance = instance;
                    wc.lpszClassName = class.as_ptr();
                    if RegisterClassW(&wc) == 0 {
                        warn!("RegisterClassW failed: {}", std::io::Error::last_os_error());
                    }
                });

                CreateWindowExW(
                    WS_EX_LAYERED | WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE,
                    class.as_ptr(),
                    class.as_ptr(),
                    WS_POPUP,
                    0,
                    0,
                    0,
                    0,
                    ptr::null_mut(),
                    ptr::null_mut(),
                    instance,
                    ptr::null(),
                )
            };
            if hwnd.is_null() {
                return Err(last_error("CreateWindowExW"));
            }

            info!("Overlay window created");
            Ok(Self { hwnd, surface: None, shown: false })
        }

        fn surface(&mut self, width: i32, height: i32) -> Result<&mut Surface> {
            let stale = self
                .surface
                .as_ref()
                .map_or(true, |s| s.width != width || s.height != height);
            if stale {
                debug!("Allocating {width}x{height} window surface");
                self.surface = None;
                self.surface = Some(Surface::new(width, height)?);
            }
            self.surface
                .as_mut()
                .ok_or_else(|| MonitorError::Window("no surface".into()))
        }

        fn update(&mut self, frame: &Frame, bounds: WindowBounds, opacity: f32) -> Result<()> {
            if self.hwnd.is_null() {
                return Err(MonitorError::Window("window already closed".into()));
            }
            let (width, height) = (frame.width() as i32, frame.height() as i32);
            let bgra = frame.composite(opacity);
            let hwnd = self.hwnd;
            let surface = self.surface(width, height)?;
            if bgra.len() != surface.len() {
                return Err(MonitorError::Window(format!(
                    "frame is {} bytes, surface holds {}",
                    bgra.len(),
                    surface.len()
                )));
            }

            let origin = POINT { x: bounds.x, y: bounds.y };
            let size = SIZE { cx: width, cy: height };
            let source = POINT { x: 0, y: 0 };
            let blend = BLENDFUNCTION {
                BlendOp:             AC_SRC_OVER as u8,
                BlendFlags:          0,
                SourceConstantAlpha: 255,
                AlphaFormat:         AC_SRC_ALPHA as u8,
            };

            // SAFETY: `bits` spans exactly `surface.len()` bytes (checked above);
            // the screen DC is released before returning.
            let ok = unsafe {
                ptr::copy_nonoverlapping(bgra.as_ptr(), surface.bits, bgra.len());
                let screen = GetDC(ptr::null_mut());
                let ok = UpdateLayeredWindow(
                    hwnd, screen, &origin, &size, surface.dc, &source, 0, &blend, ULW_ALPHA,
                );
                ReleaseDC(ptr::null_mut(), screen);
                ok
            };
            if ok == 0 {
                return Err(last_error("UpdateLayeredWindow"));
            }

            // SAFETY: `hwnd` is a live window owned by this presenter.
            unsafe {
                if !self.shown {
                    ShowWindow(hwnd, SW_SHOWNOACTIVATE);
                    self.shown = true;
                }
                // The taskbar is topmost too; re-assert our z-order each frame.
                SetWindowPos(hwnd, HWND_TOPMOST, 0, 0, 0, 0, SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE);
            }
            Ok(())
        }
    }

    /// Drain pending window messages without blocking the tick loop.
    fn pump_messages() {
        // SAFETY: MSG is plain data; PeekMessageW fills it before dispatch.
        unsafe {
            let mut msg: MSG = mem::zeroed();
            while PeekMessageW(&mut msg, ptr::null_mut(), 0, 0, PM_REMOVE) != 0 {
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }

    impl Presenter for LayeredWindowPresenter {
        fn present(&mut self, frame: &Frame, bounds: WindowBounds, opacity: f32) {
            if let Err(e) = self.update(frame, bounds, opacity) {
                warn!("Frame dropped: {e}");
            }
            pump_messages();
        }

        fn close(&mut self) {
            self.surface = None;
            if !self.hwnd.is_null() {
                // SAFETY: the window is ours and destroyed once; the handle is
                // nulled right after.
                unsafe {
                    DestroyWindow(self.hwnd);
                }
                self.hwnd = ptr::null_mut();
                debug!("Overlay window destroyed");
            }
        }
    }

    impl Drop for LayeredWindowPresenter {
        fn drop(&mut self) {
            self.close();
        }
    }
}

#[cfg(windows)]
pub use layered::LayeredWindowPresenter;

/// The presenter for the current platform: a layered window on Windows,
/// headless elsewhere.
#[cfg(windows)]
pub fn system_presenter() -> taskmon_core::Result<impl Presenter> {
    LayeredWindowPresenter::new()
}

/// The presenter for the current platform: a layered window on Windows,
/// headless elsewhere.
#[cfg(not(windows))]
pub fn system_presenter() -> taskmon_core::Result<impl Presenter> {
    Ok(HeadlessPresenter::default())
}
