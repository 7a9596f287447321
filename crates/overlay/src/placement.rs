//! Where the overlay sits on screen: immediately left of the system tray.

/// Overlay height used when the tray cannot be located.
pub const DEFAULT_HEIGHT: i32 = 40;

/// A screen-space rectangle (right/bottom exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenRect {
    pub left:   i32,
    pub top:    i32,
    pub right:  i32,
    pub bottom: i32,
}

impl ScreenRect {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

/// Position and size of the overlay window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowBounds {
    pub x:      i32,
    pub y:      i32,
    pub width:  i32,
    pub height: i32,
}

/// Window placement collaborator.
pub trait DisplayGeometry {
    /// Bounds of the primary display.
    fn primary_display(&self) -> ScreenRect;

    /// Bounds of the notification-area (tray) region, if it can be found.
    fn tray_rect(&self) -> Option<ScreenRect>;
}

/// Place a `width`-wide overlay.
///
/// Next to a tray, the overlay takes the tray's height and ends at its left
/// edge. Without one it hugs the bottom-right corner of the display at
/// [`DEFAULT_HEIGHT`].
pub fn place(display: ScreenRect, tray: Option<ScreenRect>, width: i32) -> WindowBounds {
    match tray.filter(|t| !t.is_empty()) {
        Some(tray) => WindowBounds {
            x:      (tray.left - width).max(display.left),
            y:      tray.top,
            width,
            height: tray.height(),
        },
        None => WindowBounds {
            x:      (display.right - width).max(display.left),
            y:      display.bottom - DEFAULT_HEIGHT,
            width,
            height: DEFAULT_HEIGHT,
        },
    }
}

/// Fixed geometry: a display of the given size and no tray.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeometry {
    pub display: ScreenRect,
    pub tray:    Option<ScreenRect>,
}

impl Default for FixedGeometry {
    fn default() -> Self {
        Self {
            display: ScreenRect { left: 0, top: 0, right: 1920, bottom: 1080 },
            tray:    None,
        }
    }
}

impl DisplayGeometry for FixedGeometry {
    fn primary_display(&self) -> ScreenRect {
        self.display
    }

    fn tray_rect(&self) -> Option<ScreenRect> {
        self.tray
    }
}

#[cfg(windows)]
mod windows {
    use super::{DisplayGeometry, ScreenRect};
    use windows_sys::Win32::Foundation::RECT;
    use windows_sys::Win32::UI::WindowsAndMessaging::{
        FindWindowExW, FindWindowW, GetSystemMetrics, GetWindowRect, SM_CXSCREEN, SM_CYSCREEN,
    };

    /// Primary display metrics and the taskbar's `TrayNotifyWnd` child.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct WindowsGeometry;

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    impl DisplayGeometry for WindowsGeometry {
        fn primary_display(&self) -> ScreenRect {
            // SAFETY: GetSystemMetrics only reads system state.
            let (w, h) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
            ScreenRect { left: 0, top: 0, right: w, bottom: h }
        }

        fn tray_rect(&self) -> Option<ScreenRect> {
            let taskbar_class = wide("Shell_TrayWnd");
            let tray_class = wide("TrayNotifyWnd");

            // SAFETY: class names are NUL-terminated and outlive the calls;
            // handles are checked for null before use.
            unsafe {
                let taskbar = FindWindowW(taskbar_class.as_ptr(), std::ptr::null());
                if taskbar.is_null() {
                    return None;
                }
                let tray = FindWindowExW(taskbar, std::ptr::null_mut(), tray_class.as_ptr(), std::ptr::null());
                if tray.is_null() {
                    return None;
                }
                let mut rect: RECT = std::mem::zeroed();
                if GetWindowRect(tray, &mut rect) == 0 {
                    return None;
                }
                Some(ScreenRect {
                    left:   rect.left,
                    top:    rect.top,
                    right:  rect.right,
                    bottom: rect.bottom,
                })
            }
        }
    }
}

#[cfg(windows)]
pub use windows::WindowsGeometry;

/// The placement collaborator for the current platform.
pub fn system_geometry() -> Box<dyn DisplayGeometry> {
    #[cfg(windows)]
    {
        Box::new(WindowsGeometry)
    }
    #[cfg(not(windows))]
    {
        Box::new(FixedGeometry::default())
    }
}
