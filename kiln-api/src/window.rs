use crate::KilnExtents2D;
use raw_window_handle::{HasRawWindowHandle, RawWindowHandle, WebWindowHandle};
use std::sync::Mutex;

/// What a swap chain needs from a window. The client extents are queried live every time, never
/// cached by the window.
pub trait KilnWindow: HasRawWindowHandle + Send + Sync {
    fn client_extents(&self) -> KilnExtents2D;
}

/// A window with no OS surface behind it, for running the soft backend headless. The client
/// extents can be changed to simulate the user resizing the window.
pub struct KilnHeadlessWindow {
    extents: Mutex<KilnExtents2D>,
}

impl KilnHeadlessWindow {
    pub fn new(
        width: u32,
        height: u32,
    ) -> Self {
        KilnHeadlessWindow {
            extents: Mutex::new(KilnExtents2D { width, height }),
        }
    }

    pub fn set_client_extents(
        &self,
        width: u32,
        height: u32,
    ) {
        *self.extents.lock().unwrap_or_else(|e| e.into_inner()) = KilnExtents2D { width, height };
    }
}

unsafe impl HasRawWindowHandle for KilnHeadlessWindow {
    fn raw_window_handle(&self) -> RawWindowHandle {
        RawWindowHandle::Web(WebWindowHandle::empty())
    }
}

impl KilnWindow for KilnHeadlessWindow {
    fn client_extents(&self) -> KilnExtents2D {
        *self.extents.lock().unwrap_or_else(|e| e.into_inner())
    }
}
