use super::ForegroundSource;
use log::warn;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt, Window};
use x11rb::rust_connection::RustConnection;

/// Foreground app via the EWMH `_NET_ACTIVE_WINDOW` and its `WM_CLASS`.
pub struct LinuxSource {
    conn: Option<RustConnection>,
    root: Window,
}

impl Default for LinuxSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LinuxSource {
    pub fn new() -> Self {
        match x11rb::connect(None) {
            Ok((conn, screen_num)) => {
                let Some(root) = conn.setup().roots.get(screen_num).map(|screen| screen.root) else {
                    let available = conn.setup().roots.len();
                    warn!(
                        "Invalid screen number {screen_num} ({available} screens available). Foreground tracking disabled."
                    );
                    return Self { conn: None, root: 0 };
                };
                Self {
                    conn: Some(conn),
                    root,
                }
            }
            Err(e) => {
                // Wayland or headless: the stdin source can still be used
                warn!("Failed to connect to X server: {e}. Foreground tracking disabled.");
                Self { conn: None, root: 0 }
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn get_atom(&self, name: &str) -> Option<u32> {
        self.conn.as_ref()?
            .intern_atom(false, name.as_bytes())
            .ok()?
            .reply()
            .ok()
            .map(|r| r.atom)
    }

    fn get_active_window_id(&self) -> Option<Window> {
        let conn = self.conn.as_ref()?;
        let atom = self.get_atom("_NET_ACTIVE_WINDOW")?;
        let reply = conn
            .get_property(false, self.root, atom, AtomEnum::WINDOW, 0, 1)
            .ok()?
            .reply()
            .ok()?;

        let window = reply.value32()?.next().filter(|id| *id != 0);
        window
    }

    fn get_wm_class(&self, window: Window) -> Option<Vec<u8>> {
        let reply = self.conn.as_ref()?
            .get_property(false, window, AtomEnum::WM_CLASS, AtomEnum::STRING, 0, 1024)
            .ok()?
            .reply()
            .ok()?;

        if reply.value.is_empty() {
            return None;
        }
        Some(reply.value)
    }
}

/// `WM_CLASS` holds "instance\0class\0"; the instance name is the app id.
fn instance_name(wm_class: &[u8]) -> Option<String> {
    let instance = wm_class.split(|b| *b == 0).next()?;
    if instance.is_empty() {
        return None;
    }
    String::from_utf8(instance.to_vec()).ok()
}

impl ForegroundSource for LinuxSource {
    fn active_app_id(&self) -> Option<String> {
        let window_id = self.get_active_window_id()?;
        instance_name(&self.get_wm_class(window_id)?)
    }
}
