pub mod types;

pub use types::ForegroundSource;

#[cfg(target_os = "linux")]
pub mod linux;

/// The foreground source for this OS, if one exists.
#[cfg(target_os = "linux")]
pub fn native_source() -> Option<Box<dyn ForegroundSource>> {
    let source = linux::LinuxSource::new();
    if source.is_connected() {
        Some(Box::new(source))
    } else {
        None
    }
}

#[cfg(not(target_os = "linux"))]
pub fn native_source() -> Option<Box<dyn ForegroundSource>> {
    None
}
