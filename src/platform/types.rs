/// Reports which application currently owns the foreground window.
pub trait ForegroundSource: Send + Sync {
    fn active_app_id(&self) -> Option<String>;
}
