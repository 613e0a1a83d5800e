//! Runs a `UsageMonitor` on one worker thread.
//!
//! Foreground events and ticks are funneled through a single channel so the
//! monitor state is only ever touched from the worker.

use crate::constants::IDLE_TARGET_LABEL;
use crate::error::AppError;
use crate::monitor::UsageMonitor;
use crate::platform::ForegroundSource;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Wait used while no session is active and no tick is pending.
const IDLE_WAIT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    ForegroundChanged(String),
    StatusRequest,
    Shutdown,
}

/// Cloneable sender side of a running monitor.
#[derive(Clone)]
pub struct MonitorHandle {
    sender: Sender<MonitorEvent>,
}

impl MonitorHandle {
    pub fn notify(&self, app_id: &str) -> Result<(), AppError> {
        self.send(MonitorEvent::ForegroundChanged(app_id.to_string()))
    }

    pub fn request_status(&self) -> Result<(), AppError> {
        self.send(MonitorEvent::StatusRequest)
    }

    pub fn shutdown(&self) -> Result<(), AppError> {
        self.send(MonitorEvent::Shutdown)
    }

    fn send(&self, event: MonitorEvent) -> Result<(), AppError> {
        self.sender.send(event).map_err(|_| AppError::ServiceStopped)
    }
}

pub struct MonitorService {
    handle: MonitorHandle,
    receiver: Receiver<MonitorEvent>,
}

impl Default for MonitorService {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorService {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            handle: MonitorHandle { sender },
            receiver,
        }
    }

    pub fn handle(&self) -> MonitorHandle {
        self.handle.clone()
    }

    /// Move the monitor onto its worker thread. The thread ends on
    /// `Shutdown` or once every handle is dropped, persisting the running
    /// session first.
    pub fn start(self, monitor: UsageMonitor) -> thread::JoinHandle<UsageMonitor> {
        let Self { handle, receiver } = self;
        // Only external handles should keep the worker alive
        drop(handle);
        thread::spawn(move || run_loop(monitor, &receiver))
    }
}

fn run_loop(mut monitor: UsageMonitor, receiver: &Receiver<MonitorEvent>) -> UsageMonitor {
    loop {
        let timeout = monitor
            .time_until_next_tick(Instant::now())
            .unwrap_or(IDLE_WAIT);

        match receiver.recv_timeout(timeout) {
            Ok(MonitorEvent::ForegroundChanged(app_id)) => monitor.on_foreground_app_changed(&app_id),
            Ok(MonitorEvent::StatusRequest) => monitor.broadcast_current_status(),
            Ok(MonitorEvent::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        if let Some(token) = monitor.due_tick(Instant::now()) {
            monitor.on_tick(token);
        }
    }

    info!("Monitor service shutting down");
    monitor.stop_monitoring();
    monitor
}

/// Polls a foreground source and forwards transitions to the monitor.
pub struct ForegroundWatcher {
    poll_interval: Duration,
    running: Arc<AtomicBool>,
}

impl ForegroundWatcher {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn start(&self, source: Box<dyn ForegroundSource>, handle: MonitorHandle) -> thread::JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let poll_interval = self.poll_interval;

        thread::spawn(move || {
            let mut last: Option<String> = None;
            while running.load(Ordering::SeqCst) {
                let current = source.active_app_id();
                if current != last {
                    // No active window still counts as leaving the previous app
                    let app_id = current.as_deref().unwrap_or(IDLE_TARGET_LABEL);
                    debug!("Foreground is now {app_id}");
                    if handle.notify(app_id).is_err() {
                        break;
                    }
                    last = current;
                }
                thread::sleep(poll_interval);
            }
        })
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
