//! Dashboard notifications
//!
//! Tasks with `notify-dashboard` set report each top-level run. The dashboard
//! tails a notify log in the root's log directory.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// File name of the notify log inside the root's log directory
pub const NOTIFY_LOG_FILE_NAME: &str = "logging.notify.txt";

/// Receiver of "task ran" notifications
pub trait Notifier {
    fn notify(&self, task_id: &str);
}

/// Appends `<timestamp>: <task id>` lines to a log file
#[derive(Debug, Clone)]
pub struct FileNotifier {
    path: PathBuf,
}

impl FileNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileNotifier { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Notifier for FileNotifier {
    fn notify(&self, task_id: &str) {
        let timestamp = Local::now().format("%F %T");
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{}: {}", timestamp, task_id));

        if let Err(e) = written {
            log::warn!(
                "Failed to write notification to {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Reports notifications through the logger only
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, task_id: &str) {
        log::info!("Notify: {}", task_id);
    }
}
