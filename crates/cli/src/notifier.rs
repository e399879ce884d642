//! Terminal rendering of dispatcher notifications.

use std::io::{self, Write};
use std::sync::Mutex;

use dispatch::{Notification, Notifier, Severity};

/// Writes each notification as one line to a writer (stderr by default).
pub struct TerminalNotifier<W: Write + Send> {
    out: Mutex<W>,
}

impl TerminalNotifier<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> TerminalNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the writer, consuming the notifier.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> Notifier for TerminalNotifier<W> {
    fn notify(&self, notification: Notification) {
        tracing::debug!(
            severity = %notification.severity,
            description = %notification.description,
            "Rendering notification"
        );

        let marker = match notification.severity {
            Severity::Error => "✖",
            Severity::Warning => "!",
            Severity::Success => "✔",
            Severity::Info => "i",
        };
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Write failures are ignored.
        let _ = writeln!(
            out,
            "{marker} {}: {}",
            notification.title, notification.description
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_error_line() {
        let notifier = TerminalNotifier::new(Vec::new());
        notifier.notify(Notification::error("not found"));

        let written = String::from_utf8(notifier.into_inner()).unwrap();
        assert_eq!(written, "✖ Error: not found\n");
    }

    #[test]
    fn test_renders_one_line_per_notification() {
        let notifier = TerminalNotifier::new(Vec::new());
        notifier.notify(Notification::error("a"));
        notifier.notify(Notification::error("b"));

        let written = String::from_utf8(notifier.into_inner()).unwrap();
        assert_eq!(written.lines().count(), 2);
    }
}
