//! Notification sink implementations

use daylock_api::{Notification, Severity};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::NotificationSink;

/// One-way asynchronous channel from the enforcement loop to the
/// foreground. Sending on the unbounded channel never blocks; if the
/// receiver is gone the notification is dropped.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, severity: Severity, message: String) {
        let _ = self.tx.send(Notification::new(severity, message));
    }
}

/// Sink that maps notifications onto the tracing subscriber. Used when no
/// interactive foreground is attached.
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, severity: Severity, message: String) {
        match severity {
            Severity::Info => info!(target: "daylock::notify", "{message}"),
            Severity::Warning => warn!(target: "daylock::notify", "{message}"),
            Severity::Error => error!(target: "daylock::notify", "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_sink_delivers() {
        let (sink, mut rx) = ChannelSink::channel();

        sink.notify(Severity::Info, "game.exe terminated".into());

        let n = rx.try_recv().unwrap();
        assert_eq!(n.severity, Severity::Info);
        assert_eq!(n.message, "game.exe terminated");
    }

    #[test]
    fn channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ChannelSink::channel();
        drop(rx);

        // Must not panic or block
        sink.notify(Severity::Error, "nobody listening".into());
    }
}
