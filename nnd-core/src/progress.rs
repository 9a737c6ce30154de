use std::fmt::Debug;
use std::sync::Arc;

use log::trace;
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};

/// One-way channel for human readable status messages.
///
/// Delivery is best effort: implementations must never block and never fail the caller.
/// All methods should be thread-safe.
pub trait ProgressListener: Send + Sync + Debug {
    /// Emits a status message, like `Fetching page 3...` or `Downloaded 4/10 images (40%)`.
    fn notify(&self, message: &str);
}

/// A no-operation implementation of `ProgressListener`.
/// Used as a default when no actual progress reporting is needed by the library consumer.
#[derive(Debug, Clone)]
pub struct NoOpProgressListener;

impl ProgressListener for NoOpProgressListener {
    fn notify(&self, _message: &str) {}
}

/// Forwards every message into a bounded [`mpsc`] channel.
///
/// When the channel is full or the receiving side is gone, the message is dropped.
#[derive(Debug, Clone)]
pub struct ChannelProgressListener {
    sender: Sender<String>,
}

impl ChannelProgressListener {
    /// Creates a listener and the receiving end the UI drains.
    pub fn channel(capacity: usize) -> (Self, Receiver<String>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl ProgressListener for ChannelProgressListener {
    fn notify(&self, message: &str) {
        match self.sender.try_send(message.to_string()) {
            Ok(()) => (),
            Err(TrySendError::Full(msg)) => trace!("Progress channel full, dropped: {msg}"),
            Err(TrySendError::Closed(_)) => (),
        }
    }
}

/// Convenience type alias for a shared, thread-safe progress listener.
pub type SharedProgressListener = Arc<dyn ProgressListener>;

/// Returns a shared instance of a `NoOpProgressListener`.
pub fn no_op_progress_listener() -> SharedProgressListener {
    Arc::new(NoOpProgressListener)
}
