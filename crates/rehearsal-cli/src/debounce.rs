//! Trailing-edge debouncer for search input.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;

/// Quiet period before a search query is applied.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Sending half of a debounced channel.
///
/// Only the last value submitted before `delay` of quiet is forwarded.
/// Dropping the debouncer clears the pending timer and discards its value.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, mut input) = mpsc::unbounded_channel::<T>();
        let (output, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(mut latest) = input.recv().await {
                loop {
                    tokio::select! {
                        next = input.recv() => match next {
                            Some(value) => latest = value,
                            None => return,
                        },
                        _ = sleep(delay) => break,
                    }
                }
                if output.send(latest).is_err() {
                    return;
                }
            }
        });

        (Self { tx }, rx)
    }

    pub fn submit(&self, value: T) {
        // The worker only exits once this sender is dropped.
        let _ = self.tx.send(value);
    }
}
