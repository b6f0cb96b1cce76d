use futures::future::{FutureExt, Shared};
use tokio::sync::oneshot;

/// Creates the one-shot "initial data ready" signal.
pub fn ready_signal() -> (ReadyNotifier, Ready) {
    let (tx, rx) = oneshot::channel();
    (ReadyNotifier { tx: Some(tx) }, Ready { rx: rx.shared() })
}

/// Sending half, owned by the refresh task.
#[derive(Debug)]
pub struct ReadyNotifier {
    tx: Option<oneshot::Sender<()>>,
}

impl ReadyNotifier {
    /// Fires the signal. Returns `true` only on the call that actually fired it.
    pub fn notify(&mut self) -> bool {
        match self.tx.take() {
            Some(tx) => {
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    pub fn has_fired(&self) -> bool {
        self.tx.is_none()
    }
}

/// Waiting half. Cheap to clone; every clone resolves once the signal fires.
#[derive(Clone)]
pub struct Ready {
    rx: Shared<oneshot::Receiver<()>>,
}

impl Ready {
    /// Resolves once the signal fires, or fails if the notifier was dropped
    /// without firing.
    pub async fn wait(self) -> Result<(), oneshot::error::RecvError> {
        self.rx.await
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.rx.clone().now_or_never(), Some(Ok(())))
    }
}
