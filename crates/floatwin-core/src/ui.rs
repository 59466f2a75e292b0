//! UI-thread affinity.
//!
//! The overlay state is only ever touched from the thread that owns the
//! window manager handle. Work arriving on other threads (a background data
//! channel asking the overlay to close, say) is posted through a [`UiHandle`]
//! and executed when the UI thread drains its [`UiQueue`].

use std::thread::{self, ThreadId};

use serde_json::Value;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{trace, warn};

use crate::{
    commands::CommandRouter,
    overlay::compositor::{Compositor, SurfaceId},
};

/// Records the owning thread and checks it in debug builds.
#[derive(Debug, Clone, Copy)]
pub struct UiAffinity {
    owner: ThreadId,
}

impl UiAffinity {
    pub fn current() -> Self {
        Self {
            owner: thread::current().id(),
        }
    }

    pub fn is_current(&self) -> bool {
        thread::current().id() == self.owner
    }

    pub fn check(&self, op: &str) {
        debug_assert!(
            self.is_current(),
            "overlay operation {op} called off the UI thread"
        );
    }
}

/// Work marshaled onto the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum UiRequest {
    Close,
    /// The window manager dropped this surface.
    SurfaceRemoved(SurfaceId),
    ShareWithHost(Value),
    ShareWithOverlay(Value),
}

/// Sending side, cheap to clone and usable from any thread.
#[derive(Debug, Clone)]
pub struct UiHandle {
    tx: UnboundedSender<UiRequest>,
}

impl UiHandle {
    /// Queue `request` for the UI thread. False once the queue is gone.
    pub fn post(&self, request: UiRequest) -> bool {
        trace!(?request, "Posting request to the UI thread");
        self.tx.send(request).is_ok()
    }
}

pub struct UiQueue {
    rx: UnboundedReceiver<UiRequest>,
}

pub fn channel() -> (UiHandle, UiQueue) {
    let (tx, rx) = unbounded_channel();
    (UiHandle { tx }, UiQueue { rx })
}

impl UiQueue {
    pub fn try_next(&mut self) -> Option<UiRequest> {
        self.rx.try_recv().ok()
    }

    pub async fn next(&mut self) -> Option<UiRequest> {
        self.rx.recv().await
    }

    /// Run every pending request against `router`. Must be called on the UI
    /// thread. Returns how many requests ran.
    pub fn drain<C: Compositor>(&mut self, router: &mut CommandRouter<C>) -> usize {
        let mut handled = 0;
        while let Ok(request) = self.rx.try_recv() {
            if let Err(e) = router.apply(request) {
                warn!(error = %e, "Marshaled request failed");
            }
            handled += 1;
        }
        handled
    }
}
