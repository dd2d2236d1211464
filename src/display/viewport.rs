//! Observable viewport size.
//!
//! The presentation owns one [`ViewportObserver`]; the terminal loop reports
//! resizes into it and consumers hold a [`Subscription`] for as long as they
//! need updates. Dropping the subscription unsubscribes.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::watch;

/// Drawable area in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct Viewport {
    /// Columns.
    pub width: u16,
    /// Rows.
    pub height: u16,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Whether nothing can be drawn.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Owned, observable viewport state.
#[derive(Debug)]
pub struct ViewportObserver {
    tx: watch::Sender<Viewport>,
    subscribers: Arc<AtomicUsize>,
}

impl ViewportObserver {
    /// Creates an observer holding `initial`.
    #[must_use]
    pub fn new(initial: Viewport) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx,
            subscribers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Publishes a new size. Returns whether it differed from the current one.
    pub fn report(&self, viewport: Viewport) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == viewport {
                return false;
            }
            tracing::trace!(width = viewport.width, height = viewport.height, "viewport changed");
            *current = viewport;
            true
        })
    }

    /// Latest reported size.
    #[must_use]
    pub fn current(&self) -> Viewport {
        *self.tx.borrow()
    }

    /// Starts receiving size updates until the returned guard is dropped.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.subscribers.fetch_add(1, Ordering::Relaxed);
        Subscription {
            rx: self.tx.subscribe(),
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::Relaxed)
    }
}

/// Live viewport subscription.
#[derive(Debug)]
pub struct Subscription {
    rx: watch::Receiver<Viewport>,
    subscribers: Arc<AtomicUsize>,
}

impl Subscription {
    /// Latest size, marking it seen.
    pub fn latest(&mut self) -> Viewport {
        *self.rx.borrow_and_update()
    }

    /// Whether a size newer than the last [`latest`](Self::latest) exists.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Waits for the next size change.
    ///
    /// Returns `None` once the observer is gone.
    pub async fn changed(&mut self) -> Option<Viewport> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.subscribers.fetch_sub(1, Ordering::Relaxed);
    }
}
