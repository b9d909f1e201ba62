//! Live subscription handles.

use std::fmt;

/// Cancellation handle for a live subscription.
///
/// Dropping the handle cancels the subscription, so holding it is what
/// keeps updates flowing. [`Subscription::unsubscribe`] cancels
/// explicitly; cancellation is idempotent.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a cancellation closure.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription over several underlying subscriptions; cancelling
    /// the group cancels them all.
    pub fn group(subscriptions: Vec<Subscription>) -> Self {
        Self::new(move || {
            for subscription in subscriptions {
                subscription.unsubscribe();
            }
        })
    }

    /// Cancel the subscription. No further callbacks are delivered after
    /// this returns, beyond any already in flight.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_unsubscribe_runs_cancel_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let subscription = Subscription::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        subscription.unsubscribe();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_cancels() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        {
            let _subscription = Subscription::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_group_cancels_all() {
        let count = Arc::new(AtomicUsize::new(0));
        let subs = (0..3)
            .map(|_| {
                let c = count.clone();
                Subscription::new(move || {
                    c.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();
        Subscription::group(subs).unsubscribe();
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
