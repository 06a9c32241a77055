//! One-shot handle onto a build outcome.
//!
//! A [`ResponseFuture`] is either born ready (cache hit, unknown
//! fingerprint) or subscribed to an in-flight build worker. Any number of
//! futures may subscribe to the same worker; each receives the same shared
//! [`Response`]. Dropping a future only drops that subscriber's interest,
//! the worker keeps running and its result still lands in the cache.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::response::Response;

enum FutureState {
    /// Terminal response is at hand.
    Ready(Arc<Response>),
    /// Waiting on the build worker's broadcast.
    Pending(broadcast::Receiver<Arc<Response>>),
    /// The worker vanished without broadcasting; the future will never
    /// become ready.
    Orphaned,
}

/// Future-like handle resolving to a terminal [`Response`].
pub struct ResponseFuture {
    state: FutureState,
}

impl ResponseFuture {
    /// A future that is ready immediately.
    pub(crate) fn ready(response: Arc<Response>) -> Self {
        Self {
            state: FutureState::Ready(response),
        }
    }

    /// A future subscribed to an in-flight build.
    pub(crate) fn pending(receiver: broadcast::Receiver<Arc<Response>>) -> Self {
        Self {
            state: FutureState::Pending(receiver),
        }
    }

    /// Blocks until the build produces its terminal response.
    ///
    /// Returns immediately if the future is already ready. After `wait`
    /// resolves, [`get`](Self::get) yields the response (unless the worker
    /// was torn down without ever broadcasting, which only happens on
    /// runtime shutdown).
    pub async fn wait(&mut self) {
        let FutureState::Pending(receiver) = &mut self.state else {
            return;
        };
        let received = loop {
            match receiver.recv().await {
                Ok(response) => break Some(response),
                // A single-message channel cannot lag, but the receiver
                // contract requires handling it.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break None,
            }
        };
        self.state = match received {
            Some(response) => FutureState::Ready(response),
            None => FutureState::Orphaned,
        };
    }

    /// Non-blocking readiness query.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, FutureState::Ready(_))
    }

    /// The terminal response, once ready.
    pub fn get(&self) -> Option<&Response> {
        match &self.state {
            FutureState::Ready(response) => Some(response),
            _ => None,
        }
    }

    /// Consumes the future, returning the shared response if ready.
    ///
    /// Useful for consumers that want to hold the response beyond the
    /// future's lifetime without cloning the bundle.
    pub fn into_shared(self) -> Option<Arc<Response>> {
        match self.state {
            FutureState::Ready(response) => Some(response),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ResponseFuture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            FutureState::Ready(_) => "ready",
            FutureState::Pending(_) => "pending",
            FutureState::Orphaned => "orphaned",
        };
        f.debug_struct("ResponseFuture").field("state", &state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::response::ResponseStatus;

    #[tokio::test]
    async fn test_ready_future_resolves_immediately() {
        let mut future = ResponseFuture::ready(Arc::new(Response::missing(9)));
        assert!(future.is_ready());

        future.wait().await;
        let response = future.get().expect("ready response");
        assert_eq!(response.id, 9);
        assert_eq!(response.status, ResponseStatus::DataMissing);
    }

    #[tokio::test]
    async fn test_pending_future_resolves_on_broadcast() {
        let (tx, rx) = broadcast::channel(1);
        let mut future = ResponseFuture::pending(rx);
        assert!(!future.is_ready());
        assert!(future.get().is_none());

        tx.send(Arc::new(Response::missing(3))).unwrap();
        future.wait().await;
        assert!(future.is_ready());
        assert_eq!(future.get().expect("ready response").id, 3);
    }

    #[tokio::test]
    async fn test_all_subscribers_receive_the_same_response() {
        let (tx, rx1) = broadcast::channel(1);
        let rx2 = tx.subscribe();
        let mut first = ResponseFuture::pending(rx1);
        let mut second = ResponseFuture::pending(rx2);

        tx.send(Arc::new(Response::missing(5))).unwrap();
        first.wait().await;
        second.wait().await;

        let a = first.into_shared().expect("ready");
        let b = second.into_shared().expect("ready");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_closed_channel_orphans_the_future() {
        let (tx, rx) = broadcast::channel::<Arc<Response>>(1);
        let mut future = ResponseFuture::pending(rx);
        drop(tx);

        future.wait().await;
        assert!(!future.is_ready());
        assert!(future.get().is_none());
        assert!(future.into_shared().is_none());
    }
}
