//! Single-assignment result slot and the future observing it

use std::future::Future;
use std::pin::Pin;
use std::rc::Weak;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use tracing::{error, trace};

use crate::connect::transport::TunneledTransport;
use crate::error::{self, Result};

/// Sending half of a tunnel result. Settles at most once.
pub(crate) struct Completion<T> {
    sender: Option<oneshot::Sender<Result<T>>>,
}

impl<T> Completion<T> {
    pub(crate) fn pair() -> (Self, oneshot::Receiver<Result<T>>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.sender.is_none()
    }

    pub(crate) fn resolve(&mut self, value: T) {
        self.settle(Ok(value));
    }

    pub(crate) fn fail(&mut self, error: error::Error) {
        self.settle(Err(error));
    }

    fn settle(&mut self, outcome: Result<T>) {
        let Some(sender) = self.sender.take() else {
            debug_assert!(false, "tunnel result settled twice");
            error!("tunnel result settled twice, dropping the second outcome");
            return;
        };

        if sender.send(outcome).is_err() {
            trace!("tunnel future dropped before its result was delivered");
        }
    }
}

/// Implemented by sessions so an abort handle can reach them without
/// knowing their transport or reactor types.
pub(crate) trait Abort {
    fn abort(&self) -> bool;
}

/// Lets an external collaborator, typically a timer, stop a pending tunnel.
#[derive(Clone)]
pub struct TunnelAbort {
    session: Weak<dyn Abort>,
}

impl TunnelAbort {
    pub(crate) fn new(session: Weak<dyn Abort>) -> Self {
        Self { session }
    }

    /// Cancels the session's watchers and fails its future with an
    /// `Aborted` error.
    ///
    /// Returns false if the session already settled, or if it is in the
    /// middle of a reactor callback.
    pub fn abort(&self) -> bool {
        self.session
            .upgrade()
            .is_some_and(|session| session.abort())
    }

    /// Returns true while the session has not settled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.session.strong_count() > 0
    }
}

impl std::fmt::Debug for TunnelAbort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunnelAbort")
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// Resolves once the proxy accepted or refused the CONNECT request.
pub struct TunnelFuture<S> {
    receiver: oneshot::Receiver<Result<TunneledTransport<S>>>,
    abort: TunnelAbort,
    authority: String,
}

impl<S> Unpin for TunnelFuture<S> {}

impl<S> TunnelFuture<S> {
    pub(crate) fn new(
        receiver: oneshot::Receiver<Result<TunneledTransport<S>>>,
        abort: TunnelAbort,
        authority: String,
    ) -> Self {
        Self {
            receiver,
            abort,
            authority,
        }
    }

    /// A handle that can stop the attempt from outside the reactor callbacks.
    #[must_use]
    pub fn abort_handle(&self) -> TunnelAbort {
        self.abort.clone()
    }

    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }
}

impl<S> Future for TunnelFuture<S> {
    type Output = Result<TunneledTransport<S>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(
                error::abandoned().with_authority(this.authority.clone()),
            )),
            Poll::Pending => Poll::Pending,
        }
    }
}
