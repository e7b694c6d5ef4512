//! Correlation of replies with the requests awaiting them.
//!
//! Replies are matched by session id alone, which is sound because a [`Session`](super::Session)
//! is consumed by its exchange methods and thus never has two requests in flight.

use std::time::Duration;

use dashmap::DashMap;
use futures::channel::oneshot;
use tacplus_protocol::Packet;

use super::ClientError;


/// The outcome delivered to a pending exchange.
pub(super) type ExchangeResult = Result<Packet, ClientError>;

/// A concurrent map from session id to the exchange waiting on a reply for that session.
#[derive(Debug, Default)]
pub(super) struct PendingExchanges {
    exchanges: DashMap<u32, oneshot::Sender<ExchangeResult>>,
}

impl PendingExchanges {
    /// Registers an exchange for a session.
    ///
    /// An exchange already registered for the same session is failed with
    /// [`ExchangeReplaced`](ClientError::ExchangeReplaced).
    pub(super) fn register(&self, session_id: u32) -> PendingExchange {
        let (sender, receiver) = oneshot::channel();

        if let Some(replaced) = self.exchanges.insert(session_id, sender) {
            let _ = replaced.send(Err(ClientError::ExchangeReplaced));
        }

        PendingExchange {
            session_id,
            receiver,
        }
    }

    /// Fulfills the exchange registered for a session, removing it from the map.
    ///
    /// Returns `false` if there was no exchange to fulfill or its waiter already gave up, in
    /// which case the result is dropped.
    pub(super) fn resolve(&self, session_id: u32, result: ExchangeResult) -> bool {
        match self.exchanges.remove(&session_id) {
            Some((_, sender)) => sender.send(result).is_ok(),
            None => false,
        }
    }

    /// Removes the exchange for a session without fulfilling it.
    pub(super) fn withdraw(&self, session_id: u32) {
        self.exchanges.remove(&session_id);
    }

    /// Whether an exchange is currently registered for a session.
    pub(super) fn contains(&self, session_id: u32) -> bool {
        self.exchanges.contains_key(&session_id)
    }

    /// The number of registered exchanges.
    pub(super) fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// Fails every registered exchange with an error produced by `make_error`.
    pub(super) fn fail_all(&self, make_error: impl Fn() -> ClientError) {
        // collected first since resolving removes entries, which can't happen during iteration
        let session_ids: Vec<u32> = self.exchanges.iter().map(|entry| *entry.key()).collect();

        for session_id in session_ids {
            self.resolve(session_id, Err(make_error()));
        }
    }
}

/// A request's claim on the reply for its session.
#[derive(Debug)]
pub(super) struct PendingExchange {
    session_id: u32,
    receiver: oneshot::Receiver<ExchangeResult>,
}

impl PendingExchange {
    /// The session this exchange belongs to.
    pub(super) fn session_id(&self) -> u32 {
        self.session_id
    }

    /// Waits up to `timeout` for the exchange to be fulfilled.
    ///
    /// On timeout the registry entry is left in place; a reply arriving later is dropped.
    pub(super) async fn wait(self, timeout: Duration) -> ExchangeResult {
        match tokio::time::timeout(timeout, self.receiver).await {
            Ok(Ok(result)) => result,
            // sender dropped without sending: withdrawn, or the connection state went away
            Ok(Err(oneshot::Canceled)) => Err(ClientError::ConnectionClosed),
            Err(_) => Err(ClientError::ExchangeTimeout(timeout)),
        }
    }
}
