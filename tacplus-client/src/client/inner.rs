//! State shared between a connection's handles and its dispatcher.

use std::sync::atomic::{AtomicBool, Ordering};

use futures::io::WriteHalf;
use futures::lock::Mutex;
use tacplus_protocol::{HeaderInfo, PacketFlags};
use tracing::info;

use super::pending::PendingExchanges;
use super::ClientConfig;

pub(super) struct ConnectionInner<S> {
    /// The sending half of the (TCP per RFC8907) connection.
    pub(super) writer: Mutex<WriteHalf<S>>,

    /// Exchanges waiting on a reply, keyed by session id.
    pub(super) pending: PendingExchanges,

    pub(super) config: ClientConfig,

    /// Set once the connection can no longer carry exchanges.
    closed: AtomicBool,

    /// Whether single connection mode has been established for this connection.
    ///
    /// The single connection flag is meant to be ignored after the first two packets
    /// in a session according to [RFC8907 section 4.3], so we have to keep track of
    /// that internally.
    ///
    /// [RFC8907 section 4.3]: https://www.rfc-editor.org/rfc/rfc8907.html#section-4.3-5
    single_connection_established: AtomicBool,
}

impl<S> ConnectionInner<S> {
    pub(super) fn new(writer: WriteHalf<S>, config: ClientConfig) -> Self {
        Self {
            writer: Mutex::new(writer),
            pending: PendingExchanges::default(),
            config,
            closed: AtomicBool::new(false),
            single_connection_established: AtomicBool::new(false),
        }
    }

    pub(super) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Marks the connection closed. Must happen before pending exchanges are failed, so
    /// that a concurrent registration either sees the flag or gets failed too.
    pub(super) fn mark_closed(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub(super) fn single_connection_established(&self) -> bool {
        self.single_connection_established.load(Ordering::SeqCst)
    }

    /// Records single connection mode if the server agreed to it in the first reply of a session.
    pub(super) fn update_single_connection(&self, header: &HeaderInfo) {
        if self.config.single_connect()
            && header.sequence_number() == 2
            && header.has_flag(PacketFlags::SINGLE_CONNECTION)
            && !self
                .single_connection_established
                .swap(true, Ordering::SeqCst)
        {
            info!(
                session_id = header.session_id(),
                "single-connect mode established"
            );
        }
    }
}
