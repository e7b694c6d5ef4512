//! An implementation of an RFC8907 TACACS+ client.
//!
//! A [`Connection`] wraps a single transport stream (TCP per RFC8907) and multiplexes any
//! number of [`Session`]s over it. Replies are read by a [`Dispatcher`], which the caller
//! drives on an executor of its choice, and routed back to the waiting session by session id.

use std::sync::Arc;
use std::time::Duration;

use futures::io::{self, ReadHalf};
use futures::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

use tacplus_protocol::{self as protocol, DeserializeError, PacketFlags, PacketType};
use tacplus_protocol::{Packet, SequenceExhausted};

mod chap;
pub use chap::ChapIdentifierSequence;

mod config;
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_MAX_BODY_LENGTH, DEFAULT_TIMEOUT};

mod context;
pub use context::{SessionContext, SessionContextBuilder};

mod frame;

mod inner;
use inner::ConnectionInner;

mod pending;
use pending::PendingExchange;

mod prompt;
pub use prompt::{PromptCollector, PromptKind};

mod response;
pub use response::{AuthenticationResponse, AuthorizationResponse};

mod session;
pub use session::Session;

/// An error during a TACACS+ exchange.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ClientError {
    /// An error occurred when reading/writing a packet.
    #[error(transparent)]
    IOError(#[from] io::Error),

    /// A packet header with an unknown version or packet type was received.
    #[error("malformed packet header received from server")]
    MalformedHeader,

    /// A packet's field lengths didn't add up after deobfuscation.
    #[error("corrupt packet or bad key")]
    CorruptPacket,

    /// The session ran out of sequence numbers; a new session has to be started.
    #[error("session sequence numbers exhausted")]
    SequenceExhausted,

    /// No reply arrived within the configured timeout.
    #[error("no reply received within {0:?}")]
    ExchangeTimeout(Duration),

    /// The server prompted for input, but no prompt collector was available or it gave no answer.
    #[error("server requested input but none could be collected")]
    NoInteractiveInput,

    /// A packet of an unexpected type was received.
    #[error("unexpected {0:?} packet received from server")]
    UnsupportedPacketType(PacketType),

    /// A reply's sequence number didn't follow the request's.
    #[error("reply had sequence number {actual}, expected {expected}")]
    SequenceMismatch {
        /// The sequence number a reply should have had.
        expected: u8,

        /// The sequence number the reply actually had.
        actual: u8,
    },

    /// Another request was registered for the same session id while this one awaited its reply.
    #[error("exchange replaced by another request in the same session")]
    ExchangeReplaced,

    /// The connection was closed, either locally or by the server.
    #[error("connection closed")]
    ConnectionClosed,

    /// Error when serializing a packet to the wire.
    #[error(transparent)]
    SerializeError(#[from] protocol::SerializeError),

    /// Context had invalid field.
    #[error("session context had invalid field(s)")]
    InvalidContext,
}

impl From<DeserializeError> for ClientError {
    fn from(value: DeserializeError) -> Self {
        match value {
            DeserializeError::MalformedHeader => Self::MalformedHeader,
            DeserializeError::UnsupportedPacketType(packet_type) => {
                Self::UnsupportedPacketType(packet_type)
            }
            // a frame is always read in full before decoding, so a short buffer is corruption too
            _ => Self::CorruptPacket,
        }
    }
}

impl From<SequenceExhausted> for ClientError {
    fn from(_value: SequenceExhausted) -> Self {
        Self::SequenceExhausted
    }
}

impl ClientError {
    /// The error handed to every pending exchange when the connection fails with `self`.
    fn for_pending_exchanges(&self) -> Self {
        match self {
            Self::MalformedHeader => Self::MalformedHeader,
            Self::CorruptPacket => Self::CorruptPacket,
            Self::UnsupportedPacketType(packet_type) => Self::UnsupportedPacketType(*packet_type),
            _ => Self::ConnectionClosed,
        }
    }
}

/// A handle to a TACACS+ connection, shared by every session multiplexed over it.
///
/// Cloning a connection is cheap and yields another handle to the same stream.
pub struct Connection<S> {
    inner: Arc<ConnectionInner<S>>,
}

impl<S> Clone for Connection<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    /// Wraps a connected stream, returning a handle & the dispatcher for its receiving side.
    ///
    /// Nothing is received until [`Dispatcher::run()`] is polled, typically by spawning it on
    /// an executor.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tokio::net::TcpStream;
    /// use tokio_util::compat::TokioAsyncReadCompatExt;
    ///
    /// use tacplus_client::client::{ClientConfigBuilder, Connection};
    ///
    /// # async fn connect() -> std::io::Result<()> {
    /// let stream = TcpStream::connect("localhost:49").await?.compat();
    /// let config = ClientConfigBuilder::new().secret("very secret key").build();
    ///
    /// let (connection, dispatcher) = Connection::new(stream, config);
    /// tokio::spawn(dispatcher.run());
    /// # drop(connection);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(stream: S, config: ClientConfig) -> (Self, Dispatcher<S>) {
        let (reader, writer) = stream.split();
        let inner = Arc::new(ConnectionInner::new(writer, config));

        let dispatcher = Dispatcher {
            reader,
            inner: Arc::clone(&inner),
        };

        (Self { inner }, dispatcher)
    }

    /// Starts a new session over this connection, with a fresh random session id.
    pub fn session(&self, context: SessionContext) -> Session<S> {
        let mut rng = rand::thread_rng();

        // ids only have to be distinct among sessions currently awaiting replies
        let session_id = loop {
            let candidate: u32 = rng.gen();
            if !self.inner.pending.contains(candidate) {
                break candidate;
            }
        };

        Session::new(self.clone(), context, session_id)
    }

    /// The configuration this connection was created with.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Whether the server agreed to reuse this connection across sessions.
    pub fn single_connect_established(&self) -> bool {
        self.inner.single_connection_established()
    }

    /// Whether this connection has been closed, locally or due to an error.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// The number of sessions currently registered as awaiting a reply.
    ///
    /// Sessions that timed out stay registered until a reply for them arrives.
    pub fn pending_exchanges(&self) -> usize {
        self.inner.pending.len()
    }

    /// Closes the sending half of the connection, failing every pending exchange.
    pub async fn close(&self) -> Result<(), ClientError> {
        self.inner.mark_closed();
        self.inner.pending.fail_all(|| ClientError::ConnectionClosed);

        let mut writer = self.inner.writer.lock().await;
        writer.close().await.map_err(Into::into)
    }

    /// Sends a packet, returning the exchange that its reply will fulfill.
    ///
    /// The exchange is registered before the packet is written so a fast reply can't be missed.
    async fn send(&self, packet: &Packet) -> Result<PendingExchange, ClientError> {
        let header = packet.header();

        // obfuscation follows the configuration; a header disagreeing with it fails to serialize
        let config = &self.inner.config;
        let wire_bytes = match config.secret() {
            Some(key) if !config.unencrypted() => packet.serialize(key)?,
            _ => packet.serialize_unobfuscated()?,
        };

        let exchange = self.inner.pending.register(header.session_id());

        if self.inner.is_closed() {
            self.inner.pending.withdraw(header.session_id());
            return Err(ClientError::ConnectionClosed);
        }

        if let Err(error) = self.write_packet(&wire_bytes).await {
            self.inner.pending.withdraw(header.session_id());
            return Err(error.into());
        }

        debug!(
            session_id = exchange.session_id(),
            sequence_number = header.sequence_number(),
            packet_type = ?header.packet_type(),
            length = wire_bytes.len(),
            "sent packet"
        );

        Ok(exchange)
    }

    async fn write_packet(&self, wire_bytes: &[u8]) -> io::Result<()> {
        let mut writer = self.inner.writer.lock().await;
        writer.write_all(wire_bytes).await?;
        writer.flush().await
    }

    /// Sends a packet and waits for the reply to it, up to the configured timeout.
    async fn exchange(&self, packet: &Packet) -> Result<Packet, ClientError> {
        let exchange = self.send(packet).await?;
        exchange.wait(self.inner.config.timeout()).await
    }
}

/// The receiving side of a [`Connection`], which routes replies to their sessions.
pub struct Dispatcher<S> {
    reader: ReadHalf<S>,
    inner: Arc<ConnectionInner<S>>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Dispatcher<S> {
    /// Reads & routes replies until the connection ends.
    ///
    /// Returns `Ok(())` if the server closed the stream between packets. Malformed headers,
    /// unexpected packet types, oversized bodies & I/O errors are fatal to the connection and
    /// returned here; every pending exchange is failed in either case. A corrupt packet, or one
    /// whose obfuscation doesn't match the configuration, only fails the exchange of the
    /// session it was addressed to.
    pub async fn run(mut self) -> Result<(), ClientError> {
        loop {
            match self.receive_one().await {
                Ok(true) => {}
                Ok(false) => {
                    debug!("server closed connection");
                    self.shutdown(&ClientError::ConnectionClosed);
                    return Ok(());
                }
                Err(error) => {
                    warn!(%error, "connection failed");
                    self.shutdown(&error);
                    return Err(error);
                }
            }
        }
    }

    /// Reads & routes a single reply, returning `false` at the end of the stream.
    async fn receive_one(&mut self) -> Result<bool, ClientError> {
        let frame = match frame::read_frame(&mut self.reader, self.inner.config.max_body_length())
            .await?
        {
            Some(frame) => frame,
            None => return Ok(false),
        };

        let header = frame.header;
        let mut body = frame.body;

        debug!(
            session_id = header.session_id(),
            sequence_number = header.sequence_number(),
            packet_type = ?header.packet_type(),
            length = body.len(),
            "received packet"
        );

        // a reply must be obfuscated exactly when our own packets are
        if header.has_flag(PacketFlags::UNENCRYPTED) != self.inner.config.unencrypted() {
            warn!(
                session_id = header.session_id(),
                unencrypted = header.has_flag(PacketFlags::UNENCRYPTED),
                "reply obfuscation doesn't match configuration"
            );

            if !self
                .inner
                .pending
                .resolve(header.session_id(), Err(ClientError::CorruptPacket))
            {
                debug!(
                    session_id = header.session_id(),
                    "dropped reply with no pending exchange"
                );
            }

            return Ok(true);
        }

        let key = self.inner.config.secret().unwrap_or_default();
        let result = match Packet::deserialize_reply(header, &mut body, key) {
            Ok(packet) => {
                self.inner.update_single_connection(&header);
                Ok(packet)
            }
            Err(DeserializeError::CorruptPacket) => {
                warn!(
                    session_id = header.session_id(),
                    "corrupt packet received, possibly due to a mismatched secret"
                );
                Err(ClientError::CorruptPacket)
            }
            Err(error) => return Err(error.into()),
        };

        if !self.inner.pending.resolve(header.session_id(), result) {
            debug!(
                session_id = header.session_id(),
                "dropped reply with no pending exchange"
            );
        }

        Ok(true)
    }

    fn shutdown(&self, error: &ClientError) {
        self.inner.mark_closed();
        self.inner
            .pending
            .fail_all(|| error.for_pending_exchanges());
    }
}
