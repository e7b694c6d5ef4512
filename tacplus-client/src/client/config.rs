use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tacplus_protocol::PacketFlags;

use super::chap::ChapIdentifierSequence;

/// How long a session waits for each reply by default.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// The largest inbound packet body accepted by default, in bytes.
pub const DEFAULT_MAX_BODY_LENGTH: u32 = 65536;

/// Settings shared by every session over a [`Connection`](super::Connection).
#[derive(Clone)]
pub struct ClientConfig {
    secret: Option<Vec<u8>>,
    timeout: Duration,
    single_connect: bool,
    unencrypted: bool,
    max_body_length: u32,
    chap_identifiers: Arc<ChapIdentifierSequence>,
}

impl ClientConfig {
    /// The shared secret used to obfuscate packet bodies, if any.
    pub fn secret(&self) -> Option<&[u8]> {
        self.secret.as_deref()
    }

    /// How long to wait for each reply from the server.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether sessions ask the server to keep the connection open for reuse.
    pub fn single_connect(&self) -> bool {
        self.single_connect
    }

    /// Whether packets are sent without obfuscation.
    ///
    /// This is always the case when no secret is configured.
    pub fn unencrypted(&self) -> bool {
        self.unencrypted || self.secret.is_none()
    }

    /// The largest packet body that will be read from the server.
    pub fn max_body_length(&self) -> u32 {
        self.max_body_length
    }

    /// The source of identifiers for CHAP authentication attempts.
    pub fn chap_identifiers(&self) -> &ChapIdentifierSequence {
        &self.chap_identifiers
    }

    /// Header flags set on the first packet of each session.
    pub(super) fn header_flags(&self) -> PacketFlags {
        let mut flags = PacketFlags::empty();

        if self.single_connect {
            flags |= PacketFlags::SINGLE_CONNECTION;
        }

        if self.unencrypted() {
            flags |= PacketFlags::UNENCRYPTED;
        }

        flags
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("single_connect", &self.single_connect)
            .field("unencrypted", &self.unencrypted)
            .field("max_body_length", &self.max_body_length)
            .finish_non_exhaustive()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfigBuilder::new().build()
    }
}

/// Builder for [`ClientConfig`] objects.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use tacplus_client::client::ClientConfigBuilder;
///
/// let config = ClientConfigBuilder::new()
///     .secret("a shared secret of at least 16 characters")
///     .timeout(Duration::from_secs(2))
///     .build();
///
/// assert!(!config.unencrypted());
/// assert!(config.single_connect());
/// ```
pub struct ClientConfigBuilder {
    secret: Option<Vec<u8>>,
    timeout: Duration,
    single_connect: bool,
    unencrypted: bool,
    max_body_length: u32,
    chap_identifiers: Option<Arc<ChapIdentifierSequence>>,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            secret: None,
            timeout: DEFAULT_TIMEOUT,
            single_connect: true,
            unencrypted: false,
            max_body_length: DEFAULT_MAX_BODY_LENGTH,
            chap_identifiers: None,
        }
    }
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values for the various fields.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the shared secret used for packet obfuscation.
    ///
    /// [RFC8907 section 10.5.1] specifies that clients SHOULD NOT allow secret keys less
    /// than 16 characters in length. This builder does not check for that, but
    /// consider yourself warned.
    ///
    /// Without a secret, packets are sent unobfuscated, which MUST NOT be done in production.
    ///
    /// [RFC8907 section 10.5.1]: https://www.rfc-editor.org/rfc/rfc8907.html#section-10.5.1-3.8.1
    pub fn secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Sets how long to wait for each reply.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets whether to request single-connect mode from the server.
    pub fn single_connect(mut self, single_connect: bool) -> Self {
        self.single_connect = single_connect;
        self
    }

    /// Sets whether to send packets unobfuscated even if a secret is configured.
    pub fn unencrypted(mut self, unencrypted: bool) -> Self {
        self.unencrypted = unencrypted;
        self
    }

    /// Sets the largest packet body that will be accepted from the server.
    pub fn max_body_length(mut self, max_body_length: u32) -> Self {
        self.max_body_length = max_body_length;
        self
    }

    /// Sets the CHAP identifier sequence, instead of the process-wide one.
    pub fn chap_identifiers(mut self, sequence: Arc<ChapIdentifierSequence>) -> Self {
        self.chap_identifiers = Some(sequence);
        self
    }

    /// Consumes this builder and turns it into a [`ClientConfig`].
    pub fn build(self) -> ClientConfig {
        ClientConfig {
            secret: self.secret,
            timeout: self.timeout,
            single_connect: self.single_connect,
            unencrypted: self.unencrypted,
            max_body_length: self.max_body_length,
            chap_identifiers: self
                .chap_identifiers
                .unwrap_or_else(ChapIdentifierSequence::process_wide),
        }
    }
}
