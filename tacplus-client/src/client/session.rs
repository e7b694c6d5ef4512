use futures::{AsyncRead, AsyncWrite};
use tracing::debug;

use tacplus_protocol::authentication::{self, Action, ContinueFlags};
use tacplus_protocol::authorization;
use tacplus_protocol::{
    Argument, AuthenticationContext, AuthenticationMethod, AuthenticationService,
    AuthenticationType, Body, HeaderInfo, MinorVersion, Packet, PacketType, UserInformation,
    Version,
};

use super::chap::{chap_data, random_challenge};
use super::prompt::PromptKind;
use super::response::{AuthenticationResponse, AuthorizationResponse};
use super::{ClientError, Connection, SessionContext};

/// A single authentication or authorization attempt over a [`Connection`].
///
/// Each exchange method consumes the session, so a session drives exactly one dialog and
/// never has more than one request awaiting a reply.
pub struct Session<S> {
    connection: Connection<S>,
    context: SessionContext,
    session_id: u32,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Session<S> {
    pub(super) fn new(connection: Connection<S>, context: SessionContext, session_id: u32) -> Self {
        Self {
            connection,
            context,
            session_id,
        }
    }

    /// The id shared by every packet in this session.
    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    /// Authenticates interactively via ASCII login, prompting for a username & password.
    ///
    /// The server drives the dialog: each `GETUSER`/`GETPASS`/`GETDATA` reply is answered with
    /// input from the context's [`PromptCollector`](super::PromptCollector), until the server
    /// sends a terminal status.
    ///
    /// NOTE: Even if this function returns `Ok`, the authentication may not have succeeded; make
    /// sure to check [`passed()`](AuthenticationResponse::passed) on the returned response.
    pub async fn authenticate_ascii(self) -> Result<AuthenticationResponse, ClientError> {
        let start = self.authentication_start(AuthenticationType::Ascii, "", Vec::new())?;
        self.run_authentication(start).await
    }

    /// Authenticates with a plaintext username & password via the PAP protocol.
    ///
    /// NOTE: Even if this function returns `Ok`, the authentication may not have succeeded; make
    /// sure to check [`passed()`](AuthenticationResponse::passed) on the returned response.
    pub async fn authenticate_pap(
        self,
        user: &str,
        password: &str,
    ) -> Result<AuthenticationResponse, ClientError> {
        let start = self.authentication_start(
            AuthenticationType::Pap,
            user,
            password.as_bytes().to_vec(),
        )?;
        self.run_authentication(start).await
    }

    /// Authenticates via CHAP, with a challenge generated by the client.
    ///
    /// The identifier is drawn from the configured
    /// [`ChapIdentifierSequence`](super::ChapIdentifierSequence).
    pub async fn authenticate_chap(
        self,
        user: &str,
        password: &str,
    ) -> Result<AuthenticationResponse, ClientError> {
        let identifier = self
            .connection
            .config()
            .chap_identifiers()
            .next_identifier();
        let data = chap_data(identifier, password.as_bytes(), &random_challenge());

        let start = self.authentication_start(AuthenticationType::Chap, user, data)?;
        self.run_authentication(start).await
    }

    /// Requests authorization for a user, with the given arguments (e.g. `service=shell`).
    ///
    /// NOTE: A denial is not an error; check [`passed()`](AuthorizationResponse::passed) on the
    /// returned response.
    pub async fn authorize(
        self,
        user: &str,
        method: AuthenticationMethod,
        authentication_type: AuthenticationType,
        service: AuthenticationService,
        arguments: Vec<Argument>,
    ) -> Result<AuthorizationResponse, ClientError> {
        let request = authorization::Request::new(
            method,
            AuthenticationContext {
                privilege_level: self.context.privilege_level,
                authentication_type,
                service,
            },
            self.user_information(user),
            arguments,
        );

        let packet = Packet::new(
            self.first_header(PacketType::Authorization, MinorVersion::Default),
            request,
        )
        .ok_or(ClientError::InvalidContext)?;

        let (_, body) = self.exchange(&packet).await?.into_parts();
        match body {
            Body::AuthorizationReply(reply) => Ok(reply.into()),
            _ => Err(ClientError::UnsupportedPacketType(PacketType::Authorization)),
        }
    }

    fn first_header(&self, packet_type: PacketType, minor_version: MinorVersion) -> HeaderInfo {
        HeaderInfo::new(
            Version::rfc8907(minor_version),
            packet_type,
            1,
            self.connection.config().header_flags(),
            self.session_id,
        )
    }

    /// The header following a reply, carrying this session's flags rather than the reply's.
    fn next_header(
        &self,
        reply_header: &HeaderInfo,
        version: Version,
    ) -> Result<HeaderInfo, ClientError> {
        let next = reply_header.next(version)?;

        Ok(HeaderInfo::new(
            version,
            next.packet_type(),
            next.sequence_number(),
            self.connection.config().header_flags(),
            self.session_id,
        ))
    }

    fn user_information(&self, user: &str) -> UserInformation {
        UserInformation::new(user, &self.context.port, &self.context.remote_address)
    }

    fn authentication_start(
        &self,
        authentication_type: AuthenticationType,
        user: &str,
        data: Vec<u8>,
    ) -> Result<Packet, ClientError> {
        let minor_version = authentication_type
            .required_minor_version()
            .ok_or(ClientError::InvalidContext)?;

        let start = authentication::Start::new(
            Action::Login,
            AuthenticationContext {
                privilege_level: self.context.privilege_level,
                authentication_type,
                service: self.context.service,
            },
            self.user_information(user),
            data,
        )
        .ok_or(ClientError::InvalidContext)?;

        Packet::new(
            self.first_header(PacketType::Authentication, minor_version),
            start,
        )
        .ok_or(ClientError::InvalidContext)
    }

    /// Drives an authentication dialog from its start packet to a terminal reply.
    async fn run_authentication(
        self,
        start: Packet,
    ) -> Result<AuthenticationResponse, ClientError> {
        let version = start.header().version();
        let mut request = start;

        loop {
            let (reply_header, body) = self.exchange(&request).await?.into_parts();
            let reply = match body {
                Body::AuthenticationReply(reply) => reply,
                _ => return Err(ClientError::UnsupportedPacketType(PacketType::Authentication)),
            };

            // anything but a request for input ends the session, including unknown statuses
            let Some(kind) = PromptKind::for_status(reply.status()) else {
                debug!(
                    session_id = self.session_id,
                    status = ?reply.status(),
                    "authentication session finished"
                );
                return Ok(reply.into());
            };

            let input = self.collect_input(&reply, kind)?;

            request = Packet::new(
                self.next_header(&reply_header, version)?,
                authentication::Continue::new(input, Vec::new(), ContinueFlags::empty()),
            )
            .ok_or(ClientError::InvalidContext)?;
        }
    }

    fn collect_input(
        &self,
        reply: &authentication::Reply,
        kind: PromptKind,
    ) -> Result<String, ClientError> {
        let collector = self
            .context
            .prompt
            .as_ref()
            .ok_or(ClientError::NoInteractiveInput)?;

        collector
            .collect(reply.server_message(), reply.no_echo(), kind)
            .ok_or(ClientError::NoInteractiveInput)
    }

    /// Sends a request & waits for its reply, checking that the reply belongs to it.
    async fn exchange(&self, request: &Packet) -> Result<Packet, ClientError> {
        let request_header = request.header();
        let expected_sequence_number = request_header
            .sequence_number()
            .checked_add(1)
            .ok_or(ClientError::SequenceExhausted)?;

        let reply = self.connection.exchange(request).await?;
        let reply_header = reply.header();

        if reply_header.packet_type() != request_header.packet_type() {
            return Err(ClientError::UnsupportedPacketType(reply_header.packet_type()));
        }

        if reply_header.sequence_number() != expected_sequence_number {
            return Err(ClientError::SequenceMismatch {
                expected: expected_sequence_number,
                actual: reply_header.sequence_number(),
            });
        }

        Ok(reply)
    }
}
