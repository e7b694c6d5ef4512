//! Authentication-related protocol packets.

use alloc::string::String;
use alloc::vec::Vec;

use bitflags::bitflags;
use byteorder::{ByteOrder, NetworkEndian};
use getset::{CopyGetters, Getters};
use num_enum::TryFromPrimitive;

use super::fields::{
    clamp_u16_field, clamp_u8_field, ensure_exact_length, text_from_wire, FieldCursor,
};
use super::{
    AuthenticationContext, AuthenticationType, Deserialize, DeserializeError, MinorVersion,
    NotEnoughSpace, PacketBody, PacketType, Serialize, UserInformation,
};

#[cfg(test)]
mod tests;

/// The authentication action, as indicated upon initiation of an authentication session.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, TryFromPrimitive)]
pub enum Action {
    /// Login request.
    Login = 0x01,

    /// Password change request.
    ChangePassword = 0x02,

    /// Outbound authentication request. RFC-8907 advises against its use.
    SendAuth = 0x04,
}

impl Action {
    /// The number of bytes an `Action` occupies on the wire.
    pub const WIRE_SIZE: usize = 1;
}

/// The authentication status, as returned by a TACACS+ server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Authentication succeeded.
    Pass,

    /// Authentication failed.
    Fail,

    /// Request for more domain-specific data.
    GetData,

    /// Request for username.
    GetUser,

    /// Request for password.
    GetPassword,

    /// Restart session, discarding current one.
    Restart,

    /// Server-side error while authenticating.
    Error,

    /// Forward authentication request to an alternative daemon (deprecated in RFC-8907).
    Follow,

    /// A status code not assigned by RFC-8907.
    Unknown(u8),
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        match value {
            0x01 => Self::Pass,
            0x02 => Self::Fail,
            0x03 => Self::GetData,
            0x04 => Self::GetUser,
            0x05 => Self::GetPassword,
            0x06 => Self::Restart,
            0x07 => Self::Error,
            0x21 => Self::Follow,
            other => Self::Unknown(other),
        }
    }
}

impl From<Status> for u8 {
    fn from(value: Status) -> Self {
        match value {
            Status::Pass => 0x01,
            Status::Fail => 0x02,
            Status::GetData => 0x03,
            Status::GetUser => 0x04,
            Status::GetPassword => 0x05,
            Status::Restart => 0x06,
            Status::Error => 0x07,
            Status::Follow => 0x21,
            Status::Unknown(code) => code,
        }
    }
}

bitflags! {
    /// Flags received in an authentication reply packet.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ReplyFlags: u8 {
        /// Indicates the client MUST NOT display user input.
        const NO_ECHO = 0b00000001;
    }
}

bitflags! {
    /// Flags that can be set in an authentication continue packet.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ContinueFlags: u8 {
        /// Indicates the client is prematurely aborting the authentication session.
        const ABORT = 0b00000001;
    }
}

/// An authentication start packet, used to initiate an authentication session.
#[derive(Clone, Debug, PartialEq, Eq, Getters, CopyGetters)]
pub struct Start {
    /// The action requested by the client.
    #[getset(get_copy = "pub")]
    action: Action,

    /// Privilege level, authentication type & service of the request.
    #[getset(get_copy = "pub")]
    authentication: AuthenticationContext,

    /// The user, port & remote address of the client.
    #[getset(get = "pub")]
    user_information: UserInformation,

    /// Authentication-type-specific data, e.g. a PAP password or CHAP response.
    #[getset(get = "pub")]
    data: Vec<u8>,
}

impl Start {
    /// Initializes a new start packet with the provided fields.
    ///
    /// Returns `None` if the authentication type is [`NotSet`](AuthenticationType::NotSet),
    /// which is only valid for authorization/accounting.
    pub fn new(
        action: Action,
        authentication: AuthenticationContext,
        user_information: UserInformation,
        data: Vec<u8>,
    ) -> Option<Self> {
        if authentication.authentication_type != AuthenticationType::NotSet {
            Some(Self {
                action,
                authentication,
                user_information,
                data,
            })
        } else {
            None
        }
    }
}

impl PacketBody for Start {
    const TYPE: PacketType = PacketType::Authentication;
    const REQUIRED_FIELDS_LENGTH: usize = Action::WIRE_SIZE + AuthenticationContext::WIRE_SIZE + 4;

    fn required_minor_version(&self) -> Option<MinorVersion> {
        self.authentication
            .authentication_type
            .required_minor_version()
    }
}

impl Serialize for Start {
    fn wire_size(&self) -> usize {
        Action::WIRE_SIZE
            + AuthenticationContext::WIRE_SIZE
            + self.user_information.wire_size()
            + 1 // extra byte to include length of data
            + clamp_u8_field(&self.data).len()
    }

    fn serialize_into_buffer(&self, buffer: &mut [u8]) -> Result<usize, NotEnoughSpace> {
        let wire_size = self.wire_size();

        if buffer.len() >= wire_size {
            buffer[0] = self.action as u8;

            self.authentication
                .serialize_header_information(&mut buffer[1..4]);
            self.user_information
                .serialize_header_information(&mut buffer[4..7]);

            let data = clamp_u8_field(&self.data);
            buffer[7] = data.len() as u8;

            let user_information_len = self
                .user_information
                .serialize_body_information(&mut buffer[8..]);

            let data_start = 8 + user_information_len;
            buffer[data_start..data_start + data.len()].copy_from_slice(data);

            Ok(wire_size)
        } else {
            Err(NotEnoughSpace(()))
        }
    }
}

impl Deserialize for Start {
    fn deserialize_from_buffer(buffer: &[u8]) -> Result<Self, DeserializeError> {
        if buffer.len() < Self::REQUIRED_FIELDS_LENGTH {
            return Err(DeserializeError::CorruptPacket);
        }

        let declared_lengths = buffer[4..8].iter().map(|&length| usize::from(length)).sum();
        ensure_exact_length(buffer, Self::REQUIRED_FIELDS_LENGTH, declared_lengths)?;

        let action = Action::try_from(buffer[0])?;
        let authentication = AuthenticationContext::deserialize_header_information(&buffer[1..4])?;

        let mut cursor = FieldCursor::new(buffer, Self::REQUIRED_FIELDS_LENGTH);
        let user_information =
            UserInformation::deserialize_body_information(&buffer[4..7], &mut cursor)?;
        let data = cursor.take(buffer[7].into())?.to_vec();

        Self::new(action, authentication, user_information, data)
            .ok_or(DeserializeError::CorruptPacket)
    }
}

/// A continue packet potentially sent as part of an authentication session.
#[derive(Clone, Debug, PartialEq, Eq, Getters, CopyGetters)]
pub struct Continue {
    /// The input entered by the user in response to a server prompt.
    #[getset(get = "pub")]
    user_message: String,

    /// Domain-specific data supplied in response to a server prompt.
    #[getset(get = "pub")]
    data: Vec<u8>,

    /// Flags for this packet.
    #[getset(get_copy = "pub")]
    flags: ContinueFlags,
}

impl Continue {
    /// Constructs a continue packet. Fields longer than 65535 bytes are truncated when serialized.
    pub fn new(user_message: String, data: Vec<u8>, flags: ContinueFlags) -> Self {
        Self {
            user_message,
            data,
            flags,
        }
    }

    /// Whether this packet aborts the authentication session.
    pub fn is_abort(&self) -> bool {
        self.flags.contains(ContinueFlags::ABORT)
    }
}

impl PacketBody for Continue {
    const TYPE: PacketType = PacketType::Authentication;
    const REQUIRED_FIELDS_LENGTH: usize = 5;
}

impl Serialize for Continue {
    fn wire_size(&self) -> usize {
        Self::REQUIRED_FIELDS_LENGTH
            + clamp_u16_field(self.user_message.as_bytes()).len()
            + clamp_u16_field(&self.data).len()
    }

    fn serialize_into_buffer(&self, buffer: &mut [u8]) -> Result<usize, NotEnoughSpace> {
        let wire_size = self.wire_size();

        if buffer.len() >= wire_size {
            let user_message = clamp_u16_field(self.user_message.as_bytes());
            let data = clamp_u16_field(&self.data);

            NetworkEndian::write_u16(&mut buffer[..2], user_message.len() as u16);
            NetworkEndian::write_u16(&mut buffer[2..4], data.len() as u16);
            buffer[4] = self.flags.bits();

            let data_start = Self::REQUIRED_FIELDS_LENGTH + user_message.len();
            buffer[Self::REQUIRED_FIELDS_LENGTH..data_start].copy_from_slice(user_message);
            buffer[data_start..data_start + data.len()].copy_from_slice(data);

            Ok(wire_size)
        } else {
            Err(NotEnoughSpace(()))
        }
    }
}

impl Deserialize for Continue {
    fn deserialize_from_buffer(buffer: &[u8]) -> Result<Self, DeserializeError> {
        if buffer.len() < Self::REQUIRED_FIELDS_LENGTH {
            return Err(DeserializeError::CorruptPacket);
        }

        let user_message_length = usize::from(NetworkEndian::read_u16(&buffer[..2]));
        let data_length = usize::from(NetworkEndian::read_u16(&buffer[2..4]));
        ensure_exact_length(
            buffer,
            Self::REQUIRED_FIELDS_LENGTH,
            user_message_length + data_length,
        )?;

        let mut cursor = FieldCursor::new(buffer, Self::REQUIRED_FIELDS_LENGTH);

        Ok(Self {
            user_message: text_from_wire(cursor.take(user_message_length)?),
            data: cursor.take(data_length)?.to_vec(),
            flags: ContinueFlags::from_bits_retain(buffer[4]),
        })
    }
}

/// An authentication reply packet received from a server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    status: Status,
    flags: ReplyFlags,
    server_message: String,
    data: Vec<u8>,
}

impl Reply {
    /// Assembles a reply body. Fields longer than 65535 bytes are truncated when serialized.
    pub fn new(status: Status, flags: ReplyFlags, server_message: String, data: Vec<u8>) -> Self {
        Self {
            status,
            flags,
            server_message,
            data,
        }
    }

    /// Status of the server reply.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Flags set by the server in this reply.
    pub fn flags(&self) -> ReplyFlags {
        self.flags
    }

    /// Message received from the server, potentially to display to the user.
    pub fn server_message(&self) -> &str {
        &self.server_message
    }

    /// Domain-specific data received from the server.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the no echo flag was set by the server in this reply.
    pub fn no_echo(&self) -> bool {
        self.flags.contains(ReplyFlags::NO_ECHO)
    }
}

impl PacketBody for Reply {
    const TYPE: PacketType = PacketType::Authentication;
    const REQUIRED_FIELDS_LENGTH: usize = 6;
}

impl Serialize for Reply {
    fn wire_size(&self) -> usize {
        Self::REQUIRED_FIELDS_LENGTH
            + clamp_u16_field(self.server_message.as_bytes()).len()
            + clamp_u16_field(&self.data).len()
    }

    fn serialize_into_buffer(&self, buffer: &mut [u8]) -> Result<usize, NotEnoughSpace> {
        let wire_size = self.wire_size();

        if buffer.len() >= wire_size {
            let server_message = clamp_u16_field(self.server_message.as_bytes());
            let data = clamp_u16_field(&self.data);

            buffer[0] = self.status.into();
            buffer[1] = self.flags.bits();
            NetworkEndian::write_u16(&mut buffer[2..4], server_message.len() as u16);
            NetworkEndian::write_u16(&mut buffer[4..6], data.len() as u16);

            let data_start = Self::REQUIRED_FIELDS_LENGTH + server_message.len();
            buffer[Self::REQUIRED_FIELDS_LENGTH..data_start].copy_from_slice(server_message);
            buffer[data_start..data_start + data.len()].copy_from_slice(data);

            Ok(wire_size)
        } else {
            Err(NotEnoughSpace(()))
        }
    }
}

impl Deserialize for Reply {
    fn deserialize_from_buffer(buffer: &[u8]) -> Result<Self, DeserializeError> {
        if buffer.len() < Self::REQUIRED_FIELDS_LENGTH {
            return Err(DeserializeError::CorruptPacket);
        }

        let server_message_length = usize::from(NetworkEndian::read_u16(&buffer[2..4]));
        let data_length = usize::from(NetworkEndian::read_u16(&buffer[4..6]));
        ensure_exact_length(
            buffer,
            Self::REQUIRED_FIELDS_LENGTH,
            server_message_length + data_length,
        )?;

        let mut cursor = FieldCursor::new(buffer, Self::REQUIRED_FIELDS_LENGTH);

        Ok(Self {
            status: Status::from(buffer[0]),
            flags: ReplyFlags::from_bits_retain(buffer[1]),
            server_message: text_from_wire(cursor.take(server_message_length)?),
            data: cursor.take(data_length)?.to_vec(),
        })
    }
}
