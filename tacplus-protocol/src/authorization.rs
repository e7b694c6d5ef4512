//! Authorization features/packets of the TACACS+ protocol.

use alloc::string::String;
use alloc::vec::Vec;

use byteorder::{ByteOrder, NetworkEndian};
use getset::{CopyGetters, Getters};

use super::arguments::Arguments;
use super::fields::{clamp_u16_field, ensure_exact_length, text_from_wire, FieldCursor};
use super::{
    Argument, AuthenticationContext, AuthenticationMethod, Deserialize, DeserializeError,
    NotEnoughSpace, PacketBody, PacketType, Serialize, UserInformation,
};


/// An authorization request packet body, including arguments.
#[derive(Clone, Debug, PartialEq, Eq, Getters, CopyGetters)]
pub struct Request {
    /// Method used to authenticate to TACACS+ client.
    #[getset(get_copy = "pub")]
    method: AuthenticationMethod,

    /// Other client authentication information.
    #[getset(get_copy = "pub")]
    authentication: AuthenticationContext,

    /// Information about the user connected to the TACACS+ client.
    #[getset(get = "pub")]
    user_information: UserInformation,

    /// Additional arguments to provide as part of an authorization request.
    #[getset(get = "pub")]
    arguments: Vec<Argument>,
}

impl Request {
    /// Assembles an authorization request body. Arguments past the 255th are not sent.
    pub fn new(
        method: AuthenticationMethod,
        authentication: AuthenticationContext,
        user_information: UserInformation,
        arguments: Vec<Argument>,
    ) -> Self {
        Self {
            method,
            authentication,
            user_information,
            arguments,
        }
    }
}

impl PacketBody for Request {
    const TYPE: PacketType = PacketType::Authorization;

    // method, authentication context, 3 user information lengths, argument count
    const REQUIRED_FIELDS_LENGTH: usize =
        AuthenticationMethod::WIRE_SIZE + AuthenticationContext::WIRE_SIZE + 4;
}

impl Serialize for Request {
    fn wire_size(&self) -> usize {
        AuthenticationMethod::WIRE_SIZE
            + AuthenticationContext::WIRE_SIZE
            + self.user_information.wire_size()
            + 1 // argument count
            + Arguments::new(&self.arguments).wire_size()
    }

    fn serialize_into_buffer(&self, buffer: &mut [u8]) -> Result<usize, NotEnoughSpace> {
        let wire_size = self.wire_size();

        if buffer.len() >= wire_size {
            let arguments = Arguments::new(&self.arguments);

            buffer[0] = self.method as u8;
            self.authentication
                .serialize_header_information(&mut buffer[1..4]);
            self.user_information
                .serialize_header_information(&mut buffer[4..7]);
            buffer[7] = arguments.argument_count();

            let lengths_len = arguments.serialize_lengths(&mut buffer[8..]);

            let body_start = Self::REQUIRED_FIELDS_LENGTH + lengths_len;
            let user_information_len = self
                .user_information
                .serialize_body_information(&mut buffer[body_start..]);
            arguments.serialize_encoded_values(&mut buffer[body_start + user_information_len..]);

            Ok(wire_size)
        } else {
            Err(NotEnoughSpace(()))
        }
    }
}

impl Deserialize for Request {
    fn deserialize_from_buffer(buffer: &[u8]) -> Result<Self, DeserializeError> {
        if buffer.len() < Self::REQUIRED_FIELDS_LENGTH {
            return Err(DeserializeError::CorruptPacket);
        }

        let argument_count = usize::from(buffer[7]);
        let body_start = Self::REQUIRED_FIELDS_LENGTH + argument_count;
        let argument_lengths = buffer
            .get(Self::REQUIRED_FIELDS_LENGTH..body_start)
            .ok_or(DeserializeError::CorruptPacket)?;

        let declared_lengths = buffer[4..7]
            .iter()
            .chain(argument_lengths)
            .map(|&length| usize::from(length))
            .sum();
        ensure_exact_length(buffer, body_start, declared_lengths)?;

        let mut cursor = FieldCursor::new(buffer, body_start);
        let user_information =
            UserInformation::deserialize_body_information(&buffer[4..7], &mut cursor)?;

        Ok(Self {
            method: AuthenticationMethod::try_from(buffer[0])?,
            authentication: AuthenticationContext::deserialize_header_information(&buffer[1..4])?,
            user_information,
            arguments: Arguments::deserialize(argument_lengths, &mut cursor)?,
        })
    }
}

/// The status of an authorization operation, as returned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Authorization passed; server may have additional arguments for the client.
    PassAdd,

    /// Authorization passed; server provides argument values to override those provided in the request.
    PassReplace,

    /// Authorization request was denied.
    Fail,

    /// An error occurred on the server.
    Error,

    /// Forward authorization request to an alternative daemon (deprecated in RFC-8907).
    Follow,

    /// A status code not assigned by RFC-8907.
    Unknown(u8),
}

impl Status {
    /// Whether this status indicates that authorization was granted.
    pub fn is_pass(self) -> bool {
        matches!(self, Self::PassAdd | Self::PassReplace)
    }
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        match value {
            0x01 => Self::PassAdd,
            0x02 => Self::PassReplace,
            0x10 => Self::Fail,
            0x11 => Self::Error,
            0x21 => Self::Follow,
            other => Self::Unknown(other),
        }
    }
}

impl From<Status> for u8 {
    fn from(value: Status) -> Self {
        match value {
            Status::PassAdd => 0x01,
            Status::PassReplace => 0x02,
            Status::Fail => 0x10,
            Status::Error => 0x11,
            Status::Follow => 0x21,
            Status::Unknown(code) => code,
        }
    }
}

/// Contents of an authorization reply packet received from a TACACS+ server.
#[derive(Clone, Debug, PartialEq, Eq, Getters, CopyGetters)]
pub struct Reply {
    /// Gets the status returned in an authorization exchange.
    #[getset(get_copy = "pub")]
    status: Status,

    /// Gets the message sent by the server, to be displayed to the user.
    #[getset(get = "pub")]
    server_message: String,

    /// Gets the administrative/log data returned from the server.
    #[getset(get = "pub")]
    data: Vec<u8>,

    /// Arguments returned by the server, in the order they were received.
    #[getset(get = "pub")]
    arguments: Vec<Argument>,
}

impl Reply {
    // status, argument count, server message length (2), data length (2)
    const ARGUMENT_LENGTHS_START: usize = 6;

    /// Assembles a reply body. Arguments past the 255th are not sent.
    pub fn new(
        status: Status,
        server_message: String,
        data: Vec<u8>,
        arguments: Vec<Argument>,
    ) -> Self {
        Self {
            status,
            server_message,
            data,
            arguments,
        }
    }
}

impl PacketBody for Reply {
    const TYPE: PacketType = PacketType::Authorization;
    const REQUIRED_FIELDS_LENGTH: usize = Self::ARGUMENT_LENGTHS_START;
}

impl Serialize for Reply {
    fn wire_size(&self) -> usize {
        Self::REQUIRED_FIELDS_LENGTH
            + clamp_u16_field(self.server_message.as_bytes()).len()
            + clamp_u16_field(&self.data).len()
            + Arguments::new(&self.arguments).wire_size()
    }

    fn serialize_into_buffer(&self, buffer: &mut [u8]) -> Result<usize, NotEnoughSpace> {
        let wire_size = self.wire_size();

        if buffer.len() >= wire_size {
            let arguments = Arguments::new(&self.arguments);
            let server_message = clamp_u16_field(self.server_message.as_bytes());
            let data = clamp_u16_field(&self.data);

            buffer[0] = self.status.into();
            buffer[1] = arguments.argument_count();
            NetworkEndian::write_u16(&mut buffer[2..4], server_message.len() as u16);
            NetworkEndian::write_u16(&mut buffer[4..6], data.len() as u16);

            let lengths_len =
                arguments.serialize_lengths(&mut buffer[Self::ARGUMENT_LENGTHS_START..]);

            let message_start = Self::ARGUMENT_LENGTHS_START + lengths_len;
            let data_start = message_start + server_message.len();
            let arguments_start = data_start + data.len();

            buffer[message_start..data_start].copy_from_slice(server_message);
            buffer[data_start..arguments_start].copy_from_slice(data);
            arguments.serialize_encoded_values(&mut buffer[arguments_start..]);

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

        let argument_count = usize::from(buffer[1]);
        let server_message_length = usize::from(NetworkEndian::read_u16(&buffer[2..4]));
        let data_length = usize::from(NetworkEndian::read_u16(&buffer[4..6]));

        let body_start = Self::ARGUMENT_LENGTHS_START + argument_count;
        let argument_lengths = buffer
            .get(Self::ARGUMENT_LENGTHS_START..body_start)
            .ok_or(DeserializeError::CorruptPacket)?;

        let arguments_length: usize = argument_lengths
            .iter()
            .map(|&length| usize::from(length))
            .sum();
        ensure_exact_length(
            buffer,
            body_start,
            server_message_length + data_length + arguments_length,
        )?;

        let mut cursor = FieldCursor::new(buffer, body_start);

        Ok(Self {
            status: Status::from(buffer[0]),
            server_message: text_from_wire(cursor.take(server_message_length)?),
            data: cursor.take(data_length)?.to_vec(),
            arguments: Arguments::deserialize(argument_lengths, &mut cursor)?,
        })
    }
}
