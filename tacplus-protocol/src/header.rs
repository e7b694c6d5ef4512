use bitflags::bitflags;
use byteorder::{ByteOrder, NetworkEndian};
use getset::CopyGetters;

use super::{DeserializeError, NotEnoughSpace, PacketType, Version};


bitflags! {
    /// Flags to indicate information about packets or the client/server.
    #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
    pub struct PacketFlags: u8 {
        /// Indicates the body of the packet is unobfuscated.
        const UNENCRYPTED       = 0b00000001;

        /// Signals that the client would like to reuse a TCP connection across multiple sessions.
        const SINGLE_CONNECTION = 0b00000100;
    }
}

/// Error returned when a session has used up all of its sequence numbers.
///
/// Sequence numbers never wrap around; a fresh session has to be started instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceExhausted;

/// Information included in a TACACS+ packet header.
///
/// The body length is not stored, since it is derived from the body whenever a packet is written.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct HeaderInfo {
    /// The packet's protocol version.
    version: Version,

    /// The family of the packet (authentication, authorization or accounting).
    packet_type: PacketType,

    /// The sequence number of the packet. This is odd for client packets, and even for server packets.
    sequence_number: u8,

    /// Session/packet flags.
    flags: PacketFlags,

    /// ID of the current session.
    session_id: u32,
}

impl HeaderInfo {
    /// Size of a TACACS+ packet header, in bytes.
    pub const HEADER_SIZE_BYTES: usize = 12;

    /// Bundles together the fields of a packet header.
    pub fn new(
        version: Version,
        packet_type: PacketType,
        sequence_number: u8,
        flags: PacketFlags,
        session_id: u32,
    ) -> Self {
        Self {
            version,
            packet_type,
            sequence_number,
            flags,
            session_id,
        }
    }

    /// Whether a flag is set in this header.
    pub fn has_flag(&self, flag: PacketFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Produces the header of the packet that follows this one within the same session.
    ///
    /// The packet type, flags & session id are carried over and the sequence number is incremented.
    /// Fails if the sequence number is already at its maximum value.
    pub fn next(&self, version: Version) -> Result<Self, SequenceExhausted> {
        let sequence_number = self
            .sequence_number
            .checked_add(1)
            .ok_or(SequenceExhausted)?;

        Ok(Self {
            version,
            sequence_number,
            ..*self
        })
    }

    /// Extracts the body length claimed by a serialized header, if the buffer is long enough to contain one.
    pub fn claimed_body_length(buffer: &[u8]) -> Option<u32> {
        if buffer.len() >= Self::HEADER_SIZE_BYTES {
            Some(NetworkEndian::read_u32(&buffer[8..12]))
        } else {
            None
        }
    }

    /// Serializes this header into the start of a buffer, along with the length of the body that follows it.
    pub fn serialize_into_buffer(
        &self,
        body_length: u32,
        buffer: &mut [u8],
    ) -> Result<usize, NotEnoughSpace> {
        if buffer.len() >= Self::HEADER_SIZE_BYTES {
            buffer[0] = self.version.into();
            buffer[1] = self.packet_type as u8;
            buffer[2] = self.sequence_number;
            buffer[3] = self.flags.bits();

            NetworkEndian::write_u32(&mut buffer[4..8], self.session_id);
            NetworkEndian::write_u32(&mut buffer[8..12], body_length);

            Ok(Self::HEADER_SIZE_BYTES)
        } else {
            Err(NotEnoughSpace(()))
        }
    }
}

impl TryFrom<&[u8]> for HeaderInfo {
    type Error = DeserializeError;

    fn try_from(buffer: &[u8]) -> Result<Self, Self::Error> {
        if buffer.len() < Self::HEADER_SIZE_BYTES {
            return Err(DeserializeError::UnexpectedEnd);
        }

        let version = Version::try_from(buffer[0])?;
        let packet_type =
            PacketType::try_from(buffer[1]).map_err(|_| DeserializeError::MalformedHeader)?;

        Ok(Self {
            version,
            packet_type,
            sequence_number: buffer[2],
            // unknown flag bits are kept around rather than rejected
            flags: PacketFlags::from_bits_retain(buffer[3]),
            session_id: NetworkEndian::read_u32(&buffer[4..8]),
        })
    }
}
