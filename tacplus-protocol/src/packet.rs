use alloc::vec;
use alloc::vec::Vec;

use super::{accounting, authentication, authorization};
use super::{
    toggle_cipher, Deserialize, DeserializeError, HeaderInfo, MinorVersion, PacketBody,
    PacketFlags, PacketType, Serialize, SerializeError,
};


/// The body of a TACACS+ packet, in any of the forms a client sends or receives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    /// Start of an authentication session.
    AuthenticationStart(authentication::Start),

    /// Client response to an authentication reply.
    AuthenticationContinue(authentication::Continue),

    /// Server reply within an authentication session.
    AuthenticationReply(authentication::Reply),

    /// Authorization request.
    AuthorizationRequest(authorization::Request),

    /// Server reply to an authorization request.
    AuthorizationReply(authorization::Reply),

    /// Accounting record or reply, left undecoded.
    Accounting(accounting::Opaque),
}

macro_rules! body_conversion {
    ($($variant:ident => $body:ty),+ $(,)?) => {
        $(
            impl From<$body> for Body {
                fn from(value: $body) -> Self {
                    Self::$variant(value)
                }
            }
        )+

        impl Body {
            /// The packet family this body belongs to.
            pub fn packet_type(&self) -> PacketType {
                match self {
                    $(Self::$variant(_) => <$body as PacketBody>::TYPE,)+
                }
            }

            /// The minor version the body requires the header to carry, if any.
            pub fn required_minor_version(&self) -> Option<MinorVersion> {
                match self {
                    $(Self::$variant(inner) => inner.required_minor_version(),)+
                }
            }

            fn as_serialize(&self) -> &dyn Serialize {
                match self {
                    $(Self::$variant(inner) => inner,)+
                }
            }
        }
    };
}

body_conversion! {
    AuthenticationStart => authentication::Start,
    AuthenticationContinue => authentication::Continue,
    AuthenticationReply => authentication::Reply,
    AuthorizationRequest => authorization::Request,
    AuthorizationReply => authorization::Reply,
    Accounting => accounting::Opaque,
}

impl Serialize for Body {
    fn wire_size(&self) -> usize {
        self.as_serialize().wire_size()
    }

    fn serialize_into_buffer(&self, buffer: &mut [u8]) -> Result<usize, super::NotEnoughSpace> {
        self.as_serialize().serialize_into_buffer(buffer)
    }
}

/// A full TACACS+ protocol packet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    header: HeaderInfo,
    body: Body,
}

impl Packet {
    /// Assembles a header and body into a full packet.
    ///
    /// Returns `None` if the header's packet type doesn't match the body, or if the body
    /// requires a minor version (e.g. PAP authentication) that the header doesn't carry.
    pub fn new(header: HeaderInfo, body: impl Into<Body>) -> Option<Self> {
        let body: Body = body.into();

        if header.packet_type() != body.packet_type() {
            return None;
        }

        match body.required_minor_version() {
            Some(minor_version) if minor_version != header.version().minor() => None,
            _ => Some(Self { header, body }),
        }
    }

    /// The header of this packet.
    pub fn header(&self) -> &HeaderInfo {
        &self.header
    }

    /// The body of this packet.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Splits this packet into its header & body.
    pub fn into_parts(self) -> (HeaderInfo, Body) {
        (self.header, self.body)
    }

    /// Size of the whole packet on the wire, header included.
    pub fn wire_size(&self) -> usize {
        HeaderInfo::HEADER_SIZE_BYTES + self.body.wire_size()
    }

    /// Serializes this packet, obfuscating its body with the provided key.
    ///
    /// Fails if the header has the [`UNENCRYPTED`](PacketFlags::UNENCRYPTED) flag set.
    pub fn serialize(&self, key: &[u8]) -> Result<Vec<u8>, SerializeError> {
        if self.header.has_flag(PacketFlags::UNENCRYPTED) {
            return Err(SerializeError::IncorrectUnencryptedFlag);
        }

        let mut buffer = self.serialize_plain()?;
        toggle_cipher(
            &mut buffer[HeaderInfo::HEADER_SIZE_BYTES..],
            key,
            &self.header,
        );

        Ok(buffer)
    }

    /// Serializes this packet without obfuscating its body.
    ///
    /// Fails unless the header has the [`UNENCRYPTED`](PacketFlags::UNENCRYPTED) flag set.
    pub fn serialize_unobfuscated(&self) -> Result<Vec<u8>, SerializeError> {
        if self.header.has_flag(PacketFlags::UNENCRYPTED) {
            self.serialize_plain()
        } else {
            Err(SerializeError::IncorrectUnencryptedFlag)
        }
    }

    fn serialize_plain(&self) -> Result<Vec<u8>, SerializeError> {
        let body_length = self.body.wire_size();
        let mut buffer = vec![0u8; HeaderInfo::HEADER_SIZE_BYTES + body_length];

        let claimed_length =
            u32::try_from(body_length).map_err(|_| SerializeError::NotEnoughSpace)?;
        let header_length = self.header.serialize_into_buffer(claimed_length, &mut buffer)?;
        self.body.serialize_into_buffer(&mut buffer[header_length..])?;

        Ok(buffer)
    }

    /// Parses a reply packet from a validated header & its (still obfuscated) body.
    ///
    /// The body is deobfuscated in place unless the header says it's unencrypted. Accounting
    /// replies are reported as [`UnsupportedPacketType`](DeserializeError::UnsupportedPacketType),
    /// since their bodies aren't decoded.
    pub fn deserialize_reply(
        header: HeaderInfo,
        body: &mut [u8],
        key: &[u8],
    ) -> Result<Self, DeserializeError> {
        toggle_cipher(body, key, &header);

        let body: Body = match header.packet_type() {
            PacketType::Authentication => {
                authentication::Reply::deserialize_from_buffer(body)?.into()
            }
            PacketType::Authorization => {
                authorization::Reply::deserialize_from_buffer(body)?.into()
            }
            other => return Err(DeserializeError::UnsupportedPacketType(other)),
        };

        Ok(Self { header, body })
    }

    /// Parses a reply packet from a buffer holding a complete header & body.
    pub fn deserialize_reply_from_buffer(
        buffer: &mut [u8],
        key: &[u8],
    ) -> Result<Self, DeserializeError> {
        let (header, body) = split_frame(buffer)?;
        Self::deserialize_reply(header, body, key)
    }

    /// Parses a client-side packet from a validated header & its (still obfuscated) body.
    ///
    /// The first packet of an authentication session is a start, later ones are continues.
    /// Accounting bodies are kept opaque. This is the receiving half of a server, used for
    /// exercising a client against an in-process peer.
    pub fn deserialize_request(
        header: HeaderInfo,
        body: &mut [u8],
        key: &[u8],
    ) -> Result<Self, DeserializeError> {
        toggle_cipher(body, key, &header);

        let body: Body = match header.packet_type() {
            PacketType::Authentication if header.sequence_number() == 1 => {
                authentication::Start::deserialize_from_buffer(body)?.into()
            }
            PacketType::Authentication => {
                authentication::Continue::deserialize_from_buffer(body)?.into()
            }
            PacketType::Authorization => {
                authorization::Request::deserialize_from_buffer(body)?.into()
            }
            PacketType::Accounting => accounting::Opaque::deserialize_from_buffer(body)?.into(),
        };

        Ok(Self { header, body })
    }

    /// Parses a client-side packet from a buffer holding a complete header & body.
    pub fn deserialize_request_from_buffer(
        buffer: &mut [u8],
        key: &[u8],
    ) -> Result<Self, DeserializeError> {
        let (header, body) = split_frame(buffer)?;
        Self::deserialize_request(header, body, key)
    }
}

/// Splits a buffer into a parsed header & the body its length field claims.
fn split_frame(buffer: &mut [u8]) -> Result<(HeaderInfo, &mut [u8]), DeserializeError> {
    let header = HeaderInfo::try_from(&*buffer)?;
    let body_length = HeaderInfo::claimed_body_length(buffer)
        .and_then(|length| usize::try_from(length).ok())
        .ok_or(DeserializeError::UnexpectedEnd)?;

    let body = buffer
        .get_mut(HeaderInfo::HEADER_SIZE_BYTES..HeaderInfo::HEADER_SIZE_BYTES + body_length)
        .ok_or(DeserializeError::UnexpectedEnd)?;

    Ok((header, body))
}
