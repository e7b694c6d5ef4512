//! TACACS+ protocol packet <-> binary format conversions.
//!
//! This crate covers the wire-level half of an [RFC8907] client: the 12-byte packet
//! header, the MD5-based body obfuscation, and the typed packet bodies for
//! authentication and authorization. Accounting bodies are only carried opaquely.
//!
//! Encoding never fails on over-long text/data fields; they are truncated to the
//! largest length their length prefix can represent.
//!
//! [RFC8907]: https://www.rfc-editor.org/rfc/rfc8907.html

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

use num_enum::{TryFromPrimitive, TryFromPrimitiveError};

pub mod accounting;
pub mod authentication;
pub mod authorization;

mod arguments;
pub use arguments::Argument;

mod fields;
pub use fields::*;

mod header;
pub use header::{HeaderInfo, PacketFlags, SequenceExhausted};

mod obfuscation;
pub use obfuscation::toggle_cipher;

mod packet;
pub use packet::{Body, Packet};

// Error trait is only available on std (on stable; stabilized in nightly 1.81) so this has to be std-gated
#[cfg(feature = "std")]
mod error_impls;

/// An error type indicating that there is not enough space to complete an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotEnoughSpace(());

/// An error that occurred while serializing a packet.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializeError {
    /// The target buffer was too small to hold the packet.
    NotEnoughSpace,

    /// The unencrypted flag in the header disagreed with the requested (un)obfuscation.
    IncorrectUnencryptedFlag,
}

impl From<NotEnoughSpace> for SerializeError {
    fn from(_value: NotEnoughSpace) -> Self {
        Self::NotEnoughSpace
    }
}

/// An error that occurred during deserialization of a full/partial packet.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeserializeError {
    /// The header carried an unknown version or packet type code.
    MalformedHeader,

    /// Declared field lengths did not add up to the body size, or a fixed field held an invalid code.
    ///
    /// A wrong shared secret produces garbage lengths after deobfuscation, so this is
    /// indistinguishable from a bad key.
    CorruptPacket,

    /// A well-formed packet of a type that is not expected in this direction.
    UnsupportedPacketType(PacketType),

    /// The buffer ended before a complete header/body was available.
    UnexpectedEnd,
}

// enum fields inside packet bodies; header codes are mapped to MalformedHeader explicitly
#[doc(hidden)]
impl<Enum: TryFromPrimitive<Primitive = u8>> From<TryFromPrimitiveError<Enum>>
    for DeserializeError
{
    fn from(_value: TryFromPrimitiveError<Enum>) -> Self {
        Self::CorruptPacket
    }
}

/// The major version of the TACACS+ protocol.
#[repr(u8)]
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MajorVersion {
    /// The only current major version specified in RFC-8907.
    RFC8907 = 0xc,
}

/// The minor version of the TACACS+ protocol in use, which specifies choices for authentication methods.
#[repr(u8)]
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MinorVersion {
    /// Default minor version, used for ASCII authentication.
    Default = 0x0,
    /// Minor version 1, which is used for (MS)CHAP and PAP authentication.
    V1 = 0x1,
}

/// The full protocol version.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Version(MajorVersion, MinorVersion);

impl Version {
    /// Creates a full version from a major and minor version.
    pub const fn new(major: MajorVersion, minor: MinorVersion) -> Self {
        Self(major, minor)
    }

    /// Shorthand for an RFC8907 version with the given minor version.
    pub const fn rfc8907(minor: MinorVersion) -> Self {
        Self(MajorVersion::RFC8907, minor)
    }

    /// The major part of this version.
    pub fn major(&self) -> MajorVersion {
        self.0
    }

    /// The minor part of this version.
    pub fn minor(&self) -> MinorVersion {
        self.1
    }
}

impl TryFrom<u8> for Version {
    type Error = DeserializeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        // only major version is 0xc currently
        if value >> 4 == MajorVersion::RFC8907 as u8 {
            let minor_version = match value & 0xf {
                0 => Ok(MinorVersion::Default),
                1 => Ok(MinorVersion::V1),
                _ => Err(DeserializeError::MalformedHeader),
            }?;

            Ok(Self(MajorVersion::RFC8907, minor_version))
        } else {
            Err(DeserializeError::MalformedHeader)
        }
    }
}

impl From<Version> for u8 {
    fn from(value: Version) -> Self {
        ((value.0 as u8) << 4) | (value.1 as u8 & 0xf)
    }
}

/// The type of a protocol packet.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, TryFromPrimitive)]
pub enum PacketType {
    /// Authentication packet.
    Authentication = 0x1,

    /// Authorization packet.
    Authorization = 0x2,

    /// Accounting packet.
    Accounting = 0x3,
}

/// A type that can be treated as a TACACS+ protocol packet body.
pub trait PacketBody {
    /// Type of the packet (one of authentication, authorization, or accounting).
    const TYPE: PacketType;

    /// Length of body just including required fields.
    const REQUIRED_FIELDS_LENGTH: usize;

    /// Required protocol minor version based on the contents of the packet body.
    /// This really only exists since certain authentication methods are supposed to be gated by minor version.
    fn required_minor_version(&self) -> Option<MinorVersion> {
        None
    }
}

/// Something that can be serialized into a binary format.
pub trait Serialize {
    /// Returns the current size of the packet as represented on the wire.
    fn wire_size(&self) -> usize;

    /// Serializes data into a buffer, returning the resulting length on success or `NotEnoughSpace` on error.
    fn serialize_into_buffer(&self, buffer: &mut [u8]) -> Result<usize, NotEnoughSpace>;
}

/// Something that can be parsed from an unobfuscated packet body.
pub trait Deserialize: Sized {
    /// Attempts to parse an object from a complete body, which must be consumed exactly.
    fn deserialize_from_buffer(buffer: &[u8]) -> Result<Self, DeserializeError>;
}
