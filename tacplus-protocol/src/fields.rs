use alloc::borrow::ToOwned;
use alloc::string::String;

use num_enum::TryFromPrimitive;

use crate::{DeserializeError, MinorVersion};


/// The method used to authenticate to the TACACS+ client.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, TryFromPrimitive)]
pub enum AuthenticationMethod {
    /// Unknown.
    NotSet = 0x00,

    /// No authentication performed.
    None = 0x01,

    /// Kerberos version 5
    Kerberos5 = 0x02,

    /// Fixed password associated with access line
    Line = 0x03,

    /// Granting new privileges (a la `su(1)`)
    Enable = 0x04,

    /// Client-local user database
    Local = 0x05,

    /// The TACACS+ protocol itself.
    TacacsPlus = 0x06,

    /// (Unqualified) guest authentication
    Guest = 0x08,

    /// RADIUS (RFC 3579)
    Radius = 0x10,

    /// Kerberos version 4
    Kerberos4 = 0x11,

    /// r-command, like `rlogin(1)`
    RCommand = 0x20,
}

impl AuthenticationMethod {
    /// The number of bytes an `AuthenticationMethod` occupies on the wire.
    pub const WIRE_SIZE: usize = 1;
}

/// A privilege level for authentication. Limited to the range 0-15, inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrivilegeLevel(u8);

impl PrivilegeLevel {
    /// The lowest privilege level.
    pub const MINIMUM: Self = Self(0);

    /// Normal user privileges.
    pub const USER: Self = Self(1);

    /// The highest privilege level.
    pub const ROOT: Self = Self(15);

    /// Converts an integer to a `PrivilegeLevel` if it is in the proper range (0-15).
    ///
    /// # Examples
    /// ```
    /// use tacplus_protocol::PrivilegeLevel;
    ///
    /// let valid_level = PrivilegeLevel::new(3);
    /// assert!(valid_level.is_some());
    ///
    /// let too_big = PrivilegeLevel::new(42);
    /// assert!(too_big.is_none());
    /// ```
    pub const fn new(level: u8) -> Option<Self> {
        if level <= 15 {
            Some(Self(level))
        } else {
            None
        }
    }

    /// The numeric value of this privilege level.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for PrivilegeLevel {
    fn default() -> Self {
        Self::USER
    }
}

/// Types of authentication supported by the TACACS+ protocol.
///
/// RFC-8907 partitions these by supported minor version: [`Ascii`](AuthenticationType::Ascii) requires
/// [`MinorVersion::Default`], while the rest (beside [`NotSet`](AuthenticationType::NotSet)) require [`MinorVersion::V1`].
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum AuthenticationType {
    /// Authentication type not set, typically when it's not available to the client.
    ///
    /// **NOTE:** This option is only valid for authorization and accounting requests.
    NotSet = 0x00,

    /// Plain text username & password exchange.
    Ascii = 0x01,

    /// The Password Authentication Protocol, as specified by [RFC-1334](https://www.rfc-editor.org/rfc/rfc1334.html).
    Pap = 0x02,

    /// The Challenge-Handshake Authentication Protocol, also specified in [RFC-1334](https://www.rfc-editor.org/rfc/rfc1334.html).
    Chap = 0x03,

    /// Version 1 of Microsoft's CHAP extension.
    MsChap = 0x05,

    /// Version 2 of Microsoft's CHAP extension.
    MsChapV2 = 0x06,
}

impl AuthenticationType {
    /// Returns the required minor version for this `AuthenticationType`, if applicable.
    pub const fn required_minor_version(&self) -> Option<MinorVersion> {
        match self {
            AuthenticationType::NotSet => None,
            AuthenticationType::Ascii => Some(MinorVersion::Default),
            _ => Some(MinorVersion::V1),
        }
    }
}

/// A TACACS+ authentication service. Most of these values are only kept for backwards compatibility.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum AuthenticationService {
    /// No authentication performed.
    None = 0x00,

    /// Regular login to a client device.
    Login = 0x01,

    /// Request for a change in privileges, a la `su(1)`.
    Enable = 0x02,

    /// Point-to-Point Protocol
    Ppp = 0x03,

    /// Protocol translation.
    Pt = 0x05,

    /// Authentication from the r-command suite, e.g. via `rlogin(1)`.
    RCommand = 0x06,

    /// X.25 suite, potentially its NetWare flavor.
    X25 = 0x07,

    /// NetWare Asynchronous Support Interface
    Nasi = 0x08,

    /// Firewall proxy
    FwProxy = 0x09,
}

/// Some authentication information about a request, sent or received from a server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AuthenticationContext {
    /// The privilege level of the request.
    pub privilege_level: PrivilegeLevel,

    /// The authentication type in use.
    pub authentication_type: AuthenticationType,

    /// The service requesting authentication.
    pub service: AuthenticationService,
}

impl AuthenticationContext {
    /// Size of authentication context information on the wire, in bytes.
    pub const WIRE_SIZE: usize = 3;

    /// Serializes authentication context information into a packet body "header."
    pub(crate) fn serialize_header_information(&self, buffer: &mut [u8]) {
        buffer[0] = self.privilege_level.0;
        buffer[1] = self.authentication_type as u8;
        buffer[2] = self.service as u8;
    }

    /// Parses authentication context information from 3 bytes of a packet body "header."
    pub(crate) fn deserialize_header_information(buffer: &[u8]) -> Result<Self, DeserializeError> {
        Ok(Self {
            privilege_level: PrivilegeLevel::new(buffer[0]).ok_or(DeserializeError::CorruptPacket)?,
            authentication_type: AuthenticationType::try_from(buffer[1])?,
            service: AuthenticationService::try_from(buffer[2])?,
        })
    }
}

/// Some information about the user connected to a TACACS+ client.
///
/// Each field is limited to 255 bytes on the wire; longer values are truncated when serialized.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct UserInformation {
    user: String,
    port: String,
    remote_address: String,
}

impl UserInformation {
    // three lengths in header
    const HEADER_INFORMATION_SIZE: usize = 3;

    /// Bundles together information about a TACACS+ client user.
    pub fn new(user: &str, port: &str, remote_address: &str) -> Self {
        Self {
            user: user.to_owned(),
            port: port.to_owned(),
            remote_address: remote_address.to_owned(),
        }
    }

    /// The user being authenticated/authorized.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The label of the port the user is connected to, e.g. `tty0`.
    pub fn port(&self) -> &str {
        &self.port
    }

    /// The location the user is connecting from.
    pub fn remote_address(&self) -> &str {
        &self.remote_address
    }

    /// Returns the number of bytes the field lengths & values will occupy on the wire.
    pub fn wire_size(&self) -> usize {
        Self::HEADER_INFORMATION_SIZE + self.body_size()
    }

    fn body_size(&self) -> usize {
        clamp_u8_field(self.user.as_bytes()).len()
            + clamp_u8_field(self.port.as_bytes()).len()
            + clamp_u8_field(self.remote_address.as_bytes()).len()
    }

    /// Places field lengths into the "header" section of a packet body.
    pub(crate) fn serialize_header_information(&self, buffer: &mut [u8]) {
        buffer[0] = clamp_u8_field(self.user.as_bytes()).len() as u8;
        buffer[1] = clamp_u8_field(self.port.as_bytes()).len() as u8;
        buffer[2] = clamp_u8_field(self.remote_address.as_bytes()).len() as u8;
    }

    /// Copies client information fields into their proper locations within a packet body.
    pub(crate) fn serialize_body_information(&self, buffer: &mut [u8]) -> usize {
        let mut written = 0;

        for field in [&self.user, &self.port, &self.remote_address] {
            let bytes = clamp_u8_field(field.as_bytes());
            buffer[written..written + bytes.len()].copy_from_slice(bytes);
            written += bytes.len();
        }

        written
    }

    /// Reads the three fields in order from a body cursor, given the lengths from the body "header."
    pub(crate) fn deserialize_body_information(
        lengths: &[u8],
        cursor: &mut FieldCursor<'_>,
    ) -> Result<Self, DeserializeError> {
        Ok(Self {
            user: text_from_wire(cursor.take(lengths[0].into())?),
            port: text_from_wire(cursor.take(lengths[1].into())?),
            remote_address: text_from_wire(cursor.take(lengths[2].into())?),
        })
    }
}

/// Truncates a field so its length fits in a single length byte.
pub(crate) fn clamp_u8_field(field: &[u8]) -> &[u8] {
    &field[..field.len().min(u8::MAX as usize)]
}

/// Truncates a field so its length fits in a two-byte length prefix.
pub(crate) fn clamp_u16_field(field: &[u8]) -> &[u8] {
    &field[..field.len().min(u16::MAX as usize)]
}

/// Converts a text field received on the wire, replacing invalid UTF-8 rather than failing.
pub(crate) fn text_from_wire(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Sequential reader over the variable-length section of a packet body.
pub(crate) struct FieldCursor<'buffer> {
    buffer: &'buffer [u8],
    position: usize,
}

impl<'buffer> FieldCursor<'buffer> {
    pub(crate) fn new(buffer: &'buffer [u8], position: usize) -> Self {
        Self { buffer, position }
    }

    /// Returns the next `length` bytes, advancing the cursor.
    pub(crate) fn take(&mut self, length: usize) -> Result<&'buffer [u8], DeserializeError> {
        let end = self.position + length;
        let field = self
            .buffer
            .get(self.position..end)
            .ok_or(DeserializeError::CorruptPacket)?;
        self.position = end;
        Ok(field)
    }
}

/// Checks that a body's declared field lengths exactly account for its size.
pub(crate) fn ensure_exact_length(
    buffer: &[u8],
    required_fields_length: usize,
    declared_lengths: usize,
) -> Result<(), DeserializeError> {
    if buffer.len() == required_fields_length + declared_lengths {
        Ok(())
    } else {
        Err(DeserializeError::CorruptPacket)
    }
}
