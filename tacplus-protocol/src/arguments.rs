use alloc::string::String;
use alloc::vec::Vec;
use core::convert::Infallible;
use core::fmt;
use core::iter::once;
use core::str::FromStr;

use super::fields::{text_from_wire, FieldCursor};
use super::DeserializeError;


/// The separator between the name and value of a mandatory argument.
const MANDATORY_SEPARATOR: char = '=';

/// The separator between the name and value of an optional argument.
const OPTIONAL_SEPARATOR: char = '*';

fn is_separator(c: char) -> bool {
    c == MANDATORY_SEPARATOR || c == OPTIONAL_SEPARATOR
}

/// An attribute-value pair used in authorization exchanges.
///
/// On the wire an argument is encoded as `name=value` (mandatory) or `name*value` (optional).
#[derive(Clone, Default, PartialEq, Eq, Debug, Hash)]
pub struct Argument {
    name: String,
    value: String,
    optional: bool,
}

impl Argument {
    /// Constructs an argument, failing if the name contains either separator character.
    ///
    /// "An argument name MUST NOT contain either of the separators." [RFC 8907]
    pub fn new(name: &str, value: &str, optional: bool) -> Option<Self> {
        if name.contains(is_separator) {
            None
        } else {
            Some(Self {
                name: name.into(),
                value: value.into(),
                optional,
            })
        }
    }

    /// Parses an argument from its textual encoding.
    ///
    /// The string is split at the first separator, so values may contain either separator.
    /// A string with no separator at all is treated as a mandatory argument with an empty value.
    pub fn parse(encoded: &str) -> Self {
        match encoded.find(is_separator) {
            Some(index) => Self {
                name: encoded[..index].into(),
                value: encoded[index + 1..].into(),
                optional: encoded[index..].starts_with(OPTIONAL_SEPARATOR),
            },
            None => Self {
                name: encoded.into(),
                value: String::new(),
                optional: false,
            },
        }
    }

    /// The name of the argument.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value of the argument.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns `true` if this argument is optional, and `false` if it's mandatory.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    fn separator(&self) -> char {
        if self.optional {
            OPTIONAL_SEPARATOR
        } else {
            MANDATORY_SEPARATOR
        }
    }

    /// The encoded bytes of this argument, truncated to what fits in a single length byte.
    fn encoded_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.name
            .bytes()
            .chain(once(self.separator() as u8))
            .chain(self.value.bytes())
            .take(u8::MAX as usize)
    }

    /// The encoded length of an argument, including the name/value/delimiter but not the byte holding its length.
    fn encoded_length(&self) -> usize {
        (self.name.len() + 1 + self.value.len()).min(u8::MAX as usize)
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, self.separator(), self.value)
    }
}

impl FromStr for Argument {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// A view over the arguments of a packet, limited to the 255 arguments a packet can hold.
pub(crate) struct Arguments<'storage>(&'storage [Argument]);

impl<'storage> Arguments<'storage> {
    /// Wraps a set of arguments, silently dropping any beyond the 255th.
    pub(crate) fn new(arguments: &'storage [Argument]) -> Self {
        Self(&arguments[..arguments.len().min(u8::MAX as usize)])
    }

    /// The current number of arguments, expressed as a u8.
    pub(crate) fn argument_count(&self) -> u8 {
        self.0.len() as u8
    }

    /// The total size in bytes of the argument lengths and encoded values, excluding the argument count.
    pub(crate) fn wire_size(&self) -> usize {
        self.0
            .iter()
            .map(|argument| 1 + argument.encoded_length())
            .sum()
    }

    /// Serializes the argument lengths as stored in the "header" of a packet body, returning the number of bytes written.
    pub(crate) fn serialize_lengths(&self, buffer: &mut [u8]) -> usize {
        for (length, argument) in buffer.iter_mut().zip(self.0) {
            *length = argument.encoded_length() as u8;
        }

        self.0.len()
    }

    /// Serializes the name-value encodings of the stored arguments, returning the number of bytes written.
    pub(crate) fn serialize_encoded_values(&self, buffer: &mut [u8]) -> usize {
        let mut position = 0;

        for argument in self.0 {
            for byte in argument.encoded_bytes() {
                buffer[position] = byte;
                position += 1;
            }
        }

        position
    }

    /// Deserializes arguments from their encoded values, given their lengths from the body "header."
    pub(crate) fn deserialize(
        lengths: &[u8],
        cursor: &mut FieldCursor<'_>,
    ) -> Result<Vec<Argument>, DeserializeError> {
        lengths
            .iter()
            .map(|&length| {
                let raw_argument = cursor.take(length.into())?;
                Ok(Argument::parse(&text_from_wire(raw_argument)))
            })
            .collect()
    }
}
