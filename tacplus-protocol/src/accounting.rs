//! Accounting packets, carried without interpreting their contents.

use alloc::vec::Vec;

use super::{Deserialize, DeserializeError, NotEnoughSpace, PacketBody, PacketType, Serialize};

/// An accounting packet body whose fields are left undecoded.
///
/// It only takes part in framing & obfuscation, so records can be relayed or logged as-is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Opaque {
    body: Vec<u8>,
}

impl Opaque {
    /// Wraps raw accounting body bytes.
    pub fn new(body: Vec<u8>) -> Self {
        Self { body }
    }

    /// The raw body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consumes this body, returning its bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.body
    }
}

impl PacketBody for Opaque {
    const TYPE: PacketType = PacketType::Accounting;
    const REQUIRED_FIELDS_LENGTH: usize = 0;
}

impl Serialize for Opaque {
    fn wire_size(&self) -> usize {
        self.body.len()
    }

    fn serialize_into_buffer(&self, buffer: &mut [u8]) -> Result<usize, NotEnoughSpace> {
        let destination = buffer
            .get_mut(..self.body.len())
            .ok_or(NotEnoughSpace(()))?;
        destination.copy_from_slice(&self.body);

        Ok(self.body.len())
    }
}

impl Deserialize for Opaque {
    fn deserialize_from_buffer(buffer: &[u8]) -> Result<Self, DeserializeError> {
        Ok(Self::new(buffer.to_vec()))
    }
}
