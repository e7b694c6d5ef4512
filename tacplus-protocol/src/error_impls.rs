use std::error::Error;
use std::fmt;

use super::{DeserializeError, NotEnoughSpace, SequenceExhausted, SerializeError};

impl fmt::Display for NotEnoughSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not enough space in buffer")
    }
}

impl Error for NotEnoughSpace {}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::NotEnoughSpace => "not enough space in provided buffer",
            Self::IncorrectUnencryptedFlag => {
                "unencrypted header flag does not match requested obfuscation"
            }
        };

        write!(f, "{}", message)
    }
}

impl Error for SerializeError {}

impl fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedHeader => write!(f, "unknown version or packet type in header"),
            Self::CorruptPacket => write!(f, "corrupt packet or bad key"),
            Self::UnsupportedPacketType(packet_type) => {
                write!(f, "unexpected inbound packet type {:?}", packet_type)
            }
            Self::UnexpectedEnd => write!(f, "unexpected end of buffer when deserializing"),
        }
    }
}

impl Error for DeserializeError {}

impl fmt::Display for SequenceExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session sequence numbers exhausted; start a new session")
    }
}

impl Error for SequenceExhausted {}
