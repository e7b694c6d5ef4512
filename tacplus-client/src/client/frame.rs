//! Reading whole packets off a byte stream.

use futures::{AsyncRead, AsyncReadExt};
use tacplus_protocol::HeaderInfo;

use super::ClientError;

#[cfg(test)]
mod tests;

/// A packet as read from the wire: a validated header and its still-obfuscated body.
#[derive(Debug)]
pub(super) struct Frame {
    pub(super) header: HeaderInfo,
    pub(super) body: Vec<u8>,
}

/// Reads the next packet from a stream.
///
/// Returns `Ok(None)` if the stream ended cleanly between packets. The header is validated
/// before the body is read, so a malformed header never reaches the cipher; a body longer
/// than `max_body_length` is rejected without being read.
pub(super) async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_body_length: u32,
) -> Result<Option<Frame>, ClientError> {
    let mut header_buffer = [0u8; HeaderInfo::HEADER_SIZE_BYTES];

    if !read_header(reader, &mut header_buffer).await? {
        return Ok(None);
    }

    let header = HeaderInfo::try_from(header_buffer.as_slice())?;

    // header buffer is full-sized, so the length is always present
    let body_length = HeaderInfo::claimed_body_length(&header_buffer).unwrap_or_default();
    if body_length > max_body_length {
        return Err(ClientError::CorruptPacket);
    }

    let mut body = vec![0u8; body_length as usize];
    reader.read_exact(&mut body).await.map_err(eof_to_closed)?;

    Ok(Some(Frame { header, body }))
}

/// Fills the header buffer, returning `false` if the stream ended before any byte was read.
async fn read_header<R: AsyncRead + Unpin>(
    reader: &mut R,
    buffer: &mut [u8; HeaderInfo::HEADER_SIZE_BYTES],
) -> Result<bool, ClientError> {
    let mut filled = 0;

    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]).await? {
            0 if filled == 0 => return Ok(false),
            0 => return Err(ClientError::ConnectionClosed),
            read => filled += read,
        }
    }

    Ok(true)
}

fn eof_to_closed(error: futures::io::Error) -> ClientError {
    if error.kind() == futures::io::ErrorKind::UnexpectedEof {
        ClientError::ConnectionClosed
    } else {
        error.into()
    }
}
