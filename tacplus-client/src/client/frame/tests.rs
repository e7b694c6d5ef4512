use futures::executor::block_on;
use futures::io::Cursor;

use tacplus_protocol::PacketType;

use super::*;

const AUTHORIZATION_HEADER: [u8; 12] = [
    0xc0, // version (minor v0)
    0x02, // authorization
    2,    // sequence number
    0x01, // unencrypted
    0, 0, 0x30, 0x39, // session id: 12345
    0, 0, 0, 3, // body length
];

#[test]
fn read_complete_frame() {
    let mut raw = AUTHORIZATION_HEADER.to_vec();
    raw.extend_from_slice(&[0xaa, 0xbb, 0xcc]);
    let mut reader = Cursor::new(raw);

    let frame = block_on(read_frame(&mut reader, 1024))
        .expect("frame should be read")
        .expect("stream should not be at its end");

    assert_eq!(frame.header.packet_type(), PacketType::Authorization);
    assert_eq!(frame.header.session_id(), 12345);
    assert_eq!(frame.body, [0xaa, 0xbb, 0xcc]);

    // nothing left afterwards
    let end = block_on(read_frame(&mut reader, 1024)).expect("clean end should not be an error");
    assert!(end.is_none());
}

#[test]
fn truncated_body_closes() {
    let mut raw = AUTHORIZATION_HEADER.to_vec();
    raw.push(0xaa);
    let mut reader = Cursor::new(raw);

    let result = block_on(read_frame(&mut reader, 1024));
    assert!(matches!(result, Err(ClientError::ConnectionClosed)));
}

#[test]
fn truncated_header_closes() {
    let mut reader = Cursor::new(AUTHORIZATION_HEADER[..7].to_vec());

    let result = block_on(read_frame(&mut reader, 1024));
    assert!(matches!(result, Err(ClientError::ConnectionClosed)));
}

#[test]
fn oversized_body_rejected() {
    let mut raw = AUTHORIZATION_HEADER.to_vec();
    raw.extend_from_slice(&[0; 3]);
    let mut reader = Cursor::new(raw);

    let result = block_on(read_frame(&mut reader, 2));
    assert!(matches!(result, Err(ClientError::CorruptPacket)));
}

#[test]
fn malformed_header_rejected() {
    let mut raw = AUTHORIZATION_HEADER.to_vec();
    raw[1] = 0x07; // no such packet type
    raw.extend_from_slice(&[0; 3]);
    let mut reader = Cursor::new(raw);

    let result = block_on(read_frame(&mut reader, 1024));
    assert!(matches!(result, Err(ClientError::MalformedHeader)));
}
