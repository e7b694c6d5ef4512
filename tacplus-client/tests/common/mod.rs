//! An in-process TACACS+ server for exercising the client over a duplex pipe.

#![allow(dead_code)]

use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

use tacplus_client::client::{ClientConfig, ClientConfigBuilder};
use tacplus_client::protocol::{Body, HeaderInfo, Packet, PacketFlags};
use tacplus_client::{ClientError, Connection};

pub const SECRET: &[u8] = b"very secure key that is super secret";

pub type TestConnection = Connection<Compat<DuplexStream>>;

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn config_with_secret() -> ClientConfigBuilder {
    ClientConfigBuilder::new().secret(SECRET)
}

/// Connects a client to a fake server, spawning the client's dispatcher.
pub fn connect(
    config: ClientConfig,
) -> (
    TestConnection,
    FakeServer,
    JoinHandle<Result<(), ClientError>>,
) {
    init_logging();

    let (client_end, server_end) = duplex(8192);
    let (connection, dispatcher) = Connection::new(client_end.compat(), config);
    let dispatcher_handle = tokio::spawn(dispatcher.run());

    let server = FakeServer {
        stream: server_end,
        key: SECRET.to_vec(),
    };

    (connection, server, dispatcher_handle)
}

pub struct FakeServer {
    stream: DuplexStream,
    key: Vec<u8>,
}

impl FakeServer {
    /// Reads & decodes the next request sent by the client.
    pub async fn receive(&mut self) -> Packet {
        let mut header_buffer = [0u8; HeaderInfo::HEADER_SIZE_BYTES];
        self.stream
            .read_exact(&mut header_buffer)
            .await
            .expect("request header should be readable");

        let header =
            HeaderInfo::try_from(header_buffer.as_slice()).expect("request header should be valid");
        let body_length = HeaderInfo::claimed_body_length(&header_buffer)
            .expect("header buffer is full-sized") as usize;

        let mut body = vec![0u8; body_length];
        self.stream
            .read_exact(&mut body)
            .await
            .expect("request body should be readable");

        Packet::deserialize_request(header, &mut body, &self.key)
            .expect("request should be a valid packet")
    }

    /// Sends `body` in reply to `request`, as the next packet of its session.
    pub async fn reply(&mut self, request: &Packet, body: impl Into<Body>) {
        let header = request
            .header()
            .next(request.header().version())
            .expect("request sequence number should not be exhausted");

        self.reply_with_header(header, body).await;
    }

    /// Sends a reply with an arbitrary header.
    pub async fn reply_with_header(&mut self, header: HeaderInfo, body: impl Into<Body>) {
        let packet = Packet::new(header, body).expect("reply header should match body");
        let bytes = self.encode(&packet, &self.key.clone());
        self.send_raw(&bytes).await;
    }

    /// Encodes a packet, obfuscating it with `key` unless its header says otherwise.
    pub fn encode(&self, packet: &Packet, key: &[u8]) -> Vec<u8> {
        if packet.header().has_flag(PacketFlags::UNENCRYPTED) {
            packet.serialize_unobfuscated()
        } else {
            packet.serialize(key)
        }
        .expect("reply should serialize")
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.stream
            .write_all(bytes)
            .await
            .expect("reply should be writable");
    }

    /// Asserts the client closed its sending side without writing anything further.
    pub async fn assert_no_more_requests(&mut self) {
        let mut buffer = [0u8; 1];
        let read = self
            .stream
            .read(&mut buffer)
            .await
            .expect("stream should be readable");
        assert_eq!(read, 0, "client sent unexpected data");
    }

    /// Closes the server's end of the pipe.
    pub fn hang_up(self) {
        drop(self.stream);
    }
}
