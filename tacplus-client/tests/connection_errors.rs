use std::time::Duration;

use tacplus_client::client::{ClientConfigBuilder, PromptKind, SessionContextBuilder};
use tacplus_client::protocol::accounting::Opaque;
use tacplus_client::protocol::authentication::{Reply, ReplyFlags, Status};
use tacplus_client::protocol::{HeaderInfo, Packet, PacketFlags, PacketType};
use tacplus_client::ClientError;

mod common;

fn pass_reply() -> Reply {
    Reply::new(Status::Pass, ReplyFlags::empty(), String::new(), Vec::new())
}

#[tokio::test]
async fn timeout_then_late_reply_dropped() {
    let config = common::config_with_secret()
        .timeout(Duration::from_millis(100))
        .build();
    let (connection, mut server, dispatcher) = common::connect(config);

    let slow = tokio::spawn(
        connection
            .session(SessionContextBuilder::new().build())
            .authenticate_pap("slowpoke", "password"),
    );
    let slow_request = server.receive().await;

    let result = slow.await.expect("task should not panic");
    assert!(matches!(result, Err(ClientError::ExchangeTimeout(_))));

    // the timed-out exchange stays registered until something arrives for it
    assert_eq!(connection.pending_exchanges(), 1);
    server.reply(&slow_request, pass_reply()).await;

    // the connection keeps working; replies are handled in order, so the late one is gone by now
    let next = tokio::spawn(
        connection
            .session(SessionContextBuilder::new().build())
            .authenticate_pap("speedy", "password"),
    );
    let next_request = server.receive().await;
    server.reply(&next_request, pass_reply()).await;

    let response = next
        .await
        .expect("task should not panic")
        .expect("session after timeout should complete");
    assert!(response.passed());
    assert_eq!(connection.pending_exchanges(), 0);
    assert!(!dispatcher.is_finished());
}

#[tokio::test]
async fn corrupt_reply_fails_only_its_session() {
    let (connection, mut server, dispatcher) = common::connect(common::config_with_secret().build());

    let login = tokio::spawn(
        connection
            .session(SessionContextBuilder::new().build())
            .authenticate_pap("user", "password"),
    );
    let request = server.receive().await;

    // obfuscated with the wrong key, so the lengths come out as garbage
    let header = request
        .header()
        .next(request.header().version())
        .expect("sequence number should not be exhausted");
    let packet = Packet::new(
        header,
        Reply::new(
            Status::Pass,
            ReplyFlags::empty(),
            "this will not decode".to_owned(),
            Vec::new(),
        ),
    )
    .expect("reply should be valid");
    let bytes = server.encode(&packet, b"not the right key");
    server.send_raw(&bytes).await;

    let result = login.await.expect("task should not panic");
    assert!(matches!(result, Err(ClientError::CorruptPacket)));

    // framing stayed intact, so the connection is still usable
    assert!(!connection.is_closed());
    let retry = tokio::spawn(
        connection
            .session(SessionContextBuilder::new().build())
            .authenticate_pap("user", "password"),
    );
    let retry_request = server.receive().await;
    server.reply(&retry_request, pass_reply()).await;

    let response = retry
        .await
        .expect("task should not panic")
        .expect("retry should complete");
    assert!(response.passed());
    assert!(!dispatcher.is_finished());
}

#[tokio::test]
async fn malformed_header_fails_connection() {
    let (connection, mut server, dispatcher) = common::connect(common::config_with_secret().build());

    let login = tokio::spawn(
        connection
            .session(SessionContextBuilder::new().build())
            .authenticate_pap("user", "password"),
    );
    let _request = server.receive().await;

    server
        .send_raw(&[
            0x10, // major version 1 doesn't exist
            0x01, // authentication
            2,    // sequence number
            0x00, // no flags
            0, 0, 0, 0, // session id
            0, 0, 0, 0, // body length
        ])
        .await;

    let result = login.await.expect("task should not panic");
    assert!(matches!(result, Err(ClientError::MalformedHeader)));

    let dispatcher_result = dispatcher.await.expect("dispatcher should not panic");
    assert!(matches!(dispatcher_result, Err(ClientError::MalformedHeader)));
    assert!(connection.is_closed());

    // no new exchanges are accepted afterwards
    let after = connection
        .session(SessionContextBuilder::new().build())
        .authenticate_pap("user", "password")
        .await;
    assert!(matches!(after, Err(ClientError::ConnectionClosed)));
}

#[tokio::test]
async fn accounting_reply_is_unsupported() {
    let (connection, mut server, dispatcher) = common::connect(common::config_with_secret().build());

    let login = tokio::spawn(
        connection
            .session(SessionContextBuilder::new().build())
            .authenticate_pap("user", "password"),
    );
    let request = server.receive().await;

    let header = HeaderInfo::new(
        request.header().version(),
        PacketType::Accounting,
        2,
        request.header().flags(),
        request.header().session_id(),
    );
    server
        .reply_with_header(header, Opaque::new(vec![0, 0, 0, 0, 1]))
        .await;

    let result = login.await.expect("task should not panic");
    assert!(matches!(
        result,
        Err(ClientError::UnsupportedPacketType(PacketType::Accounting))
    ));

    let dispatcher_result = dispatcher.await.expect("dispatcher should not panic");
    assert!(matches!(
        dispatcher_result,
        Err(ClientError::UnsupportedPacketType(PacketType::Accounting))
    ));
}

#[tokio::test]
async fn reply_with_wrong_sequence_number() {
    let (connection, mut server, _) = common::connect(common::config_with_secret().build());

    let login = tokio::spawn(
        connection
            .session(SessionContextBuilder::new().build())
            .authenticate_pap("user", "password"),
    );
    let request = server.receive().await;

    let header = HeaderInfo::new(
        request.header().version(),
        PacketType::Authentication,
        4,
        request.header().flags(),
        request.header().session_id(),
    );
    server.reply_with_header(header, pass_reply()).await;

    let result = login.await.expect("task should not panic");
    assert!(matches!(
        result,
        Err(ClientError::SequenceMismatch {
            expected: 2,
            actual: 4
        })
    ));
}

#[tokio::test]
async fn server_hang_up_fails_pending_exchanges() {
    let (connection, mut server, dispatcher) = common::connect(common::config_with_secret().build());

    let login = tokio::spawn(
        connection
            .session(SessionContextBuilder::new().build())
            .authenticate_pap("user", "password"),
    );
    let _request = server.receive().await;
    server.hang_up();

    let result = login.await.expect("task should not panic");
    assert!(matches!(result, Err(ClientError::ConnectionClosed)));

    dispatcher
        .await
        .expect("dispatcher should not panic")
        .expect("clean end of stream is not an error");
    assert!(connection.is_closed());
}

#[tokio::test]
async fn local_close_fails_pending_exchanges() {
    let (connection, mut server, _) = common::connect(common::config_with_secret().build());

    let login = tokio::spawn(
        connection
            .session(SessionContextBuilder::new().build())
            .authenticate_pap("user", "password"),
    );
    let _request = server.receive().await;

    connection.close().await.expect("close should succeed");

    let result = login.await.expect("task should not panic");
    assert!(matches!(result, Err(ClientError::ConnectionClosed)));
    assert!(connection.is_closed());
}

#[tokio::test]
async fn plaintext_reply_rejected_when_secret_configured() {
    let (connection, mut server, dispatcher) =
        common::connect(common::config_with_secret().build());

    let context = SessionContextBuilder::new()
        .prompt(|_: &str, _: bool, _: PromptKind| Some("hunter2".to_owned()))
        .build();
    let login = tokio::spawn(connection.session(context).authenticate_ascii());

    let start = server.receive().await;
    let plaintext_header = HeaderInfo::new(
        start.header().version(),
        PacketType::Authentication,
        2,
        PacketFlags::SINGLE_CONNECTION | PacketFlags::UNENCRYPTED,
        start.header().session_id(),
    );
    server
        .reply_with_header(
            plaintext_header,
            Reply::new(
                Status::GetPassword,
                ReplyFlags::NO_ECHO,
                "Password: ".to_owned(),
                Vec::new(),
            ),
        )
        .await;

    let result = login.await.expect("task should not panic");
    assert!(
        matches!(result, Err(ClientError::CorruptPacket)),
        "unexpected result: {result:?}"
    );
    assert!(!dispatcher.is_finished());
    assert!(!connection.single_connect_established());

    // the password must never have been sent
    connection.close().await.expect("close should succeed");
    server.assert_no_more_requests().await;
}

#[tokio::test]
async fn obfuscated_reply_rejected_when_unencrypted() {
    let (connection, mut server, dispatcher) = common::connect(ClientConfigBuilder::new().build());

    let login = tokio::spawn(
        connection
            .session(SessionContextBuilder::new().build())
            .authenticate_pap("someuser", "password"),
    );

    let request = server.receive().await;
    let obfuscated_header = HeaderInfo::new(
        request.header().version(),
        PacketType::Authentication,
        2,
        PacketFlags::empty(),
        request.header().session_id(),
    );
    server.reply_with_header(obfuscated_header, pass_reply()).await;

    let result = login.await.expect("task should not panic");
    assert!(
        matches!(result, Err(ClientError::CorruptPacket)),
        "unexpected result: {result:?}"
    );
    assert!(!dispatcher.is_finished());
}
