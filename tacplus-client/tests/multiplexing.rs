use tacplus_client::client::SessionContextBuilder;
use tacplus_client::protocol::authentication::{Reply, ReplyFlags, Status};
use tacplus_client::protocol::{Body, Packet};

mod common;

fn start_user(packet: &Packet) -> String {
    match packet.body() {
        Body::AuthenticationStart(start) => start.user_information().user().to_owned(),
        other => panic!("expected authentication start, got {other:?}"),
    }
}

fn reply(status: Status, message: &str) -> Reply {
    Reply::new(status, ReplyFlags::empty(), message.to_owned(), Vec::new())
}

#[tokio::test]
async fn replies_routed_by_session_id() {
    let (connection, mut server, _) = common::connect(common::config_with_secret().build());

    let context = SessionContextBuilder::new().build();
    let session_a = connection.session(context.clone());
    let session_b = connection.session(context);
    assert_ne!(session_a.session_id(), session_b.session_id());

    let login_a = tokio::spawn(session_a.authenticate_pap("alice", "alice's password"));
    let login_b = tokio::spawn(session_b.authenticate_pap("bob", "bob's password"));

    // spawned tasks may write in either order
    let first = server.receive().await;
    let second = server.receive().await;
    let (request_a, request_b) = if start_user(&first) == "alice" {
        (first, second)
    } else {
        (second, first)
    };
    assert_eq!(start_user(&request_b), "bob");

    server
        .reply(&request_b, reply(Status::Fail, "bob denied"))
        .await;

    let response_b = login_b
        .await
        .expect("task should not panic")
        .expect("bob's session should complete");
    assert_eq!(response_b.status, Status::Fail);
    assert_eq!(response_b.server_message, "bob denied");

    // alice's exchange is unaffected by bob's reply
    assert!(!login_a.is_finished());
    assert_eq!(connection.pending_exchanges(), 1);

    server
        .reply(&request_a, reply(Status::Pass, "alice welcome"))
        .await;

    let response_a = login_a
        .await
        .expect("task should not panic")
        .expect("alice's session should complete");
    assert!(response_a.passed());
    assert_eq!(response_a.server_message, "alice welcome");
    assert_eq!(connection.pending_exchanges(), 0);
}

#[tokio::test]
async fn sessions_reuse_connection_sequentially() {
    let (connection, mut server, _) = common::connect(common::config_with_secret().build());

    for user in ["first", "second", "third"] {
        let login = tokio::spawn(
            connection
                .session(SessionContextBuilder::new().build())
                .authenticate_pap(user, "password"),
        );

        let request = server.receive().await;
        assert_eq!(start_user(&request), user);
        server.reply(&request, reply(Status::Pass, "")).await;

        let response = login
            .await
            .expect("task should not panic")
            .expect("session should complete");
        assert!(response.passed());
    }

    assert!(connection.single_connect_established());
    assert!(!connection.is_closed());
}
