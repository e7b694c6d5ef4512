use alloc::string::ToString;
use alloc::vec;

use super::*;
use crate::{AuthenticationService, PrivilegeLevel};

fn pap_context() -> AuthenticationContext {
    AuthenticationContext {
        privilege_level: PrivilegeLevel::new(3).expect("privilege level 3 should be valid"),
        authentication_type: AuthenticationType::Pap,
        service: AuthenticationService::Ppp,
    }
}

#[test]
fn serialize_authentication_start_no_data() {
    let start_body = Start::new(
        Action::Login,
        pap_context(),
        UserInformation::new("authtest", "serial", "serial"),
        vec![],
    )
    .expect("start construction should have succeeded");

    assert_eq!(start_body.wire_size(), 28);

    let mut buffer = [0xffu8; 28];
    start_body
        .serialize_into_buffer(&mut buffer)
        .expect("buffer should be large enough to accommodate start packet");

    assert_eq!(
        buffer,
        [
            0x01, // action: login
            3,    // privilege level
            0x02, // authentication type: PAP
            0x03, // authentication service: PPP
            8,    // user length
            6,    // port length
            6,    // remote address length
            0,    // data length (0 since there's no data)
            0x61, 0x75, 0x74, 0x68, 0x74, 0x65, 0x73, 0x74, // user: authtest
            0x73, 0x65, 0x72, 0x69, 0x61, 0x6c, // port: serial
            0x73, 0x65, 0x72, 0x69, 0x61, 0x6c, // remote address: serial
        ]
    );
}

#[test]
fn serialize_authentication_start_with_data() {
    let start_body = Start::new(
        Action::ChangePassword,
        AuthenticationContext {
            privilege_level: PrivilegeLevel::new(4).expect("privilege level 4 should be valid"),
            authentication_type: AuthenticationType::MsChap,
            service: AuthenticationService::X25,
        },
        UserInformation::new("authtest2", "49", "10.0.2.24"),
        b"pass".to_vec(),
    )
    .expect("start construction should have succeeded");

    let mut buffer = [0xff; 40];
    let written = start_body
        .serialize_into_buffer(&mut buffer)
        .expect("buffer should be long enough");

    assert_eq!(
        buffer[..written],
        [
            0x02, // action: change password
            4,    // privilege level
            0x05, // authentication type: MSCHAP
            0x07, // authentication service: X25
            9,    // user length
            2,    // port length
            9,    // remote address length
            4,    // data length
            0x61, 0x75, 0x74, 0x68, 0x74, 0x65, 0x73, 0x74, 0x32, // user: authtest2
            0x34, 0x39, // port: 49
            0x31, 0x30, 0x2e, 0x30, 0x2e, 0x32, 0x2e, 0x32, 0x34, // remote address
            0x70, 0x61, 0x73, 0x73, // data: pass
        ]
    );
}

#[test]
fn start_long_data_truncated() {
    let start_body = Start::new(
        Action::SendAuth,
        AuthenticationContext {
            privilege_level: PrivilegeLevel::new(5).expect("privilege level 5 should be valid"),
            authentication_type: AuthenticationType::Ascii,
            service: AuthenticationService::Nasi,
        },
        UserInformation::new("invalid", "theport", "somewhere"),
        vec![0x2a; 300],
    )
    .expect("start construction should have succeeded");

    let mut buffer = [0u8; 300];
    let written = start_body
        .serialize_into_buffer(&mut buffer)
        .expect("buffer should be long enough");

    assert_eq!(buffer[7], 255);
    assert_eq!(written, 8 + 7 + 7 + 9 + 255);
}

#[test]
fn start_not_set_authentication_type_rejected() {
    let start_body = Start::new(
        Action::Login,
        AuthenticationContext {
            privilege_level: PrivilegeLevel::default(),
            authentication_type: AuthenticationType::NotSet,
            service: AuthenticationService::Login,
        },
        UserInformation::default(),
        vec![],
    );

    assert!(start_body.is_none());
}

#[test]
fn start_buffer_too_small() {
    let start_body = Start::new(
        Action::Login,
        pap_context(),
        UserInformation::new("user", "tty0", "localhost"),
        b"password".to_vec(),
    )
    .expect("start construction should have succeeded");

    let mut buffer = [0u8; 10];
    assert_eq!(
        start_body.serialize_into_buffer(&mut buffer),
        Err(NotEnoughSpace(()))
    );
}

#[test]
fn deserialize_start_matches_serialized() {
    let start_body = Start::new(
        Action::Login,
        pap_context(),
        UserInformation::new("operator", "tty1", "192.0.2.7"),
        b"hunter2".to_vec(),
    )
    .expect("start construction should have succeeded");

    let mut buffer = [0u8; 64];
    let written = start_body
        .serialize_into_buffer(&mut buffer)
        .expect("buffer should be long enough");

    let parsed =
        Start::deserialize_from_buffer(&buffer[..written]).expect("start should be valid");
    assert_eq!(parsed, start_body);
    assert_eq!(parsed.user_information().user(), "operator");
    assert_eq!(parsed.data(), b"hunter2");
}

#[test]
fn serialize_continue_with_flags() {
    let continue_body = Continue::new("ad".to_string(), b"xyz".to_vec(), ContinueFlags::ABORT);
    assert!(continue_body.is_abort());

    let mut buffer = [0xffu8; 10];
    let written = continue_body
        .serialize_into_buffer(&mut buffer)
        .expect("buffer should be large enough");

    assert_eq!(written, 10);
    assert_eq!(
        buffer,
        [
            0, 2, // user message length
            0, 3,    // data length
            0x01, // flags: abort
            0x61, 0x64, // user message: ad
            0x78, 0x79, 0x7a, // data: xyz
        ]
    );
}

#[test]
fn continue_long_message_truncated() {
    let long_message = "m".repeat(70_000);
    let continue_body = Continue::new(long_message, vec![], ContinueFlags::empty());

    assert_eq!(continue_body.wire_size(), 5 + 65535);
}

#[test]
fn deserialize_continue() {
    let raw = [
        0, 4, // user message length
        0, 0,    // data length
        0x00, // no flags
        0x75, 0x73, 0x65, 0x72, // user message: user
    ];

    let continue_body = Continue::deserialize_from_buffer(&raw).expect("continue should be valid");
    assert_eq!(continue_body.user_message(), "user");
    assert!(continue_body.data().is_empty());
    assert!(!continue_body.is_abort());
}

#[test]
fn deserialize_reply_pass_both_data_fields() {
    let packet_data = [
        0x01, // status: pass
        0,    // no flags set
        0, 16, // server message length
        0, 4, // data length
        // server message: "login successful" (without quotes)
        0x6c, 0x6f, 0x67, 0x69, 0x6e, 0x20, 0x73, 0x75, 0x63, 0x63, 0x65, 0x73, 0x73, 0x66, 0x75,
        0x6c, // end server message
        0x12, 0x77, 0xfa, 0xcc, // data: some random bytes for good measure
    ];

    let reply = Reply::deserialize_from_buffer(&packet_data).expect("packet should be valid");

    assert_eq!(reply.status(), Status::Pass);
    assert_eq!(reply.server_message(), "login successful");
    assert_eq!(reply.data(), [0x12, 0x77, 0xfa, 0xcc]);
    assert!(!reply.no_echo());
}

#[test]
fn deserialize_reply_get_password_no_echo() {
    let packet_data = [
        0x05, // status: get password
        0x01, // no echo flag set
        0, 9, // server message length
        0, 0, // data length
        0x50, 0x61, 0x73, 0x73, 0x77, 0x6f, 0x72, 0x64, 0x3a, // server message: "Password:"
    ];

    let reply = Reply::deserialize_from_buffer(&packet_data).expect("packet should be valid");

    assert_eq!(reply.status(), Status::GetPassword);
    assert_eq!(reply.server_message(), "Password:");
    assert!(reply.no_echo());
}

#[test]
fn deserialize_reply_unknown_status() {
    let packet_data = [
        0x42, // status: unassigned
        0,    // no flags
        0, 0, // server message length
        0, 0, // data length
    ];

    let reply = Reply::deserialize_from_buffer(&packet_data).expect("packet should be valid");
    assert_eq!(reply.status(), Status::Unknown(0x42));
    assert_eq!(u8::from(reply.status()), 0x42);
}

#[test]
fn deserialize_reply_bad_lengths() {
    // declared lengths claim more than the body holds
    let too_short = [
        0x02, // status: fail
        0,    // no flags
        0, 10, // server message length
        0, 0, // data length
        0x6e, 0x6f, // only two bytes of message
    ];
    assert_eq!(
        Reply::deserialize_from_buffer(&too_short),
        Err(DeserializeError::CorruptPacket)
    );

    // trailing bytes not covered by any length
    let too_long = [
        0x02, // status: fail
        0,    // no flags
        0, 0, // server message length
        0, 0, // data length
        0xde, 0xad,
    ];
    assert_eq!(
        Reply::deserialize_from_buffer(&too_long),
        Err(DeserializeError::CorruptPacket)
    );

    assert_eq!(
        Reply::deserialize_from_buffer(&[0x01, 0x00, 0x00]),
        Err(DeserializeError::CorruptPacket)
    );
}

#[test]
fn serialize_reply_matches_deserialized() {
    let reply = Reply::new(
        Status::GetUser,
        ReplyFlags::empty(),
        "Username:".to_string(),
        vec![],
    );

    let mut buffer = [0u8; 20];
    let written = reply
        .serialize_into_buffer(&mut buffer)
        .expect("buffer should be large enough");

    assert_eq!(written, 15);
    assert_eq!(buffer[..6], [0x04, 0x00, 0, 9, 0, 0]);
    assert_eq!(
        Reply::deserialize_from_buffer(&buffer[..written]),
        Ok(reply)
    );
}
