use tacplus_protocol::{authentication, authorization, Argument};

/// A server response from an authentication session.
#[must_use = "At the very least, the authentication status must be checked, as an authentication failure is not reported as an error."]
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AuthenticationResponse {
    /// The status of the final reply in the session.
    pub status: authentication::Status,

    /// The message returned by the server, intended to be displayed to the user.
    pub server_message: String,

    /// Extra data returned by the server.
    pub data: Vec<u8>,

    /// Whether the server asked for user input not to be echoed.
    pub no_echo: bool,
}

impl AuthenticationResponse {
    /// Whether the authentication passed.
    ///
    /// Every status besides [`Pass`](authentication::Status::Pass) is a failure, including
    /// `RESTART`, `FOLLOW` & unknown statuses; inspect [`status`](Self::status) to tell them apart.
    pub fn passed(&self) -> bool {
        self.status == authentication::Status::Pass
    }
}

impl From<authentication::Reply> for AuthenticationResponse {
    fn from(reply: authentication::Reply) -> Self {
        Self {
            status: reply.status(),
            server_message: reply.server_message().to_owned(),
            data: reply.data().to_vec(),
            no_echo: reply.no_echo(),
        }
    }
}

/// A server response to an authorization request.
#[must_use = "The authorization status must be checked, as a denial is not reported as an error."]
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AuthorizationResponse {
    /// The status returned by the server.
    pub status: authorization::Status,

    /// The message returned by the server, intended to be displayed to the user.
    pub server_message: String,

    /// Administrative/log data returned by the server.
    pub data: Vec<u8>,

    /// Arguments returned by the server, to be added to or to replace the requested ones.
    pub arguments: Vec<Argument>,
}

impl AuthorizationResponse {
    /// Whether authorization was granted, with or without argument replacement.
    pub fn passed(&self) -> bool {
        self.status.is_pass()
    }
}

impl From<authorization::Reply> for AuthorizationResponse {
    fn from(reply: authorization::Reply) -> Self {
        Self {
            status: reply.status(),
            server_message: reply.server_message().clone(),
            data: reply.data().clone(),
            arguments: reply.arguments().clone(),
        }
    }
}
