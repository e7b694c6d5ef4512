use tacplus_protocol::authentication::Status;

/// The kind of input a server asked for during an authentication session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// Domain-specific data (`GETDATA`).
    Data,

    /// A username (`GETUSER`).
    User,

    /// A password (`GETPASS`).
    Password,
}

impl PromptKind {
    /// The prompt requested by a reply status, or `None` if the status ends the session.
    pub(super) fn for_status(status: Status) -> Option<Self> {
        match status {
            Status::GetData => Some(Self::Data),
            Status::GetUser => Some(Self::User),
            Status::GetPassword => Some(Self::Password),
            _ => None,
        }
    }
}

/// Something that can gather input from the user on behalf of an authentication session.
///
/// The collector is called from within the session's future, so it should not block for
/// long on a single-threaded executor.
///
/// Any `Fn(&str, bool, PromptKind) -> Option<String>` closure is a collector:
///
/// ```
/// use tacplus_client::client::{PromptKind, SessionContextBuilder};
///
/// let context = SessionContextBuilder::new()
///     .prompt(|_prompt: &str, _no_echo: bool, kind: PromptKind| match kind {
///         PromptKind::User => Some("alice".to_owned()),
///         PromptKind::Password => Some("secret".to_owned()),
///         PromptKind::Data => None,
///     })
///     .build();
/// ```
pub trait PromptCollector: Send + Sync {
    /// Asks the user for input, displaying `prompt` (the server's message).
    ///
    /// `no_echo` is set when the input must not be echoed back, e.g. for passwords.
    /// Returning `None` indicates no input could be obtained, which fails the session.
    fn collect(&self, prompt: &str, no_echo: bool, kind: PromptKind) -> Option<String>;
}

impl<F> PromptCollector for F
where
    F: Fn(&str, bool, PromptKind) -> Option<String> + Send + Sync,
{
    fn collect(&self, prompt: &str, no_echo: bool, kind: PromptKind) -> Option<String> {
        self(prompt, no_echo, kind)
    }
}
