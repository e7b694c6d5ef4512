use std::fmt;
use std::sync::Arc;

use tacplus_protocol::{AuthenticationService, PrivilegeLevel};

use super::prompt::PromptCollector;

/// Some information associated with all sessions, regardless of the action.
#[derive(Clone)]
pub struct SessionContext {
    pub(super) port: String,
    pub(super) remote_address: String,
    pub(super) privilege_level: PrivilegeLevel,
    pub(super) service: AuthenticationService,
    pub(super) prompt: Option<Arc<dyn PromptCollector>>,
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("port", &self.port)
            .field("remote_address", &self.remote_address)
            .field("privilege_level", &self.privilege_level)
            .field("service", &self.service)
            .field("prompt", &self.prompt.is_some())
            .finish()
    }
}

/// Builder for [`SessionContext`] objects.
pub struct SessionContextBuilder {
    port: String,
    remote_address: String,
    privilege_level: PrivilegeLevel,
    service: AuthenticationService,
    prompt: Option<Arc<dyn PromptCollector>>,
}

impl Default for SessionContextBuilder {
    fn default() -> Self {
        Self {
            port: String::from("rust_client"),
            remote_address: String::from("tacplus_client"),
            privilege_level: Default::default(),
            service: AuthenticationService::Login,
            prompt: None,
        }
    }
}

impl SessionContextBuilder {
    /// Creates a new builder with default values for the various fields.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the port label of the resulting context, e.g. `tty0`.
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    /// Sets the remote address of the resulting context.
    pub fn remote_address(mut self, remote_address: impl Into<String>) -> Self {
        self.remote_address = remote_address.into();
        self
    }

    /// Sets the privilege level of the resulting context.
    pub fn privilege_level(mut self, privilege_level: PrivilegeLevel) -> Self {
        self.privilege_level = privilege_level;
        self
    }

    /// Sets the authentication service reported in authentication requests.
    pub fn service(mut self, service: AuthenticationService) -> Self {
        self.service = service;
        self
    }

    /// Sets the collector used to answer server prompts during ASCII authentication.
    pub fn prompt(mut self, collector: impl PromptCollector + 'static) -> Self {
        self.prompt = Some(Arc::new(collector));
        self
    }

    /// Consumes this builder and turns it into a [`SessionContext`].
    pub fn build(self) -> SessionContext {
        SessionContext {
            port: self.port,
            remote_address: self.remote_address,
            privilege_level: self.privilege_level,
            service: self.service,
            prompt: self.prompt,
        }
    }
}
