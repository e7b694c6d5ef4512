//! An asynchronous, runtime-independent RFC8907 TACACS+ client.
//!
//! Many authentication/authorization sessions can share a single connection: each request is
//! correlated with its reply by session id, so replies may arrive in any order. Reply timeouts
//! are measured with `tokio`'s timer, so a Tokio runtime must be running; the stream itself can
//! be any [`futures::AsyncRead`] + [`futures::AsyncWrite`].
//!
//! # Examples
//!
//! ```no_run
//! use tokio::net::TcpStream;
//! use tokio_util::compat::TokioAsyncReadCompatExt;
//!
//! use tacplus_client::client::{ClientConfigBuilder, Connection, SessionContextBuilder};
//!
//! # async fn login() -> Result<(), Box<dyn std::error::Error>> {
//! let stream = TcpStream::connect("localhost:49").await?.compat();
//! let config = ClientConfigBuilder::new().secret("very secret key").build();
//!
//! let (connection, dispatcher) = Connection::new(stream, config);
//! tokio::spawn(dispatcher.run());
//!
//! let session = connection.session(SessionContextBuilder::new().build());
//! let response = session.authenticate_pap("someuser", "hunter2").await?;
//! assert!(response.passed());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod client;
pub use client::{ClientError, Connection, Session};

pub use tacplus_protocol as protocol;
pub use tacplus_protocol::{
    Argument, AuthenticationMethod, AuthenticationService, AuthenticationType, PrivilegeLevel,
};
