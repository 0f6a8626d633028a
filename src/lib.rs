//! # tinymta
//!
//! tinymta is a minimal SMTP mail transfer agent.
//!
//! It accepts mail over plain SMTP, appends messages for the local domain to
//! per-user mailbox files, and relays everything else to the recipient
//! domain's mail exchanger.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tinymta::{HickoryMxResolver, ServerConfig, SmtpServer};
//!
//! let config = ServerConfig::new("mx.example.com")
//!     .with_local_domain("example.com")
//!     .with_mailbox_dir("/var/mail");
//! let resolver = HickoryMxResolver::from_system_conf().unwrap();
//!
//! let server = SmtpServer::new(config, Arc::new(resolver));
//! server.start("0.0.0.0:10001").unwrap();
//! ```
//!
//! ## Supported SMTP commands
//!
//! - `HELO` / `EHLO` - Identify the client
//! - `MAIL FROM` - Specify the sender's address
//! - `RCPT TO` - Specify the recipient (one per message; a later `RCPT`
//!   replaces the earlier one)
//! - `DATA` - Send the message body
//! - `RSET` - Reset the current transaction
//! - `NOOP` - Do nothing
//! - `QUIT` - Close connection
//!
//! ## Delivery
//!
//! When the body is complete the message is delivered exactly once, before
//! the reply to `DATA` is sent:
//!
//! - Recipients in the local domain get a `From `-separated entry appended
//!   to the file named after their local part in the mailbox directory.
//! - Other recipients are relayed over one SMTP conversation with the best
//!   MX host of their domain. There is no queue and no retry.
//!
//! ## Notes
//!
//! - Commands are case-sensitive (`HELO`, not `helo`).
//! - SMTP authentication, TLS and ESMTP extensions are not supported.
//! - Dot-stuffed lines are stored as received.

pub mod config;
pub mod delivery;
pub mod logging;
pub mod smtp;

pub use config::ServerConfig;
pub use delivery::{DeliveryError, DeliveryRouter, Envelope, HickoryMxResolver, MxResolver};
pub use smtp::{Reply, SmtpError, SmtpServer, SmtpSession, SmtpState};
