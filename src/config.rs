//! Process-wide configuration, fixed once the server starts

use std::path::PathBuf;

/// The standard SMTP port used when relaying
pub const SMTP_PORT: u16 = 25;

/// Settings shared read-only by every connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Our fully-qualified hostname, used in the greeting, QUIT reply and
    /// relay HELO
    pub hostname: String,
    /// Recipient domain delivered to local mailboxes; everything else is relayed
    pub local_domain: String,
    /// Directory holding one mailbox file per local recipient
    pub mailbox_dir: PathBuf,
    /// Port the relay client connects to on the mail exchanger
    pub relay_port: u16,
}

impl ServerConfig {
    pub fn new(hostname: &str) -> Self {
        Self {
            hostname: hostname.to_owned(),
            local_domain: "localhost".to_owned(),
            mailbox_dir: PathBuf::from("."),
            relay_port: SMTP_PORT,
        }
    }

    pub fn with_local_domain(mut self, domain: &str) -> Self {
        self.local_domain = domain.to_owned();
        self
    }

    pub fn with_mailbox_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.mailbox_dir = dir.into();
        self
    }

    pub fn with_relay_port(mut self, port: u16) -> Self {
        self.relay_port = port;
        self
    }
}
