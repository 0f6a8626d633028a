//! Error types for local delivery and relaying

use std::io;

use thiserror::Error;

use crate::smtp::reply::Reply;

/// Errors that can occur while looking up a mail exchanger
#[derive(Error, Debug)]
pub enum DnsError {
    /// The domain has no usable MX record
    #[error("no mail exchanger for domain: {0}")]
    NoMailExchanger(String),

    /// The query itself failed
    #[error("MX lookup failed: {0}")]
    LookupFailed(#[from] hickory_resolver::error::ResolveError),
}

#[derive(Error, Debug)]
pub enum MailboxError {
    #[error("invalid mailbox name: {0:?}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error(transparent)]
    Dns(#[from] DnsError),

    #[error("failed to connect to {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("unexpected reply to {stage}: {reply}")]
    UnexpectedReply { stage: &'static str, reply: Reply },

    #[error("malformed reply: {0:?}")]
    MalformedReply(String),

    #[error("connection closed by remote server")]
    ConnectionClosed,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Why a message could not be delivered
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("local delivery failed: {0}")]
    Mailbox(#[from] MailboxError),

    #[error("relay failed: {0}")]
    Relay(#[from] RelayError),
}

impl DeliveryError {
    /// The reply a session sends for a failed delivery
    pub fn to_reply(&self) -> Reply {
        match self {
            DeliveryError::Mailbox(_) => Reply::new(451, "Local error in processing"),
            DeliveryError::Relay(_) => Reply::new(554, "unable to relay successfully"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_error_replies() {
        let local = DeliveryError::from(MailboxError::InvalidName("..".to_string()));
        assert_eq!(local.to_reply(), Reply::new(451, "Local error in processing"));

        let relay = DeliveryError::from(RelayError::ConnectionClosed);
        assert_eq!(relay.to_reply(), Reply::new(554, "unable to relay successfully"));
    }

    #[test]
    fn test_relay_error_display() {
        let err = RelayError::UnexpectedReply {
            stage: "RCPT TO",
            reply: Reply::new(550, "no such user"),
        };
        assert_eq!(err.to_string(), "unexpected reply to RCPT TO: 550 no such user");

        let err = RelayError::from(DnsError::NoMailExchanger("nowhere.invalid".to_string()));
        assert_eq!(err.to_string(), "no mail exchanger for domain: nowhere.invalid");
    }
}
