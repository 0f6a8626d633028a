//! Error types for the SMTP server

use thiserror::Error;

use crate::smtp::address::AddressError;
use crate::smtp::reply::Reply;

#[derive(Error, Debug)]
pub enum SmtpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unrecognized command")]
    UnrecognizedCommand,

    #[error("missing argument(s)")]
    MissingArgument,

    #[error("reverse path not well-formed: {0}")]
    ReversePath(AddressError),

    #[error("forward path not well-formed: {0}")]
    ForwardPath(AddressError),

    #[error("sender info not yet given")]
    SenderNotGiven,

    #[error("valid RCPT must precede DATA")]
    RecipientNotGiven,

    #[error("connection closed unexpectedly")]
    ConnectionClosed,
}

/// Maps SMTP errors to the reply sent to the client
impl SmtpError {
    pub fn to_reply(&self) -> Reply {
        match self {
            SmtpError::Io(_) | SmtpError::ConnectionClosed => {
                Reply::new(421, "service not available, closing transmission channel")
            }
            SmtpError::UnrecognizedCommand => Reply::new(500, "unrecognized command"),
            SmtpError::MissingArgument => Reply::new(501, "missing argument(s)"),
            SmtpError::ReversePath(_) => Reply::new(501, "reverse path not well-formed"),
            SmtpError::ForwardPath(_) => Reply::new(501, "forward path not well-formed"),
            SmtpError::SenderNotGiven => Reply::new(503, "sender info not yet given"),
            SmtpError::RecipientNotGiven => Reply::new(503, "valid RCPT must precede DATA"),
        }
    }

    /// Whether the session can carry on after reporting this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SmtpError::Io(_) | SmtpError::ConnectionClosed)
    }
}
