//! The completed envelope handed from a session to delivery

use chrono::{DateTime, Local};

use crate::smtp::address::Address;

/// A message with its sender and recipient.
///
/// Built once DATA has been received; delivery only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// The sender from MAIL FROM
    pub reverse_path: Address,

    /// The recipient from RCPT TO
    pub forward_path: Address,

    /// The raw message, one `\n`-terminated line per received line
    pub body: String,

    /// When the message was received by the server
    pub received: DateTime<Local>,
}

impl Envelope {
    pub fn new(reverse_path: Address, forward_path: Address, body: String) -> Self {
        Self {
            reverse_path,
            forward_path,
            body,
            received: Local::now(),
        }
    }

    /// Domain part of the recipient address
    pub fn recipient_domain(&self) -> &str {
        self.forward_path.domain()
    }

    /// Size of the body in bytes
    pub fn body_size(&self) -> usize {
        self.body.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_creation() {
        let envelope = Envelope::new(
            Address::parse("sender@example.com").unwrap(),
            Address::parse("user@remote.example").unwrap(),
            "Subject: Test\n\nHello\n".to_string(),
        );

        assert_eq!(envelope.reverse_path.as_str(), "sender@example.com");
        assert_eq!(envelope.recipient_domain(), "remote.example");
        assert_eq!(envelope.body_size(), 21);
        assert!(envelope.received <= Local::now());
    }
}
