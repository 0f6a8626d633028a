//! SMTP session state management

use crate::delivery::Envelope;
use crate::smtp::address::Address;
use crate::smtp::error::SmtpError;

/// Where a session stands in the current mail transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpState {
    /// No transaction in progress
    Ready,
    /// MAIL FROM accepted - ready for RCPT
    MailReceived,
    /// RCPT TO accepted - ready for DATA
    RecipientReceived,
}

/// Envelope state for a single connection.
///
/// `seen_mail`/`seen_rcpt` are derived from which paths are present, and a
/// forward path can only be stored after a reverse path, so a recipient
/// without a sender is unrepresentable.
#[derive(Debug, Default)]
pub struct SmtpSession {
    /// Sender address from MAIL FROM command
    reverse_path: Option<Address>,
    /// Recipient address from RCPT TO command. A later RCPT replaces it.
    forward_path: Option<Address>,
    /// Client domain from HELO command
    client_domain: Option<String>,
}

impl SmtpSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SmtpState {
        match (&self.reverse_path, &self.forward_path) {
            (Some(_), Some(_)) => SmtpState::RecipientReceived,
            (Some(_), None) => SmtpState::MailReceived,
            (None, _) => SmtpState::Ready,
        }
    }

    pub fn seen_mail(&self) -> bool {
        self.reverse_path.is_some()
    }

    pub fn seen_rcpt(&self) -> bool {
        self.forward_path.is_some()
    }

    pub fn reverse_path(&self) -> Option<&Address> {
        self.reverse_path.as_ref()
    }

    pub fn forward_path(&self) -> Option<&Address> {
        self.forward_path.as_ref()
    }

    /// Clear the envelope. HELO information is kept.
    pub fn reset_envelope(&mut self) {
        self.reverse_path = None;
        self.forward_path = None;
    }

    /// Domain the client gave in its last HELO
    pub fn client_domain(&self) -> Option<&str> {
        self.client_domain.as_deref()
    }

    /// Record the client's HELO domain
    pub fn set_client_domain(&mut self, domain: String) {
        self.client_domain = Some(domain);
    }

    /// Start a new envelope with the given sender
    pub fn set_reverse_path(&mut self, sender: Address) {
        self.reset_envelope();
        self.reverse_path = Some(sender);
    }

    /// Set the recipient; requires a sender first
    pub fn set_forward_path(&mut self, recipient: Address) -> Result<(), SmtpError> {
        if !self.seen_mail() {
            return Err(SmtpError::SenderNotGiven);
        }

        self.forward_path = Some(recipient);
        Ok(())
    }

    /// Hand the completed envelope over with its body.
    ///
    /// The session is reset either way, so the same envelope can never be
    /// delivered twice.
    pub fn take_envelope(&mut self, body: String) -> Result<Envelope, SmtpError> {
        let reverse_path = self.reverse_path.take();
        let forward_path = self.forward_path.take();

        match (reverse_path, forward_path) {
            (Some(from), Some(to)) => Ok(Envelope::new(from, to, body)),
            _ => Err(SmtpError::RecipientNotGiven),
        }
    }
}
