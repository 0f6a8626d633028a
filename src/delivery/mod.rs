//! Delivery pipeline: local mailboxes and relaying to remote exchangers

pub mod dns;
pub mod envelope;
pub mod error;
pub mod mailbox;
pub mod relay;
pub mod router;

pub use dns::{HickoryMxResolver, MxResolver};
pub use envelope::Envelope;
pub use error::{DeliveryError, DnsError, MailboxError, RelayError};
pub use mailbox::MailboxWriter;
pub use relay::RelayClient;
pub use router::{DeliveryRouter, Route};
