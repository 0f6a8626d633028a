//! Chooses between local delivery and relaying for a completed envelope

use std::sync::Arc;

use tracing::warn;

use crate::config::ServerConfig;
use crate::delivery::dns::MxResolver;
use crate::delivery::envelope::Envelope;
use crate::delivery::error::DeliveryError;
use crate::delivery::mailbox::MailboxWriter;
use crate::delivery::relay::RelayClient;
use crate::smtp::reply::Reply;

/// Where an envelope is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Append to a mailbox file in the mailbox directory
    Local,
    /// Forward to the recipient domain's mail exchanger
    Relay,
}

#[derive(Clone)]
pub struct DeliveryRouter {
    local_domain: String,
    mailbox: MailboxWriter,
    relay: RelayClient,
}

impl DeliveryRouter {
    pub fn new(config: &ServerConfig, resolver: Arc<dyn MxResolver>) -> Self {
        Self {
            local_domain: config.local_domain.clone(),
            mailbox: MailboxWriter::new(config.mailbox_dir.clone()),
            relay: RelayClient::new(&config.hostname, config.relay_port, resolver),
        }
    }

    /// Local when the recipient domain equals the configured local domain,
    /// compared ASCII case-insensitively (`c@LOCALHOST` is local for the
    /// default `localhost`). Everything else is relayed.
    pub fn route(&self, envelope: &Envelope) -> Route {
        if envelope.forward_path.is_in_domain(&self.local_domain) {
            Route::Local
        } else {
            Route::Relay
        }
    }

    /// Deliver exactly once along the chosen route. Failures are final.
    pub fn deliver(&self, envelope: &Envelope) -> Result<Route, DeliveryError> {
        let route = self.route(envelope);
        match route {
            Route::Local => {
                self.mailbox.append(envelope)?;
            }
            Route::Relay => self.relay.relay(envelope)?,
        }
        Ok(route)
    }

    /// Deliver and turn the outcome into the reply for the end of DATA
    pub fn deliver_reply(&self, envelope: &Envelope) -> Reply {
        match self.deliver(envelope) {
            Ok(_) => Reply::ok(),
            Err(e) => {
                warn!(
                    from = %envelope.reverse_path,
                    to = %envelope.forward_path,
                    "delivery failed: {e}"
                );
                e.to_reply()
            }
        }
    }
}
