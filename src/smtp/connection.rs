//! The per-connection command loop

use std::io::{self, BufRead, Write};

use tracing::{debug, trace};

use crate::config::ServerConfig;
use crate::delivery::DeliveryRouter;
use crate::smtp::commands::{Action, CommandHandler};
use crate::smtp::error::SmtpError;
use crate::smtp::reader::LineReader;
use crate::smtp::reply::Reply;
use crate::smtp::session::SmtpSession;

/// Drives one client from greeting to QUIT (or disconnect).
///
/// Owns the session state exclusively; nothing here is shared with other
/// connections except the read-only config and router.
pub struct Connection<'a, R, W> {
    reader: LineReader<R>,
    writer: W,
    handler: CommandHandler<'a>,
    router: &'a DeliveryRouter,
    session: SmtpSession,
    hostname: &'a str,
}

impl<'a, R: BufRead, W: Write> Connection<'a, R, W> {
    pub fn new(reader: R, writer: W, config: &'a ServerConfig, router: &'a DeliveryRouter) -> Self {
        Self {
            reader: LineReader::new(reader),
            writer,
            handler: CommandHandler::new(config),
            router,
            session: SmtpSession::new(),
            hostname: &config.hostname,
        }
    }

    /// Run until QUIT or until the client goes away.
    ///
    /// Protocol and delivery errors are answered and the loop continues; only
    /// transport errors are returned.
    pub fn run(&mut self) -> Result<(), SmtpError> {
        self.send(&Reply::greeting(self.hostname))?;

        loop {
            let Some(line) = self.reader.read_line()? else {
                debug!("client closed connection");
                return Ok(());
            };

            match self.handler.process_command(&line, &mut self.session) {
                Ok(Action::Reply(reply)) => self.send(&reply)?,
                Ok(Action::StartData(reply)) => {
                    self.send(&reply)?;
                    self.receive_message()?;
                }
                Ok(Action::Quit(reply)) => {
                    self.send(&reply)?;
                    return Ok(());
                }
                Err(e) if !e.is_recoverable() => return Err(e),
                Err(e) => {
                    debug!("rejected command: {e}");
                    self.send(&e.to_reply())?;
                }
            }
        }
    }

    /// Collect the body, deliver it, and report the outcome.
    ///
    /// The envelope is consumed whatever happens, so a bare DATA afterwards
    /// is rejected until a new MAIL/RCPT pair is given.
    fn receive_message(&mut self) -> Result<(), SmtpError> {
        let body = match self.reader.message().collect_body() {
            Ok(body) => body,
            Err(e) => {
                self.session.reset_envelope();
                return Err(match e.kind() {
                    io::ErrorKind::UnexpectedEof => SmtpError::ConnectionClosed,
                    _ => SmtpError::Io(e),
                });
            }
        };

        let reply = match self.session.take_envelope(body) {
            Ok(envelope) => {
                debug!(
                    helo = ?self.session.client_domain(),
                    from = %envelope.reverse_path,
                    to = %envelope.forward_path,
                    bytes = envelope.body_size(),
                    "message received"
                );
                self.router.deliver_reply(&envelope)
            }
            Err(e) => e.to_reply(),
        };

        self.send(&reply)
    }

    fn send(&mut self, reply: &Reply) -> Result<(), SmtpError> {
        trace!(">> {reply}");
        self.writer.write_all(reply.format().as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}
