//! Outbound SMTP client used to relay messages for non-local recipients

use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::delivery::dns::MxResolver;
use crate::delivery::envelope::Envelope;
use crate::delivery::error::RelayError;
use crate::smtp::reader::LineReader;
use crate::smtp::reply::Reply;

/// Relays an envelope to the best mail exchanger of its recipient domain.
///
/// Each relay is one connection with no retries and no fallback exchanger.
/// Reads and writes block without a timeout.
#[derive(Clone)]
pub struct RelayClient {
    helo_name: String,
    port: u16,
    resolver: Arc<dyn MxResolver>,
}

impl RelayClient {
    pub fn new(helo_name: &str, port: u16, resolver: Arc<dyn MxResolver>) -> Self {
        Self {
            helo_name: helo_name.to_owned(),
            port,
            resolver,
        }
    }

    pub fn relay(&self, envelope: &Envelope) -> Result<(), RelayError> {
        let domain = envelope.recipient_domain();
        let exchanger = self.resolver.resolve_mx(domain)?;
        debug!(domain, %exchanger, port = self.port, "connecting to mail exchanger");

        let stream = TcpStream::connect((exchanger.as_str(), self.port)).map_err(|source| {
            RelayError::Connect {
                host: exchanger.clone(),
                source,
            }
        })?;
        let reader = BufReader::new(stream.try_clone()?);

        let mut conversation = Conversation::new(reader, &stream);
        let result = conversation.deliver(&self.helo_name, envelope);
        conversation.quit();
        let _ = stream.shutdown(Shutdown::Both);

        if result.is_ok() {
            info!(
                to = %envelope.forward_path,
                %exchanger,
                "relayed message"
            );
        }
        result
    }
}

/// The client side of one SMTP exchange
struct Conversation<R, W> {
    reader: LineReader<R>,
    writer: W,
}

impl<R: BufRead, W: Write> Conversation<R, W> {
    fn new(reader: R, writer: W) -> Self {
        Self {
            reader: LineReader::new(reader),
            writer,
        }
    }

    /// Run the conversation up to and including the end of DATA.
    ///
    /// Stops at the first reply whose code is not expected; the caller is
    /// responsible for sending QUIT either way.
    fn deliver(&mut self, helo_name: &str, envelope: &Envelope) -> Result<(), RelayError> {
        self.expect("greeting", &[220])?;
        self.command(&format!("HELO {helo_name}"), "HELO", &[250])?;
        self.command(
            &format!("MAIL FROM:<{}>", envelope.reverse_path),
            "MAIL FROM",
            &[250],
        )?;
        self.command(
            &format!("RCPT TO:<{}>", envelope.forward_path),
            "RCPT TO",
            &[250, 251],
        )?;
        self.command("DATA", "DATA", &[354])?;

        for line in envelope.body.lines() {
            self.writer.write_all(line.as_bytes())?;
            self.writer.write_all(b"\r\n")?;
        }
        self.writer.write_all(b".\r\n")?;
        self.writer.flush()?;
        trace!(">> <{} bytes of message data>", envelope.body.len());

        self.expect("end of data", &[250])?;
        Ok(())
    }

    /// Best effort; the connection is being dropped regardless
    fn quit(&mut self) {
        if let Err(e) = self.send("QUIT") {
            debug!("failed to send QUIT: {e}");
        }
    }

    fn command(
        &mut self,
        command: &str,
        stage: &'static str,
        expected: &[u16],
    ) -> Result<Reply, RelayError> {
        self.send(command)?;
        self.expect(stage, expected)
    }

    fn send(&mut self, command: &str) -> Result<(), RelayError> {
        trace!(">> {command}");
        self.writer.write_all(command.as_bytes())?;
        self.writer.write_all(b"\r\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn expect(&mut self, stage: &'static str, expected: &[u16]) -> Result<Reply, RelayError> {
        let reply = self.read_reply()?;
        if expected.contains(&reply.code) {
            Ok(reply)
        } else {
            Err(RelayError::UnexpectedReply { stage, reply })
        }
    }

    /// Read a complete, possibly multi-line, reply
    fn read_reply(&mut self) -> Result<Reply, RelayError> {
        loop {
            let line = self
                .reader
                .read_line()?
                .ok_or(RelayError::ConnectionClosed)?;

            match Reply::parse_line(&line) {
                Some((reply, true)) => return Ok(reply),
                Some((_, false)) => continue,
                None => return Err(RelayError::MalformedReply(line)),
            }
        }
    }
}
