//! Implementation of SMTP commands

use tracing::debug;

use crate::config::ServerConfig;
use crate::smtp::address::Address;
use crate::smtp::error::SmtpError;
use crate::smtp::reply::Reply;
use crate::smtp::session::SmtpSession;

/// The command verbs understood by the server. Verbs are case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `HELO` or `EHLO`
    Helo,
    Mail,
    Rcpt,
    Data,
    Rset,
    Noop,
    Quit,
    Unknown,
}

impl Command {
    /// Split a line into its command and the raw argument tail
    pub fn parse(line: &str) -> (Self, &str) {
        let line = line.trim();
        let (verb, argument) = match line.split_once(char::is_whitespace) {
            Some((verb, argument)) => (verb, argument.trim()),
            None => (line, ""),
        };

        let command = match verb {
            "HELO" | "EHLO" => Command::Helo,
            "MAIL" => Command::Mail,
            "RCPT" => Command::Rcpt,
            "DATA" => Command::Data,
            "RSET" => Command::Rset,
            "NOOP" => Command::Noop,
            "QUIT" => Command::Quit,
            _ => Command::Unknown,
        };

        (command, argument)
    }
}

/// What the connection should do after a command has been handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send the reply and wait for the next command
    Reply(Reply),
    /// Send the reply, then read the message body
    StartData(Reply),
    /// Send the reply and close the connection
    Quit(Reply),
}

/// Handles SMTP commands and returns the action to take
#[derive(Debug)]
pub struct CommandHandler<'a> {
    hostname: &'a str,
    local_domain: &'a str,
}

impl<'a> CommandHandler<'a> {
    pub fn new(config: &'a ServerConfig) -> Self {
        Self {
            hostname: &config.hostname,
            local_domain: &config.local_domain,
        }
    }

    /// Process a command line against the session
    pub fn process_command(
        &self,
        command_line: &str,
        session: &mut SmtpSession,
    ) -> Result<Action, SmtpError> {
        let (command, argument) = Command::parse(command_line);
        debug!(?command, argument, state = ?session.state(), "handling command");

        match command {
            Command::Helo => self.handle_helo(argument, session),
            Command::Mail => self.handle_mail(argument, session),
            Command::Rcpt => self.handle_rcpt(argument, session),
            Command::Data => self.handle_data(session),
            Command::Rset => {
                session.reset_envelope();
                Ok(Action::Reply(Reply::reset_ok()))
            }
            Command::Noop => Ok(Action::Reply(Reply::ok())),
            Command::Quit => Ok(Action::Quit(Reply::closing(self.hostname))),
            Command::Unknown => Err(SmtpError::UnrecognizedCommand),
        }
    }

    fn handle_helo(&self, argument: &str, session: &mut SmtpSession) -> Result<Action, SmtpError> {
        if argument.is_empty() {
            return Err(SmtpError::MissingArgument);
        }

        session.set_client_domain(argument.to_string());
        Ok(Action::Reply(Reply::hello(argument)))
    }

    /// MAIL always abandons the current envelope, even when malformed
    fn handle_mail(&self, argument: &str, session: &mut SmtpSession) -> Result<Action, SmtpError> {
        session.reset_envelope();

        let sender = Address::parse_path(argument, "FROM:").map_err(SmtpError::ReversePath)?;
        debug!(%sender, "setting reverse path");
        session.set_reverse_path(sender);

        Ok(Action::Reply(Reply::reverse_path_ok()))
    }

    fn handle_rcpt(&self, argument: &str, session: &mut SmtpSession) -> Result<Action, SmtpError> {
        if !session.seen_mail() {
            return Err(SmtpError::SenderNotGiven);
        }

        let recipient = Address::parse_path(argument, "TO:").map_err(SmtpError::ForwardPath)?;
        let local = recipient.is_in_domain(self.local_domain);
        debug!(%recipient, local, "setting forward path");
        session.set_forward_path(recipient)?;

        Ok(Action::Reply(if local {
            Reply::forward_path_ok()
        } else {
            Reply::forward_path_not_local()
        }))
    }

    fn handle_data(&self, session: &SmtpSession) -> Result<Action, SmtpError> {
        if !session.seen_rcpt() {
            return Err(SmtpError::RecipientNotGiven);
        }

        Ok(Action::StartData(Reply::data_start()))
    }
}
