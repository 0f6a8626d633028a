//! SMTP replies, both the ones we send and the ones we read from a relay peer

use std::fmt;

/// A single-line SMTP reply: a three digit code followed by text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// The SMTP reply code (e.g. 250, 354, 500)
    pub code: u16,
    /// The human-readable text
    pub text: String,
}

impl Reply {
    pub fn new(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }

    /// 250 OK
    pub fn ok() -> Self {
        Self::new(250, "OK")
    }

    /// 220, sent as soon as a connection is accepted
    pub fn greeting(hostname: &str) -> Self {
        Self::new(220, format!("{hostname} service ready"))
    }

    pub fn hello(client_domain: &str) -> Self {
        Self::new(250, format!("hello {client_domain}"))
    }

    pub fn reverse_path_ok() -> Self {
        Self::new(250, "reverse path ok")
    }

    pub fn forward_path_ok() -> Self {
        Self::new(250, "forward path ok")
    }

    pub fn forward_path_not_local() -> Self {
        Self::new(251, "recipient not local, will attempt to forward")
    }

    /// 354, the go-ahead for the message body
    pub fn data_start() -> Self {
        Self::new(354, "Start mail input; end with <CRLF>.<CRLF>")
    }

    pub fn reset_ok() -> Self {
        Self::new(250, "reset ok")
    }

    pub fn closing(hostname: &str) -> Self {
        Self::new(221, format!("{hostname} closing connection"))
    }

    /// Format the reply for sending over the wire
    pub fn format(&self) -> String {
        format!("{} {}\r\n", self.code, self.text)
    }

    /// Parse one line of a reply received from a remote server.
    ///
    /// Returns the reply and whether this is the final line; `250-...` marks
    /// a continuation and `250 ...` (or a bare `250`) the last line.
    pub fn parse_line(line: &str) -> Option<(Self, bool)> {
        let line = line.trim_end_matches(['\r', '\n']);
        let digits = line.get(..3)?;
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let code = digits.parse().ok()?;

        match line.as_bytes().get(3) {
            None => Some((Self::new(code, ""), true)),
            Some(b' ') => Some((Self::new(code, &line[4..]), true)),
            Some(b'-') => Some((Self::new(code, &line[4..]), false)),
            Some(_) => None,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_creation() {
        let reply = Reply::new(250, "OK");
        assert_eq!(reply.code, 250);
        assert_eq!(reply.text, "OK");
        assert_eq!(reply, Reply::ok());
    }

    #[test]
    fn test_greeting_and_closing() {
        assert_eq!(
            Reply::greeting("mx.test").format(),
            "220 mx.test service ready\r\n"
        );
        assert_eq!(
            Reply::closing("mx.test").format(),
            "221 mx.test closing connection\r\n"
        );
    }

    #[test]
    fn test_hello_reply() {
        assert_eq!(
            Reply::hello("client.example").to_string(),
            "250 hello client.example"
        );
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(
            Reply::parse_line("220 mx.remote ESMTP\r\n"),
            Some((Reply::new(220, "mx.remote ESMTP"), true))
        );
        assert_eq!(
            Reply::parse_line("250-PIPELINING"),
            Some((Reply::new(250, "PIPELINING"), false))
        );
        assert_eq!(Reply::parse_line("354"), Some((Reply::new(354, ""), true)));
    }

    #[test]
    fn test_parse_line_rejects_garbage() {
        assert_eq!(Reply::parse_line(""), None);
        assert_eq!(Reply::parse_line("OK"), None);
        assert_eq!(Reply::parse_line("25"), None);
        assert_eq!(Reply::parse_line("250xyz"), None);
    }
}
