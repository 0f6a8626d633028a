//! Line-oriented reading from a connection
//!
//! Lines are reassembled by [`BufRead::read_until`], so a command split
//! across several TCP segments (or several commands arriving in one) is
//! handled the same as one command per packet.

use std::io::{self, BufRead};

use tracing::trace;

/// Reads CRLF- or LF-terminated lines from a buffered stream
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
    buffer: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    /// Read the next line without its terminator.
    ///
    /// Returns `Ok(None)` once the peer has closed the connection. Invalid
    /// UTF-8 is replaced rather than rejected.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        self.buffer.clear();
        if self.inner.read_until(b'\n', &mut self.buffer)? == 0 {
            return Ok(None);
        }

        let line = String::from_utf8_lossy(&self.buffer);
        let line = line.trim_end_matches(['\r', '\n']).to_owned();
        trace!("<< {line}");
        Ok(Some(line))
    }

    /// Start collecting a message body from this reader
    pub fn message(&mut self) -> MessageCollector<'_, R> {
        MessageCollector {
            reader: self,
            finished: false,
        }
    }
}

/// Yields body lines until a line consisting of a lone `.`.
///
/// The terminator is consumed but not yielded. Once the terminator has been
/// seen, or the stream has failed, the collector yields nothing more. There
/// is no limit on the number or length of lines.
pub struct MessageCollector<'a, R> {
    reader: &'a mut LineReader<R>,
    finished: bool,
}

impl<R: BufRead> MessageCollector<'_, R> {
    /// Drain the collector into a body where every line ends in `\n`
    pub fn collect_body(self) -> io::Result<String> {
        let mut body = String::new();
        for line in self {
            body.push_str(&line?);
            body.push('\n');
        }
        Ok(body)
    }
}

impl<R: BufRead> Iterator for MessageCollector<'_, R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.reader.read_line() {
            Ok(Some(line)) if line.trim() == "." => {
                self.finished = true;
                None
            }
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                self.finished = true;
                Some(Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed before end of message data",
                )))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    fn reader(input: &str) -> LineReader<Cursor<Vec<u8>>> {
        LineReader::new(Cursor::new(input.as_bytes().to_vec()))
    }

    /// Hands out at most `chunk` bytes per read, like a slow socket
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        chunk: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let end = (self.pos + self.chunk).min(self.data.len());
            let n = (end - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_read_lines_with_mixed_terminators() {
        let mut reader = reader("HELO a\r\nNOOP\nQUIT");
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("HELO a"));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("NOOP"));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("QUIT"));
        assert_eq!(reader.read_line().unwrap(), None);
    }

    #[test]
    fn test_line_split_across_reads() {
        let trickle = Trickle {
            data: b"MAIL FROM:<someone@example.com>\r\n".to_vec(),
            pos: 0,
            chunk: 3,
        };
        let mut reader = LineReader::new(BufReader::with_capacity(4, trickle));
        assert_eq!(
            reader.read_line().unwrap().as_deref(),
            Some("MAIL FROM:<someone@example.com>")
        );
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut reader = LineReader::new(Cursor::new(b"\xFFHELO\r\n".to_vec()));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("\u{FFFD}HELO"));
    }

    #[test]
    fn test_collect_body_stops_at_lone_dot() {
        let mut reader = reader("Subject: hi\r\n\r\nbody\r\n.\r\nQUIT\r\n");
        let body = reader.message().collect_body().unwrap();
        assert_eq!(body, "Subject: hi\n\nbody\n");
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("QUIT"));
    }

    #[test]
    fn test_double_dot_is_body_content() {
        let mut reader = reader("first\r\n..\r\n.hidden\r\n.\r\n");
        let body = reader.message().collect_body().unwrap();
        assert_eq!(body, "first\n..\n.hidden\n");
    }

    #[test]
    fn test_dot_with_surrounding_whitespace_terminates() {
        let mut reader = reader("line\r\n . \r\n");
        assert_eq!(reader.message().collect_body().unwrap(), "line\n");
    }

    #[test]
    fn test_empty_body() {
        let mut reader = reader(".\r\n");
        assert_eq!(reader.message().collect_body().unwrap(), "");
    }

    #[test]
    fn test_eof_before_terminator() {
        let mut reader = reader("partial\r\n");
        let err = reader.message().collect_body().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_collector_is_not_restartable() {
        let mut reader = reader("a\r\n.\r\nb\r\n");
        let mut collector = reader.message();
        assert_eq!(collector.next().unwrap().unwrap(), "a");
        assert!(collector.next().is_none());
        assert!(collector.next().is_none());
    }
}
