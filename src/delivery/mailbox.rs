//! Local mailbox files
//!
//! Each local recipient has one append-only file named after the local part
//! of their address. A message is written with a single `write_all` on a file
//! opened in append mode, so concurrent sessions delivering to the same
//! mailbox do not interleave within a message.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::delivery::envelope::Envelope;
use crate::delivery::error::MailboxError;

/// Appends messages to mailbox files in a directory
#[derive(Debug, Clone)]
pub struct MailboxWriter {
    dir: PathBuf,
}

impl MailboxWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the mailbox for a local part, if it names a plain file
    pub fn mailbox_path(&self, local_part: &str) -> Result<PathBuf, MailboxError> {
        let invalid = local_part.is_empty()
            || local_part == "."
            || local_part == ".."
            || local_part.contains(['/', '\\', '\0']);
        if invalid {
            return Err(MailboxError::InvalidName(local_part.to_owned()));
        }

        Ok(self.dir.join(local_part))
    }

    /// Append the envelope to its recipient's mailbox
    pub fn append(&self, envelope: &Envelope) -> Result<PathBuf, MailboxError> {
        let path = self.mailbox_path(envelope.forward_path.local_part())?;
        let entry = format_entry(envelope);

        write_entry(&path, entry.as_bytes())?;
        info!(
            mailbox = %path.display(),
            from = %envelope.reverse_path,
            bytes = entry.len(),
            "delivered to local mailbox"
        );

        Ok(path)
    }
}

fn write_entry(path: &Path, entry: &[u8]) -> Result<(), MailboxError> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(entry)?;
    file.flush()?;
    Ok(())
}

/// Render an envelope as a mailbox entry:
///
/// ```text
/// From a@b.com Thu Oct 16 09:30:00 2026
/// Date: Thu, 16 Oct 2026 09:30:00 +0200
/// <body>
///
/// ```
pub fn format_entry(envelope: &Envelope) -> String {
    let received = &envelope.received;
    let mut entry = String::with_capacity(envelope.body.len() + 128);

    entry.push_str(&format!(
        "From {} {}\n",
        envelope.reverse_path,
        received.format("%a %b %e %H:%M:%S %Y")
    ));
    entry.push_str(&format!("Date: {}\n", received.to_rfc2822()));
    entry.push_str(&envelope.body);
    if !envelope.body.is_empty() && !envelope.body.ends_with('\n') {
        entry.push('\n');
    }
    entry.push('\n');

    entry
}
