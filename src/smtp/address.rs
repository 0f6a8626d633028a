//! Mailbox addresses and the `<...>` paths carried by MAIL and RCPT

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("missing '{0}' keyword")]
    MissingKeyword(&'static str),

    #[error("address must be enclosed in angle brackets")]
    MissingBrackets,

    #[error("address must contain exactly one '@'")]
    InvalidAt,

    #[error("address has an empty local part")]
    EmptyLocalPart,

    #[error("address has an empty domain")]
    EmptyDomain,
}

/// An address of the form `local@domain`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    raw: String,
    at: usize,
}

impl Address {
    /// Parse a bare address (no brackets)
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let mut ats = raw.match_indices('@');
        let at = match (ats.next(), ats.next()) {
            (Some((at, _)), None) => at,
            _ => return Err(AddressError::InvalidAt),
        };

        if at == 0 {
            return Err(AddressError::EmptyLocalPart);
        }
        if at + 1 == raw.len() {
            return Err(AddressError::EmptyDomain);
        }

        Ok(Self {
            raw: raw.to_owned(),
            at,
        })
    }

    /// Parse the argument tail of `MAIL`/`RCPT`, e.g. `FROM:<a@b.com>`.
    ///
    /// `keyword` is the expected prefix (`FROM:` or `TO:`). Whitespace between
    /// the keyword and the opening bracket is tolerated.
    pub fn parse_path(argument: &str, keyword: &'static str) -> Result<Self, AddressError> {
        let rest = argument
            .trim()
            .strip_prefix(keyword)
            .ok_or(AddressError::MissingKeyword(keyword))?
            .trim_start();

        let inner = rest
            .strip_prefix('<')
            .and_then(|r| r.find('>').map(|end| &r[..end]))
            .ok_or(AddressError::MissingBrackets)?;

        Self::parse(inner)
    }

    pub fn local_part(&self) -> &str {
        &self.raw[..self.at]
    }

    pub fn domain(&self) -> &str {
        &self.raw[self.at + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this address belongs to `domain` (ASCII case-insensitive)
    pub fn is_in_domain(&self, domain: &str) -> bool {
        self.domain().eq_ignore_ascii_case(domain)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        let addr = Address::parse("user@example.com").unwrap();
        assert_eq!(addr.local_part(), "user");
        assert_eq!(addr.domain(), "example.com");
        assert_eq!(addr.to_string(), "user@example.com");
    }

    #[test]
    fn test_parse_invalid_addresses() {
        assert_eq!(Address::parse("bad"), Err(AddressError::InvalidAt));
        assert_eq!(Address::parse("a@b@c"), Err(AddressError::InvalidAt));
        assert_eq!(
            Address::parse("@example.com"),
            Err(AddressError::EmptyLocalPart)
        );
        assert_eq!(Address::parse("user@"), Err(AddressError::EmptyDomain));
    }

    #[test]
    fn test_parse_path() {
        let addr = Address::parse_path("FROM:<a@b.com>", "FROM:").unwrap();
        assert_eq!(addr.as_str(), "a@b.com");

        let addr = Address::parse_path("TO: <c@localhost>", "TO:").unwrap();
        assert_eq!(addr.local_part(), "c");
        assert_eq!(addr.domain(), "localhost");
    }

    #[test]
    fn test_parse_path_ignores_trailing_parameters() {
        let addr = Address::parse_path("FROM:<a@b.com> BODY=8BITMIME", "FROM:").unwrap();
        assert_eq!(addr.as_str(), "a@b.com");
    }

    #[test]
    fn test_parse_path_errors() {
        assert_eq!(
            Address::parse_path("<a@b.com>", "FROM:"),
            Err(AddressError::MissingKeyword("FROM:"))
        );
        assert_eq!(
            Address::parse_path("TO:a@b.com", "TO:"),
            Err(AddressError::MissingBrackets)
        );
        assert_eq!(
            Address::parse_path("TO:<a@b.com", "TO:"),
            Err(AddressError::MissingBrackets)
        );
        assert_eq!(
            Address::parse_path("FROM:<bad>", "FROM:"),
            Err(AddressError::InvalidAt)
        );
    }

    #[test]
    fn test_is_in_domain() {
        let addr = Address::parse("c@LocalHost").unwrap();
        assert!(addr.is_in_domain("localhost"));
        assert!(!addr.is_in_domain("remote.example"));
    }
}
