//! Fatal errors of the public API.
//!
//! Anything that prevents a [`Document`](crate::model::Document) from being
//! built at all ends up here. Non-fatal findings are
//! [`Diagnostic`](crate::validation::Diagnostic)s instead.

use std::fmt;
use thiserror::Error;

/// What went wrong, independent of the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The byte source could not be read.
    Io,
    /// A required field or tag value is absent.
    MissingField,
    /// A required field is present but cannot be parsed.
    InvalidField,
    /// Financial years are not contiguous.
    NonConsecutiveYears,
    /// A `#TRANS` line appeared outside a voucher.
    TransactionWithoutVoucher,
    /// `#SIETYP` names a variant this crate does not know.
    UnsupportedVariant,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Io => "I/O error",
            ErrorKind::MissingField => "missing field",
            ErrorKind::InvalidField => "invalid field",
            ErrorKind::NonConsecutiveYears => "non-consecutive financial years",
            ErrorKind::TransactionWithoutVoucher => "transaction without voucher",
            ErrorKind::UnsupportedVariant => "unsupported variant",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct SieError {
    kind: ErrorKind,
    message: String,
    tag: Option<String>,
    line: Option<String>,
    #[source]
    source: Option<std::io::Error>,
}

impl SieError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            tag: None,
            line: None,
            source: None,
        }
    }

    pub fn missing(tag: &str, field: &str) -> Self {
        Self::new(ErrorKind::MissingField, format!("{tag} is missing {field}")).with_tag(tag)
    }

    pub fn invalid(tag: &str, field: &str, value: &str) -> Self {
        Self::new(
            ErrorKind::InvalidField,
            format!("{tag} has invalid {field} '{value}'"),
        )
        .with_tag(tag)
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Attach the offending source line, unless one is already set.
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        if self.line.is_none() {
            self.line = Some(line.into());
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn line(&self) -> Option<&str> {
        self.line.as_deref()
    }
}

impl From<std::io::Error> for SieError {
    fn from(e: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Io,
            message: e.to_string(),
            tag: None,
            line: None,
            source: Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, SieError>;
