//! Severity-tagged diagnostics.
//!
//! Validators never fail; they only report. Each entity type has its own
//! [`Validator`], and the document-level one composes the rest. Output is
//! always sorted by [`sort`] so it does not depend on traversal order.

mod document;
mod meta;
mod plan;
mod text;
mod voucher;

pub use document::DocumentValidator;
pub use meta::MetaDataValidator;
pub use plan::{AccountValidator, AccountingPlanValidator, BalanceValidator};
pub use text::TextValidator;
pub use voucher::{TransactionValidator, VoucherValidator};

use crate::model::{Document, DocumentType};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        })
    }
}

/// Kind of entity a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    Document,
    MetaData,
    Company,
    FinancialYear,
    AccountingPlan,
    Account,
    Balance,
    Dimension,
    Voucher,
    Transaction,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub origin: Origin,
    pub severity: Severity,
    pub tag: Option<String>,
    pub message: String,
    pub line: Option<String>,
}

impl Diagnostic {
    pub fn new(origin: Origin, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            origin,
            severity,
            tag: None,
            message: message.into(),
            line: None,
        }
    }

    pub fn info(origin: Origin, message: impl Into<String>) -> Self {
        Self::new(origin, Severity::Info, message)
    }

    pub fn warning(origin: Origin, message: impl Into<String>) -> Self {
        Self::new(origin, Severity::Warning, message)
    }

    pub fn critical(origin: Origin, message: impl Into<String>) -> Self {
        Self::new(origin, Severity::Critical, message)
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_line(mut self, line: Option<&str>) -> Self {
        self.line = line.map(str::to_string);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {:?}", self.severity, self.origin)?;
        if let Some(tag) = &self.tag {
            write!(f, " {tag}")?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(line) = &self.line {
            write!(f, " ({line})")?;
        }
        Ok(())
    }
}

/// Order by severity (most severe first), then tag, then message.
///
/// The sort is stable, so equal keys keep construction order.
pub fn sort(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.tag.cmp(&b.tag))
            .then_with(|| a.message.cmp(&b.message))
    });
}

/// What a validator may look at besides its own entity.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub variant: DocumentType,
    pub document: Option<&'a Document>,
}

impl<'a> Context<'a> {
    pub fn new(variant: DocumentType) -> Self {
        Self {
            variant,
            document: None,
        }
    }

    pub fn for_document(document: &'a Document) -> Self {
        Self {
            variant: document.meta().document_type,
            document: Some(document),
        }
    }
}

pub trait Validator {
    type Entity: ?Sized;

    /// Append findings for `entity` to `out`, in construction order.
    fn validate(&self, entity: &Self::Entity, ctx: &Context<'_>, out: &mut Vec<Diagnostic>);

    /// Findings for `entity`, sorted.
    fn check(&self, entity: &Self::Entity, ctx: &Context<'_>) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        self.validate(entity, ctx, &mut out);
        sort(&mut out);
        out
    }
}

/// Everything known about one input: the document if it could be built, and
/// all diagnostics, sorted.
#[derive(Debug, Clone)]
pub struct Report {
    document: Option<Document>,
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn new(document: Option<Document>, mut diagnostics: Vec<Diagnostic>) -> Self {
        sort(&mut diagnostics);
        Self {
            document,
            diagnostics,
        }
    }

    /// `None` when the input could not be built into a document at all.
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn into_document(self) -> Option<Document> {
        self.document
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn has_critical(&self) -> bool {
        self.count(Severity::Critical) > 0
    }
}
