//! sielib: reading, writing and validating SIE 4 accounting files.
//!
//! ```
//! let bytes = b"#FLAGGA 0\n#SIETYP 4\n#FNAMN \"Demo AB\"\n#RAR 0 20230101 20231231\n";
//! let doc = sielib::parse(bytes).unwrap();
//! assert_eq!(doc.meta().company.name, "Demo AB");
//! let again = sielib::parse(&sielib::render(&doc)).unwrap();
//! assert_eq!(sielib::checksum(&doc), sielib::checksum(&again));
//! ```

pub mod error;
pub mod model;
pub mod sie;
pub mod traits;
pub mod validation;

use error::{Result, SieError};
use model::Document;
use sie::{encoding, reader, writer, Parsed, WriteOptions};
use validation::{Context, Diagnostic, DocumentValidator, Origin, Report, TextValidator, Validator};

/// Decode, tokenize and build a document.
pub fn parse(bytes: &[u8]) -> Result<Document> {
    Ok(reader::read_bytes(bytes)?.document)
}

/// Like [`parse`], also returning findings raised while building.
pub fn parse_with_diagnostics(bytes: &[u8]) -> Result<Parsed> {
    reader::read_bytes(bytes)
}

/// Canonical text in the PC8 codepage.
pub fn render(doc: &Document) -> Vec<u8> {
    writer::render(doc, &WriteOptions::default())
}

pub fn render_with(doc: &Document, options: &WriteOptions) -> Vec<u8> {
    writer::render(doc, options)
}

/// Sorted diagnostics for a built document.
pub fn validate(doc: &Document) -> Vec<Diagnostic> {
    DocumentValidator.check(doc, &Context::for_document(doc))
}

/// Validate raw input.
///
/// Always returns a report. When the input cannot be built, the fatal error
/// becomes a CRITICAL diagnostic and [`Report::document`] is `None`.
pub fn validate_bytes(bytes: &[u8]) -> Report {
    let text = encoding::normalize(bytes);
    let variant = reader::detect_variant(&reader::lines(&text)).unwrap_or_default();
    let mut diagnostics = Vec::new();
    TextValidator.validate(text.as_str(), &Context::new(variant), &mut diagnostics);

    match reader::read_text(&text) {
        Ok(parsed) => {
            diagnostics.extend(parsed.diagnostics);
            let doc = parsed.document;
            DocumentValidator.validate(&doc, &Context::for_document(&doc), &mut diagnostics);
            Report::new(Some(doc), diagnostics)
        }
        Err(err) => {
            diagnostics.push(fatal(&err));
            Report::new(None, diagnostics)
        }
    }
}

pub fn checksum(doc: &Document) -> String {
    sie::checksum(doc)
}

fn fatal(err: &SieError) -> Diagnostic {
    let mut d = Diagnostic::critical(Origin::Document, err.to_string()).with_line(err.line());
    d.tag = err.tag().map(str::to_string);
    d
}
