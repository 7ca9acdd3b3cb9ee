use super::{Context, Diagnostic, Origin, Validator};
use crate::model::{DocumentType, FinancialYear, MetaData};
use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;

static CORPORATE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}-\d{4}$").unwrap());
static CURRENCY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());

/// Header tags: flag, program, company, financial years and friends.
pub struct MetaDataValidator;

impl Validator for MetaDataValidator {
    type Entity = MetaData;

    fn validate(&self, meta: &MetaData, ctx: &Context<'_>, out: &mut Vec<Diagnostic>) {
        if meta.read {
            out.push(
                Diagnostic::warning(Origin::MetaData, "file is marked as previously read")
                    .with_tag("#FLAGGA"),
            );
        }

        if meta.program.name.trim().is_empty() {
            out.push(
                Diagnostic::warning(Origin::MetaData, "generating program is not named")
                    .with_tag("#PROGRAM"),
            );
        } else if meta.program.version.is_none() {
            out.push(
                Diagnostic::info(
                    Origin::MetaData,
                    format!("program '{}' has no version", meta.program.name),
                )
                .with_tag("#PROGRAM"),
            );
        }
        if meta.generated.is_none() {
            out.push(
                Diagnostic::warning(Origin::MetaData, "generation date is missing")
                    .with_tag("#GEN"),
            );
        }

        company(meta, out);
        financial_years(meta, ctx.variant, out);

        if let Some(currency) = &meta.currency {
            if !CURRENCY.is_match(currency) {
                out.push(
                    Diagnostic::warning(
                        Origin::MetaData,
                        format!("currency '{currency}' is not a three-letter ISO code"),
                    )
                    .with_tag("#VALUTA"),
                );
            }
        }

        match (ctx.variant, meta.period_range_end) {
            (variant, None) if variant.requires_period_range() => out.push(
                Diagnostic::warning(
                    Origin::MetaData,
                    format!("period range end is required for {variant:?}"),
                )
                .with_tag("#OMFATTN"),
            ),
            (DocumentType::I4, Some(end)) => out.push(
                Diagnostic::warning(
                    Origin::MetaData,
                    format!("period range end {end} does not belong in an import file"),
                )
                .with_tag("#OMFATTN"),
            ),
            _ => {}
        }
    }
}

fn company(meta: &MetaData, out: &mut Vec<Diagnostic>) {
    let company = &meta.company;
    if company.name.trim().is_empty() {
        out.push(
            Diagnostic::warning(Origin::Company, "company name is missing").with_tag("#FNAMN"),
        );
    }
    if let Some(id) = &company.corporate_id {
        if !CORPORATE_ID.is_match(id) {
            out.push(
                Diagnostic::info(
                    Origin::Company,
                    format!("corporate id '{id}' does not look like NNNNNN-NNNN"),
                )
                .with_tag("#ORGNR"),
            );
        }
    }
    if let Some(address) = &company.address {
        if !address.is_complete() {
            out.push(
                Diagnostic::info(Origin::Company, "address is incomplete").with_tag("#ADRESS"),
            );
        }
    }
}

fn financial_years(meta: &MetaData, variant: DocumentType, out: &mut Vec<Diagnostic>) {
    let Some(current) = meta.current_year() else {
        out.push(
            Diagnostic::critical(
                Origin::FinancialYear,
                format!("no current financial year in {variant:?} file"),
            )
            .with_tag("#RAR"),
        );
        return;
    };
    if let Err(err) = FinancialYear::check_contiguous(&meta.financial_years) {
        out.push(Diagnostic::critical(Origin::FinancialYear, err.message()).with_tag("#RAR"));
    }

    // the tax assessment year follows the year the books close in
    if let Some(taxation_year) = meta.taxation_year {
        let expected = current.end.year() + 1;
        if taxation_year != expected {
            out.push(
                Diagnostic::info(
                    Origin::MetaData,
                    format!(
                        "taxation year {taxation_year} does not follow financial year ending {}",
                        current.end
                    ),
                )
                .with_tag("#TAXAR"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Generated, Program};
    use crate::validation::Severity;
    use chrono::NaiveDate;

    fn meta() -> MetaData {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        let mut meta = MetaData {
            document_type: DocumentType::E4,
            program: Program {
                name: "Bokföring".into(),
                version: Some("1.0".into()),
            },
            generated: Some(Generated {
                date: date(2024, 1, 10),
                signature: None,
            }),
            financial_years: vec![FinancialYear {
                index: 0,
                start: date(2023, 1, 1),
                end: date(2023, 12, 31),
            }],
            ..Default::default()
        };
        meta.company.name = "Demo AB".into();
        meta
    }

    fn check(meta: &MetaData) -> Vec<Diagnostic> {
        MetaDataValidator.check(meta, &Context::new(meta.document_type))
    }

    #[test]
    fn complete_header_is_clean() {
        assert!(check(&meta()).is_empty());
    }

    #[test]
    fn corporate_id_and_currency_patterns() {
        let mut m = meta();
        m.company.corporate_id = Some("5561234567".into());
        m.currency = Some("sek".into());
        let d = check(&m);
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].severity, Severity::Warning);
        assert_eq!(d[0].tag.as_deref(), Some("#VALUTA"));
        assert_eq!(d[1].severity, Severity::Info);
        assert_eq!(d[1].tag.as_deref(), Some("#ORGNR"));
    }

    #[test]
    fn missing_years_is_critical() {
        let mut m = meta();
        m.financial_years.clear();
        let d = check(&m);
        assert_eq!(d[0].severity, Severity::Critical);
        assert_eq!(d[0].tag.as_deref(), Some("#RAR"));
    }

    #[test]
    fn period_range_depends_on_variant() {
        let mut m = meta();
        m.document_type = DocumentType::E1;
        assert_eq!(check(&m)[0].tag.as_deref(), Some("#OMFATTN"));

        m.document_type = DocumentType::I4;
        m.period_range_end = NaiveDate::from_ymd_opt(2023, 12, 31);
        assert_eq!(check(&m)[0].tag.as_deref(), Some("#OMFATTN"));
    }

    #[test]
    fn taxation_year_follows_year_end() {
        let mut m = meta();
        m.taxation_year = Some(2024);
        assert!(check(&m).is_empty());
        m.taxation_year = Some(2023);
        assert_eq!(check(&m)[0].severity, Severity::Info);
    }
}
