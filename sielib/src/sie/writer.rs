//! Rendering a [`Document`] as canonical SIE text.
//!
//! Output is deterministic: fixed tag order, sorted collections, amounts at
//! scale 2. Absent optional fields in the middle of a line are written as
//! `""`, trailing ones are dropped; the reader maps both back to absent.

use super::encoding::{self, OutputEncoding};
use super::tokenizer::quote;
use crate::model::{money, Account, Document, ObjectReference, Voucher};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;

/// Rendering options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOptions {
    pub encoding: OutputEncoding,
}

/// Render to bytes in the configured encoding.
pub fn render(doc: &Document, options: &WriteOptions) -> Vec<u8> {
    encoding::encode(&render_text_as(doc, options.encoding), options.encoding)
}

/// Render to canonical text declaring PC8. Lines end in `\n`, the last one
/// included.
pub fn render_text(doc: &Document) -> String {
    render_text_as(doc, OutputEncoding::Pc8)
}

/// Render to canonical text whose `#FORMAT` line names `encoding`.
pub fn render_text_as(doc: &Document, encoding: OutputEncoding) -> String {
    let mut s = String::new();
    write_meta(&mut s, doc, encoding);
    write_accounts(&mut s, doc);
    write_dimensions(&mut s, doc);
    if doc.meta().document_type.carries_balances() {
        write_balances(&mut s, doc);
    }
    write_periodical_balances(&mut s, doc);
    write_budgets(&mut s, doc);

    let mut vouchers: Vec<&Voucher> = doc.vouchers().iter().collect();
    vouchers.sort_by(|a, b| a.cmp_key(b));
    for v in vouchers {
        write_voucher(&mut s, v);
    }
    s
}

/// Emit `tag` followed by `fields`. Trailing `None`s are dropped, inner ones
/// become `""`.
fn line(s: &mut String, tag: &str, fields: &[Option<String>]) {
    let used = fields
        .iter()
        .rposition(Option::is_some)
        .map_or(0, |last| last + 1);
    s.push_str(tag);
    for field in &fields[..used] {
        s.push(' ');
        match field {
            Some(value) => s.push_str(value),
            None => s.push_str("\"\""),
        }
    }
    s.push('\n');
}

/// Bare token, quoted only when it could not be read back as one.
fn token(value: &str) -> String {
    let plain = !value.is_empty()
        && !value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '{' | '}' | '\\'));
    if plain {
        value.to_string()
    } else {
        quote(value)
    }
}

fn text(value: &Option<String>) -> Option<String> {
    value.as_deref().map(quote)
}

fn amount(value: Decimal) -> Option<String> {
    Some(money(value).to_string())
}

fn date(value: chrono::NaiveDate) -> String {
    value.format("%Y%m%d").to_string()
}

fn objects(refs: &[ObjectReference]) -> String {
    let items: Vec<String> = refs
        .iter()
        .map(|r| format!("{} {}", r.dimension, quote(&r.number)))
        .collect();
    format!("{{{}}}", items.join(" "))
}

fn write_meta(s: &mut String, doc: &Document, encoding: OutputEncoding) {
    let meta = doc.meta();
    let company = &meta.company;

    let _ = writeln!(s, "#FLAGGA {}", u8::from(meta.read));
    line(
        s,
        "#PROGRAM",
        &[Some(quote(&meta.program.name)), text(&meta.program.version)],
    );
    let format = match encoding {
        OutputEncoding::Pc8 => "PC8",
        OutputEncoding::Utf8 => "UTF8",
    };
    let _ = writeln!(s, "#FORMAT {format}");
    if let Some(generated) = &meta.generated {
        line(
            s,
            "#GEN",
            &[Some(date(generated.date)), text(&generated.signature)],
        );
    }
    let _ = writeln!(s, "#SIETYP {}", meta.document_type.code());
    if let Some(comment) = &meta.comment {
        let _ = writeln!(s, "#PROSA {}", quote(comment));
    }

    if let Some(id) = &company.id {
        let _ = writeln!(s, "#FNR {}", token(id));
    }
    if let Some(orgnr) = &company.corporate_id {
        let _ = writeln!(s, "#ORGNR {}", token(orgnr));
    }
    if let Some(code) = &company.industry_code {
        let _ = writeln!(s, "#BKOD {}", token(code));
    }
    if let Some(address) = &company.address {
        let _ = writeln!(
            s,
            "#ADRESS {} {} {} {}",
            quote(&address.contact),
            quote(&address.street),
            quote(&address.postal),
            quote(&address.phone)
        );
    }
    let _ = writeln!(s, "#FNAMN {}", quote(&company.name));
    if let Some(form) = company.legal_form {
        let _ = writeln!(s, "#FTYP {}", form.code());
    }

    let mut years: Vec<_> = meta.financial_years.iter().collect();
    years.sort_by(|a, b| b.index.cmp(&a.index));
    for y in years {
        let _ = writeln!(s, "#RAR {} {} {}", y.index, date(y.start), date(y.end));
    }
    if let Some(year) = meta.taxation_year {
        let _ = writeln!(s, "#TAXAR {year}");
    }
    if let Some(end) = meta.period_range_end {
        let _ = writeln!(s, "#OMFATTN {}", date(end));
    }
    if let Some(plan_type) = doc.plan().and_then(|p| p.plan_type.as_ref()) {
        let _ = writeln!(s, "#KPTYP {}", token(plan_type));
    }
    if let Some(currency) = &meta.currency {
        let _ = writeln!(s, "#VALUTA {}", token(currency));
    }
}

fn sorted_accounts(doc: &Document) -> Vec<&Account> {
    let mut accounts: Vec<&Account> = doc.accounts().iter().collect();
    accounts.sort_by(|a, b| a.number.cmp(&b.number));
    accounts
}

fn write_accounts(s: &mut String, doc: &Document) {
    let accounts = sorted_accounts(doc);
    for a in &accounts {
        let _ = writeln!(s, "#KONTO {} {}", token(&a.number), quote(&a.label));
    }
    for a in &accounts {
        if let Some(kind) = a.account_type {
            let _ = writeln!(s, "#KTYP {} {}", token(&a.number), kind.code());
        }
    }
    for a in &accounts {
        if let Some(unit) = &a.unit {
            let _ = writeln!(s, "#ENHET {} {}", token(&a.number), quote(unit));
        }
    }
    for a in &accounts {
        for code in &a.sru_codes {
            let _ = writeln!(s, "#SRU {} {}", token(&a.number), token(code));
        }
    }
}

fn write_dimensions(s: &mut String, doc: &Document) {
    for d in doc.dimensions() {
        match d.parent {
            None => {
                let _ = writeln!(s, "#DIM {} {}", d.id, quote(&d.label));
            }
            Some(parent) => {
                let _ = writeln!(s, "#UNDERDIM {} {} {}", d.id, quote(&d.label), parent);
            }
        }
    }
    for o in doc.objects() {
        let _ = writeln!(
            s,
            "#OBJEKT {} {} {}",
            o.dimension,
            quote(&o.number),
            quote(&o.label)
        );
    }
}

fn quantity(q: Option<f64>) -> Option<String> {
    q.map(|q| q.to_string())
}

/// Yearly and object balances, each tag sorted by descending year index,
/// then account.
fn write_balances(s: &mut String, doc: &Document) {
    let accounts = sorted_accounts(doc);

    let mut rows = Vec::new();
    for a in &accounts {
        for b in &a.opening_balances {
            rows.push((0, b.year_index, a.number.as_str(), b));
        }
        for b in &a.closing_balances {
            rows.push((1, b.year_index, a.number.as_str(), b));
        }
    }
    rows.sort_by(|x, y| x.0.cmp(&y.0).then(y.1.cmp(&x.1)).then(x.2.cmp(y.2)));
    for (kind, year, number, b) in rows {
        let tag = if kind == 0 { "#IB" } else { "#UB" };
        line(
            s,
            tag,
            &[
                Some(year.to_string()),
                Some(token(number)),
                amount(b.amount),
                quantity(b.quantity),
            ],
        );
    }

    let mut rows = Vec::new();
    for a in &accounts {
        for b in &a.object_opening_balances {
            rows.push((0, a.number.as_str(), b));
        }
        for b in &a.object_closing_balances {
            rows.push((1, a.number.as_str(), b));
        }
    }
    rows.sort_by(|x, y| {
        x.0.cmp(&y.0)
            .then(y.2.year_index.cmp(&x.2.year_index))
            .then(x.1.cmp(y.1))
            .then_with(|| x.2.object.cmp(&y.2.object))
    });
    for (kind, number, b) in rows {
        let tag = if kind == 0 { "#OIB" } else { "#OUB" };
        line(
            s,
            tag,
            &[
                Some(b.year_index.to_string()),
                Some(token(number)),
                Some(objects(std::slice::from_ref(&b.object))),
                amount(b.amount),
                quantity(b.quantity),
            ],
        );
    }

    let mut rows: Vec<_> = accounts
        .iter()
        .flat_map(|a| a.results.iter().map(move |b| (a.number.as_str(), b)))
        .collect();
    rows.sort_by(|x, y| y.1.year_index.cmp(&x.1.year_index).then(x.0.cmp(y.0)));
    for (number, b) in rows {
        line(
            s,
            "#RES",
            &[
                Some(b.year_index.to_string()),
                Some(token(number)),
                amount(b.amount),
                quantity(b.quantity),
            ],
        );
    }
}

/// Periodical balances, written whenever present so import files keep them.
fn write_periodical_balances(s: &mut String, doc: &Document) {
    let accounts = sorted_accounts(doc);
    let mut rows: Vec<_> = accounts
        .iter()
        .flat_map(|a| {
            a.periodical_balances
                .iter()
                .map(move |b| (a.number.as_str(), b))
        })
        .collect();
    rows.sort_by(|x, y| {
        y.1.year_index
            .cmp(&x.1.year_index)
            .then(x.1.period.cmp(&y.1.period))
            .then(x.0.cmp(y.0))
            .then_with(|| x.1.object.cmp(&y.1.object))
    });
    for (number, b) in rows {
        line(
            s,
            "#PSALDO",
            &[
                Some(b.year_index.to_string()),
                Some(b.period.to_string()),
                Some(token(number)),
                Some(objects(b.object.as_slice())),
                amount(b.amount),
                quantity(b.quantity),
            ],
        );
    }
}

/// Budgets sorted by year, period, then account.
fn write_budgets(s: &mut String, doc: &Document) {
    let accounts = sorted_accounts(doc);
    let mut rows: Vec<_> = accounts
        .iter()
        .flat_map(|a| {
            a.periodical_budgets
                .iter()
                .map(move |b| (a.number.as_str(), b))
        })
        .collect();
    rows.sort_by(|x, y| {
        y.1.year_index
            .cmp(&x.1.year_index)
            .then(x.1.period.cmp(&y.1.period))
            .then(x.0.cmp(y.0))
            .then_with(|| x.1.object.cmp(&y.1.object))
    });
    for (number, b) in rows {
        line(
            s,
            "#PBUDGET",
            &[
                Some(b.year_index.to_string()),
                Some(b.period.to_string()),
                Some(token(number)),
                Some(objects(b.object.as_slice())),
                amount(b.amount),
                quantity(b.quantity),
            ],
        );
    }
}

fn write_voucher(s: &mut String, v: &Voucher) {
    line(
        s,
        "#VER",
        &[
            Some(v.series.as_deref().map_or_else(|| quote(""), token)),
            Some(v.number.map_or_else(|| quote(""), |n| n.to_string())),
            Some(date(v.date)),
            text(&v.text),
            v.registration_date.map(date),
            text(&v.signature),
        ],
    );
    let _ = writeln!(s, "{{");
    for t in &v.transactions {
        line(
            s,
            "#TRANS",
            &[
                Some(token(&t.account)),
                Some(objects(&t.objects)),
                amount(t.amount),
                Some(date(t.date.unwrap_or(v.date))),
                text(&t.text),
                quantity(t.quantity),
                text(&t.signature),
            ],
        );
    }
    let _ = writeln!(s, "}}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_absent_fields_become_empty_quotes() {
        let mut s = String::new();
        line(
            &mut s,
            "#VER",
            &[Some("A".into()), None, Some("20230101".into()), None, None],
        );
        assert_eq!(s, "#VER A \"\" 20230101\n");
    }

    #[test]
    fn tokens_are_quoted_only_when_needed() {
        assert_eq!(token("1910"), "1910");
        assert_eq!(token(""), "\"\"");
        assert_eq!(token("A B"), "\"A B\"");
    }

    #[test]
    fn format_line_names_output_encoding() {
        let doc = crate::parse(b"#SIETYP 1\n#FNAMN x\n").unwrap();
        assert!(render_text(&doc).contains("\n#FORMAT PC8\n"));
        let utf8 = render_text_as(&doc, OutputEncoding::Utf8);
        assert!(utf8.contains("\n#FORMAT UTF8\n"));
        assert!(!utf8.contains("PC8"));
    }

    #[test]
    fn object_lists_quote_numbers() {
        assert_eq!(
            objects(&[ObjectReference::new(1, "100"), ObjectReference::new(6, "P 1")]),
            r#"{1 "100" 6 "P 1"}"#
        );
        assert_eq!(objects(&[]), "{}");
    }
}
