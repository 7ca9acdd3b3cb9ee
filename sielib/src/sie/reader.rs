//! Turning canonical text into a [`Document`].
//!
//! Header tags are looked up directly: single-valued ones by their first
//! occurrence, multi-valued ones by collecting every matching line. Vouchers
//! need context across lines and are built by folding a small state machine
//! over the line stream.

use super::encoding;
use super::tokenizer::{brace_items, tokenize, unquote};
use crate::error::{ErrorKind, Result, SieError};
use crate::model::{
    parse_amount, Account, AccountType, AccountingDimension, AccountingObject, AccountingPlan,
    Address, Balance, BalanceKind, Company, Document, DocumentType, FinancialYear, Generated,
    LegalForm, MetaData, ObjectBalance, ObjectReference, Period, PeriodicalBalance,
    PeriodicalBudget, Program, SourceLine, Transaction, Voucher,
};
use crate::validation::{Diagnostic, Origin};
use chrono::NaiveDate;
use log::{debug, trace, warn};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::iter;

const BALANCE_TAGS: [&str; 5] = ["#IB", "#UB", "#RES", "#OIB", "#OUB"];

/// Every tag the reader understands.
pub const KNOWN_TAGS: [&str; 33] = [
    "#FLAGGA", "#PROGRAM", "#FORMAT", "#GEN", "#SIETYP", "#PROSA", "#FTYP", "#FNR", "#ORGNR",
    "#BKOD", "#ADRESS", "#FNAMN", "#RAR", "#TAXAR", "#OMFATTN", "#KPTYP", "#VALUTA", "#KONTO",
    "#KTYP", "#ENHET", "#SRU", "#DIM", "#UNDERDIM", "#OBJEKT", "#IB", "#UB", "#RES", "#OIB",
    "#OUB", "#PSALDO", "#PBUDGET", "#VER", "#TRANS",
];

/// A built document plus the non-fatal findings raised while building it.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub document: Document,
    pub diagnostics: Vec<Diagnostic>,
}

/// One non-empty physical line, tokenized.
#[derive(Debug, Clone)]
pub struct Line<'a> {
    pub number: usize,
    pub raw: &'a str,
    tokens: Vec<String>,
    tag: String,
}

impl<'a> Line<'a> {
    pub fn new(number: usize, raw: &'a str) -> Self {
        let tokens = tokenize(raw);
        let tag = tokens
            .first()
            .map(|t| t.to_ascii_uppercase())
            .unwrap_or_default();
        Self {
            number,
            raw,
            tokens,
            tag,
        }
    }

    /// Upper-cased first token, e.g. `#KONTO`, `{` or `}`.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_tagged(&self) -> bool {
        self.tag.starts_with('#')
    }

    /// Raw token after the tag; index 1 is the first field.
    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    pub fn field_count(&self) -> usize {
        self.tokens.len().saturating_sub(1)
    }

    fn error(&self, err: SieError) -> SieError {
        err.with_tag(self.tag.clone()).with_line(self.raw)
    }

    /// A required field, unquoted. Blank counts as missing.
    fn required(&self, index: usize, field: &str) -> Result<String> {
        self.text(index)
            .ok_or_else(|| self.error(SieError::missing(&self.tag, field)))
    }

    /// An optional field, unquoted. Missing and `""` are both absent.
    fn text(&self, index: usize) -> Option<String> {
        self.token(index).map(unquote).filter(|s| !s.is_empty())
    }

    /// A field the grammar always carries a string for; missing is blank.
    fn string(&self, index: usize) -> String {
        self.token(index).map(unquote).unwrap_or_default()
    }

    fn date(&self, index: usize, field: &str) -> Result<NaiveDate> {
        let value = self.required(index, field)?;
        parse_date(&value).ok_or_else(|| self.error(SieError::invalid(&self.tag, field, &value)))
    }

    fn int<T: std::str::FromStr>(&self, index: usize, field: &str) -> Result<T> {
        let value = self.required(index, field)?;
        value
            .parse()
            .map_err(|_| self.error(SieError::invalid(&self.tag, field, &value)))
    }

    fn amount(&self, index: usize) -> Result<Decimal> {
        let value = self.required(index, "amount")?;
        parse_amount(&value)
            .ok_or_else(|| self.error(SieError::invalid(&self.tag, "amount", &value)))
    }

    fn period(&self, index: usize) -> Result<Period> {
        let value = self.required(index, "period")?;
        Period::parse(&value)
            .ok_or_else(|| self.error(SieError::invalid(&self.tag, "period", &value)))
    }

    /// Optional date; an unparseable value is dropped with a warning.
    fn optional_date(
        &self,
        index: usize,
        field: &str,
        origin: Origin,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<NaiveDate> {
        let value = self.text(index)?;
        let date = parse_date(&value);
        if date.is_none() {
            diagnostics.push(self.dropped(origin, field, &value));
        }
        date
    }

    /// Optional quantity; an unparseable value is dropped with a warning.
    fn quantity(
        &self,
        index: usize,
        origin: Origin,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<f64> {
        let value = self.text(index)?;
        let quantity = value.replace(',', ".").parse().ok();
        if quantity.is_none() {
            diagnostics.push(self.dropped(origin, "quantity", &value));
        }
        quantity
    }

    fn dropped(&self, origin: Origin, field: &str, value: &str) -> Diagnostic {
        Diagnostic::warning(
            origin,
            format!("ignoring unparseable {field} '{value}' on line {}", self.number),
        )
        .with_tag(self.tag.clone())
        .with_line(Some(self.raw))
    }

    /// Parse an object list token such as `{1 "100" 6 "P1"}`.
    fn objects(&self, index: usize) -> Result<Vec<ObjectReference>> {
        let token = self
            .token(index)
            .ok_or_else(|| self.error(SieError::missing(&self.tag, "object list")))?;
        parse_objects(token)
            .ok_or_else(|| self.error(SieError::invalid(&self.tag, "object list", token)))
    }

    fn single_object(&self, index: usize) -> Result<Option<ObjectReference>> {
        let mut objects = self.objects(index)?;
        if objects.len() > 1 {
            let token = self.token(index).unwrap_or_default();
            return Err(self.error(SieError::invalid(&self.tag, "object list", token)));
        }
        Ok(objects.pop())
    }

    fn source(&self) -> SourceLine {
        SourceLine::new(self.raw)
    }
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y%m%d").ok()
}

pub fn parse_objects(token: &str) -> Option<Vec<ObjectReference>> {
    let items = brace_items(token)?;
    if items.len() % 2 != 0 {
        return None;
    }
    items
        .chunks(2)
        .map(|pair| {
            let dimension = unquote(&pair[0]).parse().ok()?;
            Some(ObjectReference::new(dimension, unquote(&pair[1])))
        })
        .collect()
}

/// Split canonical text into non-empty lines.
pub fn lines(text: &str) -> Vec<Line<'_>> {
    text.lines()
        .enumerate()
        .filter(|(_, raw)| !raw.trim().is_empty())
        .map(|(i, raw)| Line::new(i + 1, raw.trim()))
        .collect()
}

/// Normalize bytes and read them.
pub fn read_bytes(bytes: &[u8]) -> Result<Parsed> {
    read_text(&encoding::normalize(bytes))
}

/// Read canonical text produced by [`encoding::normalize`].
pub fn read_text(text: &str) -> Result<Parsed> {
    let lines = lines(text);
    let mut diagnostics = Vec::new();
    for line in lines.iter().filter(|l| l.is_tagged()) {
        if !KNOWN_TAGS.contains(&line.tag()) {
            warn!("skipping unknown tag {} on line {}", line.tag(), line.number);
        }
    }

    let meta = read_meta(&lines)?;
    debug!(
        "reading SIE {:?} for '{}', {} lines",
        meta.document_type,
        meta.company.name,
        lines.len()
    );

    let mut builder = Document::builder(meta);
    if let Some(plan) = read_plan(&lines, &mut diagnostics)? {
        builder = builder.plan(plan);
    }
    for dimension in read_dimensions(&lines)? {
        builder = builder.dimension(dimension);
    }
    for object in read_objects(&lines)? {
        builder = builder.object(object);
    }
    builder = builder.vouchers(read_vouchers(&lines, &mut diagnostics)?);

    Ok(Parsed {
        document: builder.build()?,
        diagnostics,
    })
}

fn first<'l, 'a>(lines: &'l [Line<'a>], tag: &str) -> Option<&'l Line<'a>> {
    lines.iter().find(|l| l.tag() == tag)
}

fn all<'l, 'a: 'l>(lines: &'l [Line<'a>], tag: &'l str) -> impl Iterator<Item = &'l Line<'a>> {
    lines.iter().filter(move |l| l.tag() == tag)
}

/// Resolve the variant. Code 4 is export when any balance tag is present.
pub fn detect_variant(lines: &[Line<'_>]) -> Result<DocumentType> {
    let Some(line) = first(lines, "#SIETYP") else {
        return Ok(DocumentType::default());
    };
    let code: u8 = line.int(1, "type")?;
    let has_balances = lines.iter().any(|l| BALANCE_TAGS.contains(&l.tag()));
    let variant = DocumentType::from_code(code, has_balances).ok_or_else(|| {
        line.error(SieError::new(
            ErrorKind::UnsupportedVariant,
            format!("unknown SIE type {code}"),
        ))
    })?;
    debug!("variant {variant:?} (code {code}, balances: {has_balances})");
    Ok(variant)
}

fn read_meta(lines: &[Line<'_>]) -> Result<MetaData> {
    let mut meta = MetaData {
        document_type: detect_variant(lines)?,
        ..Default::default()
    };

    if let Some(l) = first(lines, "#FLAGGA") {
        meta.read = l.text(1).as_deref() == Some("1");
    }
    if let Some(l) = first(lines, "#PROGRAM") {
        meta.program = Program {
            name: l.string(1),
            version: l.text(2),
        };
    }
    if let Some(l) = first(lines, "#GEN") {
        meta.generated = Some(Generated {
            date: l.date(1, "date")?,
            signature: l.text(2),
        });
    }
    meta.comment = first(lines, "#PROSA").and_then(|l| l.text(1));
    meta.company = read_company(lines);
    if let Some(l) = first(lines, "#TAXAR") {
        meta.taxation_year = Some(l.int(1, "year")?);
    }
    if let Some(l) = first(lines, "#OMFATTN") {
        meta.period_range_end = Some(l.date(1, "date")?);
    }
    meta.currency = first(lines, "#VALUTA").and_then(|l| l.text(1));

    meta.financial_years = all(lines, "#RAR")
        .map(|l| {
            Ok(FinancialYear {
                index: l.int(1, "year index")?,
                start: l.date(2, "start date")?,
                end: l.date(3, "end date")?,
            })
        })
        .collect::<Result<_>>()?;
    FinancialYear::check_contiguous(&meta.financial_years)?;

    Ok(meta)
}

fn read_company(lines: &[Line<'_>]) -> Company {
    Company {
        name: first(lines, "#FNAMN").map(|l| l.string(1)).unwrap_or_default(),
        id: first(lines, "#FNR").and_then(|l| l.text(1)),
        legal_form: first(lines, "#FTYP").map(|l| LegalForm::from_code(l.text(1).as_deref())),
        corporate_id: first(lines, "#ORGNR").and_then(|l| l.text(1)),
        industry_code: first(lines, "#BKOD").and_then(|l| l.text(1)),
        address: first(lines, "#ADRESS").map(|l| Address {
            contact: l.string(1),
            street: l.string(2),
            postal: l.string(3),
            phone: l.string(4),
        }),
    }
}

fn read_plan(
    lines: &[Line<'_>],
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Option<AccountingPlan>> {
    let mut accounts: BTreeMap<String, Account> = BTreeMap::new();

    for line in lines {
        match line.tag() {
            "#KONTO" => {
                let number = line.required(1, "account number")?;
                let account = accounts
                    .entry(number.clone())
                    .or_insert_with(|| Account::new(number, ""));
                account.label = line.string(2);
                account.source = line.source();
            }
            "#KTYP" => {
                let number = line.required(1, "account number")?;
                let code = line.string(2);
                match AccountType::from_code(&code) {
                    Some(kind) => account_mut(&mut accounts, number).account_type = Some(kind),
                    None => diagnostics.push(
                        Diagnostic::warning(
                            Origin::Account,
                            format!("unknown account type '{code}' for account {number}"),
                        )
                        .with_tag("#KTYP")
                        .with_line(Some(line.raw)),
                    ),
                }
            }
            "#ENHET" => {
                let number = line.required(1, "account number")?;
                account_mut(&mut accounts, number).unit = line.text(2);
            }
            "#SRU" => {
                let number = line.required(1, "account number")?;
                let code = line.required(2, "SRU code")?;
                account_mut(&mut accounts, number).sru_codes.push(code);
            }
            "#IB" | "#UB" | "#RES" => {
                let kind = match line.tag() {
                    "#IB" => BalanceKind::Opening,
                    "#UB" => BalanceKind::Closing,
                    _ => BalanceKind::Result,
                };
                let number = line.required(2, "account number")?;
                let balance = Balance {
                    year_index: line.int(1, "year index")?,
                    amount: line.amount(3)?,
                    quantity: line.quantity(4, Origin::Balance, diagnostics),
                    source: line.source(),
                };
                if let Err(rejected) =
                    account_mut(&mut accounts, number.clone()).add_balance(kind, balance)
                {
                    diagnostics.push(duplicate(line, &number, rejected.year_index));
                }
            }
            "#OIB" | "#OUB" => {
                let kind = if line.tag() == "#OIB" {
                    BalanceKind::Opening
                } else {
                    BalanceKind::Closing
                };
                let number = line.required(2, "account number")?;
                let object = line.single_object(3)?.ok_or_else(|| {
                    line.error(SieError::missing(line.tag(), "object reference"))
                })?;
                let balance = ObjectBalance {
                    year_index: line.int(1, "year index")?,
                    object,
                    amount: line.amount(4)?,
                    quantity: line.quantity(5, Origin::Balance, diagnostics),
                    source: line.source(),
                };
                if let Err(rejected) =
                    account_mut(&mut accounts, number.clone()).add_object_balance(kind, balance)
                {
                    diagnostics.push(duplicate(line, &number, rejected.year_index));
                }
            }
            "#PSALDO" => {
                let number = line.required(3, "account number")?;
                let balance = PeriodicalBalance {
                    year_index: line.int(1, "year index")?,
                    period: line.period(2)?,
                    object: line.single_object(4)?,
                    amount: line.amount(5)?,
                    quantity: line.quantity(6, Origin::Balance, diagnostics),
                };
                if let Err(rejected) =
                    account_mut(&mut accounts, number.clone()).add_periodical_balance(balance)
                {
                    diagnostics.push(duplicate(line, &number, rejected.year_index));
                }
            }
            "#PBUDGET" => {
                let number = line.required(3, "account number")?;
                let budget = PeriodicalBudget {
                    year_index: line.int(1, "year index")?,
                    period: line.period(2)?,
                    object: line.single_object(4)?,
                    amount: line.amount(5)?,
                    quantity: line.quantity(6, Origin::Balance, diagnostics),
                };
                if let Err(rejected) =
                    account_mut(&mut accounts, number.clone()).add_periodical_budget(budget)
                {
                    diagnostics.push(duplicate(line, &number, rejected.year_index));
                }
            }
            _ => {}
        }
    }

    let plan_type = first(lines, "#KPTYP").and_then(|l| l.text(1));
    if accounts.is_empty() && plan_type.is_none() {
        return Ok(None);
    }
    Ok(Some(AccountingPlan {
        plan_type,
        accounts: accounts.into_values().collect(),
    }))
}

/// Accounts referenced before (or without) their `#KONTO` line get a blank label.
fn account_mut(accounts: &mut BTreeMap<String, Account>, number: String) -> &mut Account {
    accounts
        .entry(number.clone())
        .or_insert_with(|| Account::new(number, ""))
}

fn duplicate(line: &Line<'_>, account: &str, year_index: i32) -> Diagnostic {
    Diagnostic::warning(
        Origin::Balance,
        format!(
            "duplicate {} for account {account} and year {year_index} rejected, keeping the first",
            line.tag()
        ),
    )
    .with_tag(line.tag().to_string())
    .with_line(Some(line.raw))
}

fn read_dimensions(lines: &[Line<'_>]) -> Result<Vec<AccountingDimension>> {
    lines
        .iter()
        .filter(|l| l.tag() == "#DIM" || l.tag() == "#UNDERDIM")
        .map(|l| {
            let parent = if l.tag() == "#UNDERDIM" {
                Some(l.int(3, "parent dimension")?)
            } else {
                None
            };
            Ok(AccountingDimension {
                id: l.int(1, "dimension")?,
                label: l.string(2),
                parent,
            })
        })
        .collect()
}

fn read_objects(lines: &[Line<'_>]) -> Result<Vec<AccountingObject>> {
    all(lines, "#OBJEKT")
        .map(|l| {
            Ok(AccountingObject {
                dimension: l.int(1, "dimension")?,
                number: l.required(2, "object number")?,
                label: l.string(3),
            })
        })
        .collect()
}

/// Parse-time context for voucher blocks.
#[derive(Debug)]
enum State {
    Header,
    InVoucher(Voucher),
    Done,
}

/// Fold the line stream through [`step`]; `None` marks end of input.
fn read_vouchers(lines: &[Line<'_>], diagnostics: &mut Vec<Diagnostic>) -> Result<Vec<Voucher>> {
    let mut vouchers = Vec::new();
    let mut events = lines.iter().map(Some).chain(iter::once(None));
    let state = events.try_fold(State::Header, |state, line| {
        step(state, line, &mut vouchers, diagnostics)
    })?;
    debug_assert!(matches!(state, State::Done));
    Ok(vouchers)
}

fn step(
    state: State,
    line: Option<&Line<'_>>,
    vouchers: &mut Vec<Voucher>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<State> {
    let Some(line) = line else {
        if let State::InVoucher(voucher) = state {
            vouchers.push(voucher);
        }
        return Ok(State::Done);
    };
    trace!("line {}: {} in {}", line.number, line.tag(), state_name(&state));

    match (state, line.tag()) {
        (State::Done, _) => Ok(State::Done),
        (state, "#VER") => {
            if let State::InVoucher(previous) = state {
                vouchers.push(previous);
            }
            Ok(State::InVoucher(read_voucher(line, diagnostics)?))
        }
        (State::Header, "#TRANS") => Err(line.error(SieError::new(
            ErrorKind::TransactionWithoutVoucher,
            format!("transaction without voucher on line {}", line.number),
        ))),
        (State::InVoucher(mut voucher), "#TRANS") => {
            let transaction = read_transaction(line, &voucher, diagnostics)?;
            voucher.transactions.push(transaction);
            Ok(State::InVoucher(voucher))
        }
        (State::InVoucher(voucher), "}") => {
            vouchers.push(voucher);
            Ok(State::Header)
        }
        (state, _) => Ok(state),
    }
}

fn state_name(state: &State) -> &'static str {
    match state {
        State::Header => "header",
        State::InVoucher(_) => "voucher",
        State::Done => "done",
    }
}

fn read_voucher(line: &Line<'_>, diagnostics: &mut Vec<Diagnostic>) -> Result<Voucher> {
    let number = match line.text(2) {
        Some(n) => Some(
            n.parse()
                .map_err(|_| line.error(SieError::invalid("#VER", "voucher number", &n)))?,
        ),
        None => None,
    };
    Ok(Voucher {
        series: line.text(1),
        number,
        date: line.date(3, "date")?,
        text: line.text(4),
        registration_date: line.optional_date(5, "registration date", Origin::Voucher, diagnostics),
        signature: line.text(6),
        transactions: Vec::new(),
        source: line.source(),
    })
}

/// `#TRANS account {objects} amount [date] [text] [quantity] [sign]`.
///
/// Some exporters leave out the object list entirely; the remaining fields
/// then shift one position left.
fn read_transaction(
    line: &Line<'_>,
    voucher: &Voucher,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Transaction> {
    // an object list in first position means the account was left out
    if line.token(1).is_some_and(|t| t.starts_with('{')) {
        return Err(line.error(SieError::missing("#TRANS", "account number")));
    }
    let account = line.required(1, "account number")?;
    let has_objects = line.token(2).is_some_and(|t| t.starts_with('{'));
    let (objects, at) = if has_objects {
        (line.objects(2)?, 3)
    } else {
        (Vec::new(), 2)
    };
    Ok(Transaction {
        account,
        amount: line.amount(at)?,
        date: line
            .optional_date(at + 1, "transaction date", Origin::Transaction, diagnostics)
            .or(Some(voucher.date)),
        text: line.text(at + 2),
        quantity: line.quantity(at + 3, Origin::Transaction, diagnostics),
        signature: line.text(at + 4),
        objects,
        source: line.source(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_without_object_list_shifts_fields() {
        let text = "#SIETYP 4\n#VER A 1 20230105\n{\n\
                    #TRANS 1910 100.00 20230106 \"x\"\n#TRANS 2440 -100.00\n}";
        let parsed = read_text(text).unwrap();
        let v = &parsed.document.vouchers()[0];
        assert_eq!(v.transactions[0].account, "1910");
        assert_eq!(v.transactions[0].date, NaiveDate::from_ymd_opt(2023, 1, 6));
        assert_eq!(v.transactions[0].text.as_deref(), Some("x"));
        assert_eq!(v.transactions[1].date, Some(v.date));
    }

    #[test]
    fn stray_closing_brace_is_ignored() {
        let parsed = read_text("#SIETYP 4\n}\n#VER \"\" \"\" 20230105\n{\n}").unwrap();
        assert_eq!(parsed.document.vouchers().len(), 1);
        assert_eq!(parsed.document.vouchers()[0].series, None);
        assert_eq!(parsed.document.vouchers()[0].number, None);
    }

    #[test]
    fn unparseable_quantity_is_dropped_with_warning() {
        let parsed =
            read_text("#SIETYP 4\n#VER A 1 20230105\n{\n#TRANS 1910 {} 1.00 \"\" \"\" many\n}")
                .unwrap();
        assert_eq!(parsed.document.vouchers()[0].transactions[0].quantity, None);
        assert_eq!(parsed.diagnostics.len(), 1);
    }
}
