use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fraction digits every amount is kept at.
pub const SCALE: u32 = 2;

/// Normalize an amount to [`SCALE`] using banker's rounding.
///
/// Checksums and round trips compare rendered text, so every amount that
/// enters the model goes through here.
pub fn money(d: Decimal) -> Decimal {
    let mut rounded = d.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(SCALE);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Sum of `amounts` at [`SCALE`]. `None` when the total does not fit a `Decimal`.
pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .map(money)
}

/// Parse an amount token, accepting a decimal comma.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(&s.replace(',', ".")).ok().map(money)
}

/// A calendar month, written `yyyyMM` in the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn parse(s: &str) -> Option<Self> {
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Self::new(s[..4].parse().ok()?, s[4..].parse().ok()?)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

/// Verbatim source line an entity was built from.
///
/// Purely an annotation for diagnostics: it never takes part in equality and
/// is not serialized.
#[derive(Debug, Clone, Default)]
pub struct SourceLine(Option<String>);

impl SourceLine {
    pub fn new(line: impl Into<String>) -> Self {
        Self(Some(line.into()))
    }

    pub fn get(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl PartialEq for SourceLine {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_rounds_half_even() {
        assert_eq!(money(Decimal::from_str("0.125").unwrap()).to_string(), "0.12");
        assert_eq!(money(Decimal::from_str("0.135").unwrap()).to_string(), "0.14");
        assert_eq!(money(Decimal::from_str("-12513").unwrap()).to_string(), "-12513.00");
        assert_eq!(money(Decimal::from_str("-0.001").unwrap()).to_string(), "0.00");
    }

    #[test]
    fn checked_sum_reports_overflow() {
        let parts = ["1.005", "2.00", "-0.5"].map(|s| Decimal::from_str(s).unwrap());
        assert_eq!(checked_sum(parts).unwrap().to_string(), "2.50");
        assert_eq!(checked_sum([Decimal::MAX, Decimal::MAX]), None);
        assert_eq!(checked_sum([]), Some(money(Decimal::ZERO)));
    }

    #[test]
    fn amount_accepts_decimal_comma() {
        assert_eq!(parse_amount("1000,5").unwrap().to_string(), "1000.50");
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn period_parse_and_display() {
        let p = Period::parse("202303").unwrap();
        assert_eq!(p, Period { year: 2023, month: 3 });
        assert_eq!(p.to_string(), "202303");
        assert!(Period::parse("202313").is_none());
        assert!(Period::parse("2023-1").is_none());
    }
}
