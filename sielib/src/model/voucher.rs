use super::amount::{checked_sum, money, SourceLine};
use super::dimension::ObjectReference;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// `#TRANS` inside a voucher block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub account: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    pub text: Option<String>,
    pub quantity: Option<f64>,
    pub signature: Option<String>,
    pub objects: Vec<ObjectReference>,
    #[serde(skip)]
    pub source: SourceLine,
}

impl Transaction {
    pub fn new(account: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account: account.into(),
            amount: money(amount),
            date: None,
            text: None,
            quantity: None,
            signature: None,
            objects: Vec::new(),
            source: SourceLine::default(),
        }
    }
}

/// `#VER` and the transactions between its braces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voucher {
    pub series: Option<String>,
    pub number: Option<u64>,
    pub date: NaiveDate,
    pub text: Option<String>,
    pub registration_date: Option<NaiveDate>,
    pub signature: Option<String>,
    pub transactions: Vec<Transaction>,
    #[serde(skip)]
    pub source: SourceLine,
}

impl Voucher {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            series: None,
            number: None,
            date,
            text: None,
            registration_date: None,
            signature: None,
            transactions: Vec::new(),
            source: SourceLine::default(),
        }
    }

    /// Sum of all transaction amounts at fixed scale, `None` on overflow.
    pub fn diff(&self) -> Option<Decimal> {
        checked_sum(self.transactions.iter().map(|t| t.amount))
    }

    pub fn is_balanced(&self) -> bool {
        self.diff().is_some_and(|d| d.is_zero())
    }

    /// Ordering by series, number, date. Absent series or number sort first.
    pub fn cmp_key(&self, other: &Voucher) -> Ordering {
        self.series
            .cmp(&other.series)
            .then(self.number.cmp(&other.number))
            .then(self.date.cmp(&other.date))
    }

    /// Voucher label as used in messages, e.g. `A 12 2023-01-05`.
    pub fn display_id(&self) -> String {
        let mut parts = Vec::new();
        if let Some(series) = &self.series {
            parts.push(series.clone());
        }
        if let Some(number) = self.number {
            parts.push(number.to_string());
        }
        parts.push(self.date.to_string());
        parts.join(" ")
    }
}
