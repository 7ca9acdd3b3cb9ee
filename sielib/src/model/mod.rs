//! Domain model of an SIE document.
//!
//! Entities are plain values with public fields; the root [`Document`] owns
//! them and only hands out shared references once built.

mod amount;
mod dimension;
mod document;
mod meta;
mod plan;
mod voucher;

pub use amount::{checked_sum, money, parse_amount, Period, SourceLine, SCALE};
pub use dimension::{AccountingDimension, AccountingObject, ObjectKind, ObjectReference};
pub use document::{Document, DocumentBuilder};
pub use meta::{
    Address, Company, DocumentType, FinancialYear, Generated, LegalForm, MetaData, Program,
};
pub use plan::{
    Account, AccountType, AccountingPlan, Balance, BalanceKind, ObjectBalance, PeriodicalBalance,
    PeriodicalBudget,
};
pub use voucher::{Transaction, Voucher};
