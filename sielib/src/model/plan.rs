use super::amount::{Period, SourceLine};
use super::dimension::ObjectReference;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `#KTYP`: T, S, K or I.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    Asset,
    Liability,
    Cost,
    Income,
}

impl AccountType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "T" => Some(AccountType::Asset),
            "S" => Some(AccountType::Liability),
            "K" => Some(AccountType::Cost),
            "I" => Some(AccountType::Income),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            AccountType::Asset => "T",
            AccountType::Liability => "S",
            AccountType::Cost => "K",
            AccountType::Income => "I",
        }
    }
}

/// Which of the three yearly balance lists a balance belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BalanceKind {
    Opening,
    Closing,
    Result,
}

impl BalanceKind {
    pub fn tag(self) -> &'static str {
        match self {
            BalanceKind::Opening => "#IB",
            BalanceKind::Closing => "#UB",
            BalanceKind::Result => "#RES",
        }
    }
}

/// `#IB`, `#UB` or `#RES` for one account and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub year_index: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub quantity: Option<f64>,
    #[serde(skip)]
    pub source: SourceLine,
}

/// `#OIB` / `#OUB`: a yearly balance split by cost object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectBalance {
    pub year_index: i32,
    pub object: ObjectReference,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub quantity: Option<f64>,
    #[serde(skip)]
    pub source: SourceLine,
}

/// `#PSALDO`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicalBalance {
    pub year_index: i32,
    pub period: Period,
    pub object: Option<ObjectReference>,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub quantity: Option<f64>,
}

/// `#PBUDGET`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicalBudget {
    pub year_index: i32,
    pub period: Period,
    pub object: Option<ObjectReference>,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub quantity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub number: String,
    pub label: String,
    pub account_type: Option<AccountType>,
    pub unit: Option<String>,
    pub sru_codes: Vec<String>,
    pub opening_balances: Vec<Balance>,
    pub closing_balances: Vec<Balance>,
    pub results: Vec<Balance>,
    pub object_opening_balances: Vec<ObjectBalance>,
    pub object_closing_balances: Vec<ObjectBalance>,
    pub periodical_balances: Vec<PeriodicalBalance>,
    pub periodical_budgets: Vec<PeriodicalBudget>,
    #[serde(skip)]
    pub source: SourceLine,
}

impl Account {
    pub fn new(number: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn balances(&self, kind: BalanceKind) -> &[Balance] {
        match kind {
            BalanceKind::Opening => &self.opening_balances,
            BalanceKind::Closing => &self.closing_balances,
            BalanceKind::Result => &self.results,
        }
    }

    pub fn balance(&self, kind: BalanceKind, year_index: i32) -> Option<&Balance> {
        self.balances(kind).iter().find(|b| b.year_index == year_index)
    }

    pub fn opening(&self, year_index: i32) -> Option<&Balance> {
        self.balance(BalanceKind::Opening, year_index)
    }

    pub fn closing(&self, year_index: i32) -> Option<&Balance> {
        self.balance(BalanceKind::Closing, year_index)
    }

    pub fn result(&self, year_index: i32) -> Option<&Balance> {
        self.balance(BalanceKind::Result, year_index)
    }

    /// Add a yearly balance unless one already exists for that year.
    ///
    /// Returns the rejected balance on conflict; the first one stays.
    pub fn add_balance(
        &mut self,
        kind: BalanceKind,
        balance: Balance,
    ) -> std::result::Result<(), Balance> {
        if self.balance(kind, balance.year_index).is_some() {
            return Err(balance);
        }
        match kind {
            BalanceKind::Opening => self.opening_balances.push(balance),
            BalanceKind::Closing => self.closing_balances.push(balance),
            BalanceKind::Result => self.results.push(balance),
        }
        Ok(())
    }

    pub fn add_object_balance(
        &mut self,
        kind: BalanceKind,
        balance: ObjectBalance,
    ) -> std::result::Result<(), ObjectBalance> {
        let list = match kind {
            BalanceKind::Opening => &mut self.object_opening_balances,
            BalanceKind::Closing => &mut self.object_closing_balances,
            BalanceKind::Result => return Err(balance),
        };
        if list
            .iter()
            .any(|b| b.year_index == balance.year_index && b.object == balance.object)
        {
            return Err(balance);
        }
        list.push(balance);
        Ok(())
    }

    pub fn add_periodical_balance(
        &mut self,
        balance: PeriodicalBalance,
    ) -> std::result::Result<(), PeriodicalBalance> {
        let duplicate = self.periodical_balances.iter().any(|b| {
            b.year_index == balance.year_index
                && b.period == balance.period
                && b.object == balance.object
        });
        if duplicate {
            return Err(balance);
        }
        self.periodical_balances.push(balance);
        Ok(())
    }

    pub fn add_periodical_budget(
        &mut self,
        budget: PeriodicalBudget,
    ) -> std::result::Result<(), PeriodicalBudget> {
        let duplicate = self.periodical_budgets.iter().any(|b| {
            b.year_index == budget.year_index
                && b.period == budget.period
                && b.object == budget.object
        });
        if duplicate {
            return Err(budget);
        }
        self.periodical_budgets.push(budget);
        Ok(())
    }

    pub fn has_balances(&self) -> bool {
        !(self.opening_balances.is_empty()
            && self.closing_balances.is_empty()
            && self.results.is_empty()
            && self.object_opening_balances.is_empty()
            && self.object_closing_balances.is_empty()
            && self.periodical_balances.is_empty())
    }

    /// Numeric account numbers are the norm; everything else is legal but suspect.
    pub fn is_numeric(&self) -> bool {
        !self.number.is_empty() && self.number.bytes().all(|b| b.is_ascii_digit())
    }

    pub(crate) fn canonicalize(&mut self) {
        let by_year_desc = |a: &Balance, b: &Balance| b.year_index.cmp(&a.year_index);
        self.opening_balances.sort_by(by_year_desc);
        self.closing_balances.sort_by(by_year_desc);
        self.results.sort_by(by_year_desc);
        for list in [
            &mut self.object_opening_balances,
            &mut self.object_closing_balances,
        ] {
            list.sort_by(|a, b| {
                b.year_index
                    .cmp(&a.year_index)
                    .then_with(|| a.object.cmp(&b.object))
            });
        }
        self.periodical_balances.sort_by(|a, b| {
            b.year_index
                .cmp(&a.year_index)
                .then(a.period.cmp(&b.period))
                .then_with(|| a.object.cmp(&b.object))
        });
        self.periodical_budgets.sort_by(|a, b| {
            b.year_index
                .cmp(&a.year_index)
                .then(a.period.cmp(&b.period))
                .then_with(|| a.object.cmp(&b.object))
        });
    }
}

/// `#KPTYP` plus the `#KONTO` lines and everything hanging off them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountingPlan {
    pub plan_type: Option<String>,
    pub accounts: Vec<Account>,
}

impl AccountingPlan {
    pub fn account(&self, number: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.number == number)
    }

    pub(crate) fn canonicalize(&mut self) {
        self.accounts.sort_by(|a, b| a.number.cmp(&b.number));
        self.accounts.iter_mut().for_each(Account::canonicalize);
    }
}
