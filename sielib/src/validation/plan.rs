use super::{Context, Diagnostic, Origin, Severity, Validator};
use crate::model::{checked_sum, money, Account, AccountingPlan, Balance, DocumentType};
use rust_decimal::Decimal;

/// Runs [`AccountValidator`] and [`BalanceValidator`] over every account.
pub struct AccountingPlanValidator;

impl Validator for AccountingPlanValidator {
    type Entity = AccountingPlan;

    fn validate(&self, plan: &AccountingPlan, ctx: &Context<'_>, out: &mut Vec<Diagnostic>) {
        if plan.accounts.is_empty() {
            out.push(Diagnostic::info(Origin::AccountingPlan, "accounting plan has no accounts"));
        }
        for account in &plan.accounts {
            AccountValidator.validate(account, ctx, out);
            BalanceValidator.validate(account, ctx, out);
        }
    }
}

pub struct AccountValidator;

impl Validator for AccountValidator {
    type Entity = Account;

    fn validate(&self, account: &Account, ctx: &Context<'_>, out: &mut Vec<Diagnostic>) {
        let line = account.source.get();
        let number = account.number.trim();

        if number.is_empty() {
            out.push(
                Diagnostic::critical(Origin::Account, "account number is blank")
                    .with_tag("#KONTO")
                    .with_line(line),
            );
        } else if !account.is_numeric() {
            let severity = if ctx.variant == DocumentType::I4 {
                Severity::Critical
            } else {
                Severity::Warning
            };
            out.push(
                Diagnostic::new(
                    Origin::Account,
                    severity,
                    format!("account number '{number}' is not numeric"),
                )
                .with_tag("#KONTO")
                .with_line(line),
            );
        } else if number.len() < 4 {
            out.push(
                Diagnostic::info(
                    Origin::Account,
                    format!("account number {number} is shorter than four digits"),
                )
                .with_tag("#KONTO")
                .with_line(line),
            );
        }

        if account.label.trim().is_empty() {
            out.push(
                Diagnostic::info(Origin::Account, format!("account {number} has no label"))
                    .with_tag("#KONTO")
                    .with_line(line),
            );
        }

        for code in &account.sru_codes {
            if !code.bytes().all(|b| b.is_ascii_digit()) {
                out.push(
                    Diagnostic::warning(
                        Origin::Account,
                        format!("SRU code '{code}' of account {number} is not numeric"),
                    )
                    .with_tag("#SRU"),
                );
            }
        }

        if ctx.variant == DocumentType::I4 && account.has_balances() {
            out.push(
                Diagnostic::warning(
                    Origin::Balance,
                    format!("account {number} carries balances in an import file"),
                )
                .with_line(line),
            );
        } else if !ctx.variant.carries_periodical_balances()
            && !account.periodical_balances.is_empty()
        {
            out.push(
                Diagnostic::warning(
                    Origin::Balance,
                    format!("account {number} has periodical balances in a {:?} file", ctx.variant),
                )
                .with_tag("#PSALDO")
                .with_line(line),
            );
        }
    }
}

/// Reconciles current-year balances of an export file against its vouchers:
/// `UB = IB + sum` and `RES = sum`.
pub struct BalanceValidator;

impl Validator for BalanceValidator {
    type Entity = Account;

    fn validate(&self, account: &Account, ctx: &Context<'_>, out: &mut Vec<Diagnostic>) {
        let Some(doc) = ctx.document else {
            return;
        };
        if ctx.variant != DocumentType::E4 {
            return;
        }
        if account.closing(0).is_none() && account.result(0).is_none() {
            return;
        }

        let booked = checked_sum(doc.transactions_for(&account.number).map(|t| t.amount));
        let Some(booked) = booked else {
            out.push(overflow(account));
            return;
        };
        let opening = account.opening(0).map_or(Decimal::ZERO, |b| b.amount);

        if let Some(closing) = account.closing(0) {
            match opening.checked_add(booked) {
                Some(expected) => reconcile(account, closing, "#UB", money(expected), out),
                None => out.push(overflow(account)),
            }
        }
        if let Some(result) = account.result(0) {
            reconcile(account, result, "#RES", booked, out);
        }
    }
}

fn overflow(account: &Account) -> Diagnostic {
    Diagnostic::critical(
        Origin::Balance,
        format!("account {} year 0: balance overflows", account.number),
    )
}

fn reconcile(
    account: &Account,
    stated: &Balance,
    tag: &str,
    computed: Decimal,
    out: &mut Vec<Diagnostic>,
) {
    if money(stated.amount) == computed {
        return;
    }
    out.push(
        Diagnostic::warning(
            Origin::Balance,
            format!(
                "account {} year {}: {tag} is {} but opening balance and transactions give {}",
                account.number,
                stated.year_index,
                money(stated.amount),
                computed
            ),
        )
        .with_tag(tag)
        .with_line(stated.source.get()),
    );
}
