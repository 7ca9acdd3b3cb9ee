use super::{Context, Diagnostic, Origin, Validator};
use crate::model::{DocumentType, ObjectKind, Transaction, Voucher};

/// A voucher and, through [`TransactionValidator`], its transactions.
pub struct VoucherValidator;

impl Validator for VoucherValidator {
    type Entity = Voucher;

    fn validate(&self, voucher: &Voucher, ctx: &Context<'_>, out: &mut Vec<Diagnostic>) {
        let id = voucher.display_id();
        let line = voucher.source.get();
        let diag = |d: Diagnostic| d.with_tag("#VER").with_line(line);

        if !ctx.variant.carries_vouchers() {
            out.push(diag(Diagnostic::warning(
                Origin::Voucher,
                format!("voucher {id} in a {:?} file", ctx.variant),
            )));
        }
        let unnumbered = voucher.series.is_none() || voucher.number.is_none();
        if ctx.variant == DocumentType::E4 && unnumbered {
            out.push(diag(Diagnostic::warning(
                Origin::Voucher,
                format!("voucher {id} has no series or number"),
            )));
        }

        if voucher.transactions.is_empty() {
            out.push(diag(Diagnostic::info(
                Origin::Voucher,
                format!("voucher {id} has no transactions"),
            )));
        } else {
            match voucher.diff() {
                None => out.push(diag(Diagnostic::critical(
                    Origin::Voucher,
                    format!("amounts of voucher {id} overflow"),
                ))),
                Some(diff) if !diff.is_zero() => out.push(diag(Diagnostic::critical(
                    Origin::Voucher,
                    format!("voucher {id} does not balance, off by {diff}"),
                ))),
                Some(_) => {}
            }
        }

        let current = ctx.document.and_then(|d| d.meta().current_year());
        if let Some(year) = current {
            if !year.contains(voucher.date) {
                out.push(diag(Diagnostic::warning(
                    Origin::Voucher,
                    format!(
                        "voucher {id} is dated outside the current financial year {} - {}",
                        year.start, year.end
                    ),
                )));
            }
        }

        for transaction in &voucher.transactions {
            TransactionValidator.validate(transaction, ctx, out);
        }
    }
}

pub struct TransactionValidator;

impl Validator for TransactionValidator {
    type Entity = Transaction;

    fn validate(&self, t: &Transaction, ctx: &Context<'_>, out: &mut Vec<Diagnostic>) {
        let line = t.source.get();
        let diag = |d: Diagnostic| d.with_tag("#TRANS").with_line(line);

        if t.account.trim().is_empty() {
            out.push(diag(Diagnostic::critical(
                Origin::Transaction,
                "transaction has no account",
            )));
            return;
        }

        let Some(doc) = ctx.document else {
            return;
        };
        if doc.account(&t.account).is_none() {
            out.push(diag(Diagnostic::warning(
                Origin::Transaction,
                format!("account {} is not in the accounting plan", t.account),
            )));
        }
        for object in &t.objects {
            let declared = doc.dimension(object.dimension).is_some();
            if !declared && matches!(object.kind(), ObjectKind::Other(_)) {
                out.push(diag(Diagnostic::warning(
                    Origin::Dimension,
                    format!("unknown dimension {}", object.dimension),
                )));
            } else if doc.object(object.dimension, &object.number).is_none() {
                out.push(diag(Diagnostic::warning(
                    Origin::Dimension,
                    format!(
                        "unknown object '{}' in dimension {}",
                        object.number, object.dimension
                    ),
                )));
            }
        }
    }
}
