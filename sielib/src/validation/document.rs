use super::{
    AccountingPlanValidator, Context, Diagnostic, MetaDataValidator, Origin, Validator,
    VoucherValidator,
};
use crate::model::Document;
use log::debug;

/// Header, plan, then vouchers with their transactions.
pub struct DocumentValidator;

impl Validator for DocumentValidator {
    type Entity = Document;

    fn validate(&self, doc: &Document, ctx: &Context<'_>, out: &mut Vec<Diagnostic>) {
        let before = out.len();

        MetaDataValidator.validate(doc.meta(), ctx, out);
        match doc.plan() {
            Some(plan) => AccountingPlanValidator.validate(plan, ctx, out),
            None if ctx.variant.carries_balances() => out.push(
                Diagnostic::warning(Origin::AccountingPlan, "no accounts declared")
                    .with_tag("#KONTO"),
            ),
            None => {}
        }
        for voucher in doc.vouchers() {
            VoucherValidator.validate(voucher, ctx, out);
        }

        debug!(
            "validated '{}': {} findings",
            doc.meta().company.name,
            out.len() - before
        );
    }
}
