use super::dimension::{AccountingDimension, AccountingObject};
use super::meta::{FinancialYear, MetaData};
use super::plan::{Account, AccountingPlan};
use super::voucher::{Transaction, Voucher};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// The root aggregate. Immutable once built; see [`DocumentBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    meta: MetaData,
    plan: Option<AccountingPlan>,
    vouchers: Vec<Voucher>,
    dimensions: Vec<AccountingDimension>,
    objects: Vec<AccountingObject>,
}

impl Document {
    pub fn builder(meta: MetaData) -> DocumentBuilder {
        DocumentBuilder::new(meta)
    }

    pub fn meta(&self) -> &MetaData {
        &self.meta
    }

    pub fn plan(&self) -> Option<&AccountingPlan> {
        self.plan.as_ref()
    }

    pub fn accounts(&self) -> &[Account] {
        self.plan.as_ref().map_or(&[], |p| p.accounts.as_slice())
    }

    pub fn account(&self, number: &str) -> Option<&Account> {
        self.plan.as_ref().and_then(|p| p.account(number))
    }

    /// Vouchers ordered by series, number and date.
    pub fn vouchers(&self) -> &[Voucher] {
        &self.vouchers
    }

    pub fn dimensions(&self) -> &[AccountingDimension] {
        &self.dimensions
    }

    pub fn objects(&self) -> &[AccountingObject] {
        &self.objects
    }

    pub fn dimension(&self, id: u32) -> Option<&AccountingDimension> {
        self.dimensions.iter().find(|d| d.id == id)
    }

    pub fn object(&self, dimension: u32, number: &str) -> Option<&AccountingObject> {
        self.objects
            .iter()
            .find(|o| o.dimension == dimension && o.number == number)
    }

    /// All transactions booked on `account`, in voucher order.
    pub fn transactions_for<'a>(
        &'a self,
        account: &'a str,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.vouchers
            .iter()
            .flat_map(|v| v.transactions.iter())
            .filter(move |t| t.account == account)
    }

    /// True when every voucher sums to zero.
    pub fn is_balanced(&self) -> bool {
        self.vouchers.iter().all(Voucher::is_balanced)
    }
}

/// Programmatic construction of a [`Document`].
///
/// The text reader ends in the same [`DocumentBuilder::build`], so both paths
/// get the same year checks and the same canonical ordering.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    meta: MetaData,
    plan: Option<AccountingPlan>,
    vouchers: Vec<Voucher>,
    dimensions: Vec<AccountingDimension>,
    objects: Vec<AccountingObject>,
}

impl DocumentBuilder {
    pub fn new(meta: MetaData) -> Self {
        Self {
            meta,
            plan: None,
            vouchers: Vec::new(),
            dimensions: Vec::new(),
            objects: Vec::new(),
        }
    }

    pub fn plan(mut self, plan: AccountingPlan) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn voucher(mut self, voucher: Voucher) -> Self {
        self.vouchers.push(voucher);
        self
    }

    pub fn vouchers(mut self, vouchers: impl IntoIterator<Item = Voucher>) -> Self {
        self.vouchers.extend(vouchers);
        self
    }

    pub fn dimension(mut self, dimension: AccountingDimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    pub fn object(mut self, object: AccountingObject) -> Self {
        self.objects.push(object);
        self
    }

    /// Fails when the financial years do not form a contiguous chain.
    pub fn build(self) -> Result<Document> {
        let DocumentBuilder {
            mut meta,
            mut plan,
            mut vouchers,
            mut dimensions,
            mut objects,
        } = self;

        FinancialYear::check_contiguous(&meta.financial_years)?;
        meta.financial_years.sort_by(|a, b| b.index.cmp(&a.index));

        if let Some(plan) = plan.as_mut() {
            plan.canonicalize();
        }
        vouchers.sort_by(Voucher::cmp_key);
        dimensions.sort_by_key(|d| d.id);
        objects.sort_by(|a, b| {
            a.dimension
                .cmp(&b.dimension)
                .then_with(|| a.number.cmp(&b.number))
        });

        Ok(Document {
            meta,
            plan,
            vouchers,
            dimensions,
            objects,
        })
    }
}
