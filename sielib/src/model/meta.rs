use crate::error::{ErrorKind, Result, SieError};
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Format variant, `#SIETYP`.
///
/// Code 4 is shared by the export and the import variant; which one a file is
/// depends on whether it carries balances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    #[default]
    E1,
    E2,
    E3,
    E4,
    I4,
}

impl DocumentType {
    /// Resolve a `#SIETYP` value. `has_balances` disambiguates code 4.
    pub fn from_code(code: u8, has_balances: bool) -> Option<Self> {
        match code {
            1 => Some(DocumentType::E1),
            2 => Some(DocumentType::E2),
            3 => Some(DocumentType::E3),
            4 if has_balances => Some(DocumentType::E4),
            4 => Some(DocumentType::I4),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            DocumentType::E1 => 1,
            DocumentType::E2 => 2,
            DocumentType::E3 => 3,
            DocumentType::E4 | DocumentType::I4 => 4,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DocumentType::E1 => "Årssaldon. Innehåller årets ingående och utgående saldon för samtliga konton i kontoplanen",
            DocumentType::E2 => "Periodsaldon. Innehåller samma information som typ 1 samt dessutom periodsaldon för samtliga konton",
            DocumentType::E3 => "Objektsaldon. Identisk med typ 2 med undantag för att saldon även finns på objektsnivå",
            DocumentType::E4 => "Transaktioner. Identisk med typ 3, men innehåller även verifikationer",
            DocumentType::I4 => "Transaktioner. Import av verifikationer från andra system",
        }
    }

    pub fn is_import(self) -> bool {
        self == DocumentType::I4
    }

    /// Whether `#IB`/`#UB`/`#RES` belong in this variant.
    pub fn carries_balances(self) -> bool {
        !self.is_import()
    }

    /// Whether `#PSALDO` belongs in this variant.
    pub fn carries_periodical_balances(self) -> bool {
        matches!(self, DocumentType::E2 | DocumentType::E3 | DocumentType::E4)
    }

    /// Whether `#OIB`/`#OUB` belong in this variant.
    pub fn carries_object_balances(self) -> bool {
        matches!(self, DocumentType::E3 | DocumentType::E4)
    }

    pub fn carries_vouchers(self) -> bool {
        self.code() == 4
    }

    /// `#OMFATTN` is mandatory for the balance-only variants.
    pub fn requires_period_range(self) -> bool {
        matches!(self, DocumentType::E1 | DocumentType::E2 | DocumentType::E3)
    }
}

/// `#FTYP`. Unknown codes resolve to [`LegalForm::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegalForm {
    Aktiebolag,
    EnskildNaringsidkare,
    Handelsbolag,
    Kommanditbolag,
    EkonomiskForening,
    KooperativHyresrattsforening,
    Bostadsrattsforening,
    Bostadsforening,
    Sambruksforening,
    IdeellForening,
    Stiftelse,
    Filial,
    Bankaktiebolag,
    Medlemsbank,
    Sparbank,
    UtlandskBanksFilial,
    Forsakringsaktiebolag,
    OmsesidigtForsakringsbolag,
    Europabolag,
    Europakooperativ,
    Trossamfund,
    Other,
}

static LEGAL_FORMS: [(LegalForm, &str, &str); 22] = [
    (LegalForm::Aktiebolag, "AB", "Aktiebolag"),
    (LegalForm::EnskildNaringsidkare, "E", "Enskild näringsidkare"),
    (LegalForm::Handelsbolag, "HB", "Handelsbolag"),
    (LegalForm::Kommanditbolag, "KB", "Kommanditbolag"),
    (LegalForm::EkonomiskForening, "EK", "Ekonomisk förening"),
    (LegalForm::KooperativHyresrattsforening, "KHF", "Kooperativ hyresrättsförening"),
    (LegalForm::Bostadsrattsforening, "BRF", "Bostadsrättsförening"),
    (LegalForm::Bostadsforening, "BF", "Bostadsförening"),
    (LegalForm::Sambruksforening, "SF", "Sambruksförening"),
    (LegalForm::IdeellForening, "I", "Ideell förening som bedriver näring"),
    (LegalForm::Stiftelse, "S", "Stiftelse som bedriver näring"),
    (LegalForm::Filial, "FL", "Filial till utländskt bolag"),
    (LegalForm::Bankaktiebolag, "BAB", "Bankaktiebolag"),
    (LegalForm::Medlemsbank, "MB", "Medlemsbank"),
    (LegalForm::Sparbank, "SB", "Sparbank"),
    (LegalForm::UtlandskBanksFilial, "BFL", "Utländsk banks filial"),
    (LegalForm::Forsakringsaktiebolag, "FAB", "Försäkringsaktiebolag"),
    (LegalForm::OmsesidigtForsakringsbolag, "OFB", "Ömsesidigt försäkringsbolag"),
    (LegalForm::Europabolag, "SE", "Europabolag"),
    (LegalForm::Europakooperativ, "SCE", "Europakooperativ"),
    (LegalForm::Trossamfund, "TSF", "Trossamfund"),
    (LegalForm::Other, "X", "Annan företagsform"),
];

impl LegalForm {
    /// Total: never fails, unknown or missing codes become [`LegalForm::Other`].
    pub fn from_code(code: Option<&str>) -> Self {
        let Some(code) = code.map(str::trim) else {
            return LegalForm::Other;
        };
        LEGAL_FORMS
            .iter()
            .find(|(_, c, _)| c.eq_ignore_ascii_case(code))
            .map(|(form, _, _)| *form)
            .unwrap_or(LegalForm::Other)
    }

    pub fn code(self) -> &'static str {
        self.entry().1
    }

    pub fn description(self) -> &'static str {
        self.entry().2
    }

    fn entry(self) -> &'static (LegalForm, &'static str, &'static str) {
        // every variant has a row
        LEGAL_FORMS
            .iter()
            .find(|(form, _, _)| *form == self)
            .unwrap_or(&LEGAL_FORMS[LEGAL_FORMS.len() - 1])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generated {
    pub date: NaiveDate,
    pub signature: Option<String>,
}

/// `#ADRESS`: contact, street, postal address, phone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub contact: String,
    pub street: String,
    pub postal: String,
    pub phone: String,
}

impl Address {
    pub fn is_complete(&self) -> bool {
        [&self.contact, &self.street, &self.postal, &self.phone]
            .iter()
            .all(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub id: Option<String>,
    pub legal_form: Option<LegalForm>,
    pub corporate_id: Option<String>,
    pub industry_code: Option<String>,
    pub address: Option<Address>,
}

/// `#RAR`. Index 0 is the current year, -1 the one before, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialYear {
    pub index: i32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FinancialYear {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Check that `years` form an unbroken chain back from index 0.
    ///
    /// Indices must run 0, -1, -2, ... without holes, each year must end the
    /// day before the next newer one starts, and no year may exceed 18 months.
    pub fn check_contiguous(years: &[FinancialYear]) -> Result<()> {
        let mut sorted: Vec<&FinancialYear> = years.iter().collect();
        sorted.sort_by(|a, b| b.index.cmp(&a.index));

        for (pos, year) in sorted.iter().enumerate() {
            let expected = -(pos as i32);
            if year.index != expected {
                return Err(non_consecutive(format!(
                    "expected financial year index {expected}, found {}",
                    year.index
                )));
            }
            if year.end < year.start {
                return Err(non_consecutive(format!(
                    "financial year {} ends {} before it starts {}",
                    year.index, year.end, year.start
                )));
            }
            let limit = year.start.checked_add_months(Months::new(18));
            if limit.map_or(true, |limit| year.end >= limit) {
                return Err(non_consecutive(format!(
                    "financial year {} ({} - {}) is longer than 18 months",
                    year.index, year.start, year.end
                )));
            }
            if pos > 0 {
                let newer = sorted[pos - 1];
                if year.end.checked_add_days(Days::new(1)) != Some(newer.start) {
                    return Err(non_consecutive(format!(
                        "financial year {} ends {} but year {} starts {}",
                        year.index, year.end, newer.index, newer.start
                    )));
                }
            }
        }
        Ok(())
    }
}

fn non_consecutive(message: String) -> SieError {
    SieError::new(ErrorKind::NonConsecutiveYears, message).with_tag("#RAR")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaData {
    pub read: bool,
    pub program: Program,
    pub generated: Option<Generated>,
    pub document_type: DocumentType,
    pub comment: Option<String>,
    pub company: Company,
    pub taxation_year: Option<i32>,
    pub financial_years: Vec<FinancialYear>,
    pub period_range_end: Option<NaiveDate>,
    pub currency: Option<String>,
}

impl MetaData {
    pub fn financial_year(&self, index: i32) -> Option<&FinancialYear> {
        self.financial_years.iter().find(|y| y.index == index)
    }

    pub fn current_year(&self) -> Option<&FinancialYear> {
        self.financial_year(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year(index: i32, start: (i32, u32, u32), end: (i32, u32, u32)) -> FinancialYear {
        FinancialYear {
            index,
            start: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        }
    }

    #[test]
    fn legal_form_is_total() {
        assert_eq!(LegalForm::from_code(Some("ab")), LegalForm::Aktiebolag);
        assert_eq!(LegalForm::from_code(Some("BRF")), LegalForm::Bostadsrattsforening);
        assert_eq!(LegalForm::from_code(Some("ZZZ")), LegalForm::Other);
        assert_eq!(LegalForm::from_code(None), LegalForm::Other);
        assert_eq!(LegalForm::Other.code(), "X");
    }

    #[test]
    fn contiguous_years_pass() {
        let years = [
            year(-1, (2022, 1, 1), (2022, 12, 31)),
            year(0, (2023, 1, 1), (2023, 12, 31)),
        ];
        assert!(FinancialYear::check_contiguous(&years).is_ok());
    }

    #[test]
    fn broken_year_chain_names_index() {
        let years = [
            year(0, (2023, 1, 1), (2023, 12, 31)),
            year(-1, (2021, 1, 1), (2022, 12, 31)),
        ];
        let err = FinancialYear::check_contiguous(&years).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NonConsecutiveYears);
        assert!(err.message().contains("-1"), "{}", err.message());
    }

    #[test]
    fn gap_between_years_fails() {
        let years = [
            year(0, (2023, 2, 1), (2023, 12, 31)),
            year(-1, (2022, 1, 1), (2022, 12, 31)),
        ];
        let err = FinancialYear::check_contiguous(&years).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NonConsecutiveYears);
    }

    #[test]
    fn code_four_is_disambiguated_by_balances() {
        assert_eq!(DocumentType::from_code(4, true), Some(DocumentType::E4));
        assert_eq!(DocumentType::from_code(4, false), Some(DocumentType::I4));
        assert_eq!(DocumentType::from_code(7, false), None);
    }
}
