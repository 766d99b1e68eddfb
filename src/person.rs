// Person records - the structured form of one payroll register row
//
// A register row carries the employee id, the display name, and a run of
// positional numeric columns. The column layout is a contract inherited
// from the tax-office export format, declared once in `column` below.

use serde::{Deserialize, Serialize};

use crate::numeric::parse_amount;

/// Register header metadata: taxpayer name and period label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default = "Meta::default_name")]
    pub name: String,
    #[serde(default = "Meta::default_month")]
    pub month: String,
}

impl Meta {
    pub fn default_name() -> String {
        "Unknown Subject".to_string()
    }

    pub fn default_month() -> String {
        "Unknown Month".to_string()
    }
}

impl Default for Meta {
    fn default() -> Self {
        Meta {
            name: Meta::default_name(),
            month: Meta::default_month(),
        }
    }
}

/// Positional column indices in the numbers run of a register row.
///
/// Zero-indexed from the first digit-leading token. Columns not listed
/// here (days worked, wage repeats, per-side health splits) are carried
/// by the export but unused by the ledger.
mod column {
    pub const GROSS_WAGE: usize = 4;
    pub const SOCIAL_EMPLOYER: usize = 6;
    pub const SOCIAL_EMPLOYEE: usize = 7;
    pub const SOCIAL_TOTAL: usize = 8;
    pub const SUPPLEMENTARY_EMPLOYER: usize = 9;
    pub const SUPPLEMENTARY_EMPLOYEE: usize = 10;
    pub const SUPPLEMENTARY_TOTAL: usize = 11;
    pub const HEALTH_TOTAL: usize = 14;
    pub const VOLUNTARY_PENSION: usize = 15;
    pub const INCOME_TAX: usize = 18;
}

/// Minimum-base owner contribution pattern: a row with zero gross wage
/// and exactly this social-insurance total is a contribution on the
/// fixed 40,000 minimum wage base.
const MINIMUM_BASE_SOCIAL_TOTAL: f64 = 9200.0;
const MINIMUM_BASE_GROSS_WAGE: f64 = 40000.0;

/// One person extracted from the register, monetary fields in lekë.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub gross_wage: f64,
    #[serde(default)]
    pub social_total: f64,
    #[serde(default)]
    pub supplementary_total: f64,
    #[serde(default)]
    pub social_employer: f64,
    #[serde(default)]
    pub social_employee: f64,
    #[serde(default)]
    pub supplementary_employer: f64,
    #[serde(default)]
    pub supplementary_employee: f64,
    #[serde(default)]
    pub health_total: f64,
    #[serde(default)]
    pub voluntary_pension: f64,
    #[serde(default)]
    pub income_tax: f64,
}

impl Person {
    /// Build a person from the tokenized numbers run of a register row.
    ///
    /// Indices past the end of a short row resolve to 0.0; sparse rows
    /// are tolerated, not errors. An empty display name falls back to
    /// the id.
    pub fn from_tokens(id: &str, name: &str, numbers: &[&str]) -> Person {
        let field = |index: usize| numbers.get(index).map(|t| parse_amount(t)).unwrap_or(0.0);

        let mut person = Person {
            id: id.to_string(),
            name: if name.is_empty() { id.to_string() } else { name.to_string() },
            gross_wage: field(column::GROSS_WAGE),
            social_total: field(column::SOCIAL_TOTAL),
            supplementary_total: field(column::SUPPLEMENTARY_TOTAL),
            social_employer: field(column::SOCIAL_EMPLOYER),
            social_employee: field(column::SOCIAL_EMPLOYEE),
            supplementary_employer: field(column::SUPPLEMENTARY_EMPLOYER),
            supplementary_employee: field(column::SUPPLEMENTARY_EMPLOYEE),
            health_total: field(column::HEALTH_TOTAL),
            voluntary_pension: field(column::VOLUNTARY_PENSION),
            income_tax: field(column::INCOME_TAX),
        };

        // Restore the 40,000 reference wage on minimum-base contribution
        // rows. Applied to every matching row, not only a designated
        // owner: the export does not mark which row is the owner.
        if person.gross_wage == 0.0 && person.social_total == MINIMUM_BASE_SOCIAL_TOTAL {
            person.gross_wage = MINIMUM_BASE_GROSS_WAGE;
        }

        person
    }
}
