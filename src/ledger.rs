// Ledger aggregation - journal-entry totals for PF and SHPK registers
//
// Both entity types share one accumulation path; the only policy
// difference is the owner: a PF register designates one person whose
// wage never enters the worker totals and whose insurance cost books as
// a lump sum on both sides of the entry. Debit and credit stay equal by
// construction because every employer-side cost and employee-side
// deduction derives from the same contribution totals.

use serde::{Deserialize, Serialize};

use crate::numeric::round2;
use crate::person::{Meta, Person};

/// Tolerance for debit/credit float comparisons.
pub const BALANCE_TOLERANCE: f64 = 0.01;

/// Legal entity type of the register being analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    #[serde(rename = "PF")]
    Pf,
    #[serde(rename = "SHPK")]
    Shpk,
}

impl EntityKind {
    /// Short code used in titles and on the wire.
    pub fn code(&self) -> &str {
        match self {
            EntityKind::Pf => "PF",
            EntityKind::Shpk => "SHPK",
        }
    }

    pub fn from_code(code: &str) -> Option<EntityKind> {
        match code.trim().to_ascii_uppercase().as_str() {
            "PF" => Some(EntityKind::Pf),
            "SHPK" => Some(EntityKind::Shpk),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Per-person derived amounts. Transient, one per aggregation run.
#[derive(Debug, Clone, Copy)]
pub struct Derived {
    pub employer_cost: f64,
    pub employee_deduction: f64,
    pub net_pay: f64,
    /// The 431-payable contribution: social + supplementary + health totals.
    pub insurance_total: f64,
}

/// Split the contribution fields of one person into the employer cost,
/// the employee deduction, and the resulting net pay. Health insurance
/// is borne half by each side.
pub fn derive(person: &Person) -> Derived {
    let half_health = person.health_total / 2.0;
    let employer_cost = person.social_employer + person.supplementary_employer + half_health;
    let employee_deduction = person.social_employee + person.supplementary_employee + half_health;
    let net_pay =
        person.gross_wage - employee_deduction - person.income_tax - person.voluntary_pension;
    let insurance_total = person.social_total + person.supplementary_total + person.health_total;
    Derived {
        employer_cost,
        employee_deduction,
        net_pay,
        insurance_total,
    }
}

/// Journal-entry line totals. Account codes follow the standard Albanian
/// chart: 641 wage expense, 644 insurance expense, 421 personnel,
/// 431 insurance, 442 TAP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub wage_expense: f64,
    pub insurance_expense: f64,
    pub personnel_payable: f64,
    pub insurance_payable: f64,
    pub tax_payable: f64,
    pub debit_total: f64,
    pub credit_total: f64,
}

impl LedgerSummary {
    pub fn is_balanced(&self) -> bool {
        (self.debit_total - self.credit_total).abs() < BALANCE_TOLERANCE
    }
}

/// Owner reference row (PF only). The gross wage is informational; only
/// the insurance cost enters the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDetail {
    pub id: String,
    pub name: String,
    pub gross_wage: f64,
    pub insurance_cost: f64,
}

/// Full-detail row for one worker. Derived amounts are rounded to 2
/// decimal places; source amounts are carried as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRow {
    pub id: String,
    pub name: String,
    pub gross_wage: f64,
    pub employer_cost: f64,
    pub employee_deduction: f64,
    pub income_tax: f64,
    pub net_pay: f64,
}

/// Bank-transfer row: who gets paid, and how much.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankRow {
    pub name: String,
    pub net_pay: f64,
}

/// The full result of one aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub kind: EntityKind,
    pub title: String,
    pub summary: LedgerSummary,
    pub owner: Option<OwnerDetail>,
    pub workers: Vec<WorkerRow>,
    pub bank_rows: Vec<BankRow>,
}

#[derive(Debug, Default)]
struct WorkerTotals {
    gross_wage: f64,
    employer_cost: f64,
    income_tax: f64,
    net_pay: f64,
    insurance: f64,
}

/// Aggregate a person list into a balanced journal-entry summary plus
/// per-worker rows.
///
/// For PF, `selected_index` picks the owner; a missing, negative, or
/// out-of-range index clamps to 0, and an empty person list yields a
/// zero-person result with no owner rather than failing. SHPK ignores
/// `selected_index` and treats everyone as a worker.
pub fn analyze(
    kind: EntityKind,
    meta: &Meta,
    people: &[Person],
    selected_index: Option<i64>,
) -> Analysis {
    let owner_index = match kind {
        EntityKind::Pf if !people.is_empty() => Some(clamp_index(selected_index, people.len())),
        _ => None,
    };

    let mut totals = WorkerTotals::default();
    let mut workers = Vec::new();
    let mut bank_rows = Vec::new();

    for (index, person) in people.iter().enumerate() {
        if Some(index) == owner_index {
            continue;
        }
        let derived = derive(person);
        totals.gross_wage += person.gross_wage;
        totals.employer_cost += derived.employer_cost;
        totals.income_tax += person.income_tax;
        totals.net_pay += derived.net_pay;
        totals.insurance += derived.insurance_total;

        workers.push(WorkerRow {
            id: person.id.clone(),
            name: person.name.clone(),
            gross_wage: person.gross_wage,
            employer_cost: round2(derived.employer_cost),
            employee_deduction: round2(derived.employee_deduction),
            income_tax: person.income_tax,
            net_pay: round2(derived.net_pay),
        });
        bank_rows.push(BankRow {
            name: person.name.clone(),
            net_pay: round2(derived.net_pay),
        });
    }

    let owner = owner_index.map(|index| {
        let person = &people[index];
        OwnerDetail {
            id: person.id.clone(),
            name: person.name.clone(),
            gross_wage: person.gross_wage,
            insurance_cost: derive(person).insurance_total,
        }
    });
    let owner_insurance = owner.as_ref().map(|o| o.insurance_cost).unwrap_or(0.0);

    let wage_expense = totals.gross_wage;
    let insurance_expense = totals.employer_cost + owner_insurance;
    let personnel_payable = totals.net_pay;
    let insurance_payable = totals.insurance + owner_insurance;
    let tax_payable = totals.income_tax;

    let summary = LedgerSummary {
        wage_expense,
        insurance_expense,
        personnel_payable,
        insurance_payable,
        tax_payable,
        debit_total: wage_expense + insurance_expense,
        credit_total: personnel_payable + insurance_payable + tax_payable,
    };

    Analysis {
        kind,
        title: format!("Analysis {}: {} - {}", kind.code(), meta.name, meta.month),
        summary,
        owner,
        workers,
        bank_rows,
    }
}

/// Clamp a caller-supplied selection to a valid owner index: anything
/// missing, negative, or past the end defaults to 0.
fn clamp_index(selected: Option<i64>, len: usize) -> usize {
    match selected {
        Some(i) if i >= 0 && (i as usize) < len => i as usize,
        _ => 0,
    }
}
