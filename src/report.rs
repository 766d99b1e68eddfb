// Report rendering - presentation output for one analysis run
//
// Computation happens entirely in `ledger`; this module only renders the
// finished `Analysis` into wire shapes: the HTML tables the front end
// drops into the page, and the CSV bytes of the bank-transfer list.
// Table labels and account codes follow the standard register
// presentation; amounts booked from split contributions show 2 decimal
// places, whole-lekë lines show none.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::ledger::{Analysis, BankRow, LedgerSummary, OwnerDetail, WorkerRow};
use crate::numeric::format_amount;

/// Analysis rendered for the wire: title, HTML sections, and the flat
/// row lists for the bank-transfer and full-detail exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub title: String,
    pub ledger_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers_html: Option<String>,
    pub bank_rows: Vec<BankRow>,
    pub full_rows: Vec<WorkerRow>,
}

/// Render a finished analysis into its presentation bundle.
pub fn render(analysis: &Analysis) -> AnalysisResponse {
    AnalysisResponse {
        title: analysis.title.clone(),
        ledger_html: ledger_table(&analysis.summary),
        owner_html: analysis.owner.as_ref().map(owner_table),
        workers_html: if analysis.workers.is_empty() {
            None
        } else {
            Some(workers_table(&analysis.workers))
        },
        bank_rows: analysis.bank_rows.clone(),
        full_rows: analysis.workers.clone(),
    }
}

fn ledger_table(summary: &LedgerSummary) -> String {
    let mut html = String::new();
    html.push_str("<h3 class=\"section-title\">Regjistrimi Kontabël</h3>\n");
    html.push_str("<div class=\"table-wrapper\"><table>\n");
    html.push_str(
        "<thead><tr><th>Llogaria</th><th>Kodi</th><th>Debit</th><th>Kredit</th></tr></thead>\n<tbody>\n",
    );
    html.push_str(&debit_line("Shpenzime Page", "641", summary.wage_expense, 0));
    html.push_str(&debit_line(
        "Shpenzime Sigurimesh",
        "644",
        summary.insurance_expense,
        2,
    ));
    html.push_str(&credit_line(
        "Detyrime ndaj Personelit (Neto)",
        "421",
        summary.personnel_payable,
        2,
    ));
    html.push_str(&credit_line(
        "Detyrime për Sigurimet",
        "431",
        summary.insurance_payable,
        2,
    ));
    html.push_str(&credit_line("Detyrime për TAP", "442", summary.tax_payable, 0));
    html.push_str("</tbody>\n");
    html.push_str(&format!(
        "<tfoot><tr><td colspan=\"2\">TOTALI</td><td>{}</td><td>{}</td></tr></tfoot>\n",
        format_amount(summary.debit_total, 2),
        format_amount(summary.credit_total, 2),
    ));
    html.push_str("</table></div>\n");
    html
}

fn debit_line(label: &str, code: &str, amount: f64, decimals: usize) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td></td></tr>\n",
        label,
        code,
        format_amount(amount, decimals),
    )
}

fn credit_line(label: &str, code: &str, amount: f64, decimals: usize) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td></td><td>{}</td></tr>\n",
        label,
        code,
        format_amount(amount, decimals),
    )
}

fn owner_table(owner: &OwnerDetail) -> String {
    let mut html = String::new();
    html.push_str("<h3 class=\"section-title\">Detajet për Pronarin</h3>\n");
    html.push_str("<div class=\"table-wrapper\"><table>\n");
    html.push_str(
        "<thead><tr><th>ID</th><th>Emri</th><th>Paga Bruto (Referencë)</th><th>Kosto Totale Sigurimesh</th></tr></thead>\n",
    );
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr></tbody>\n",
        escape(&owner.id),
        escape(&owner.name),
        format_amount(owner.gross_wage, 0),
        format_amount(owner.insurance_cost, 2),
    ));
    html.push_str("</table></div>\n");
    html
}

fn workers_table(workers: &[WorkerRow]) -> String {
    let mut html = String::new();
    html.push_str("<h3 class=\"section-title\">Detajet për Punonjësit</h3>\n");
    html.push_str("<div class=\"table-wrapper\"><table>\n");
    html.push_str(
        "<thead><tr><th>ID</th><th>Emri</th><th>Paga Bruto</th><th>Sigurime Punonjës</th><th>TAP</th><th>Paga Neto</th></tr></thead>\n<tbody>\n",
    );
    for row in workers {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&row.id),
            escape(&row.name),
            format_amount(row.gross_wage, 0),
            format_amount(row.employee_deduction, 2),
            format_amount(row.income_tax, 0),
            format_amount(row.net_pay, 2),
        ));
    }
    html.push_str("</tbody>\n</table></div>\n");
    html
}

/// Escape a text cell. Names come from free text; markup characters in
/// them must render inert.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Encode the bank-transfer rows as CSV: one line per worker with the
/// display name and the rounded net pay.
pub fn bank_rows_csv(rows: &[BankRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Name", "Net Pay"])?;
    for row in rows {
        writer.write_record([row.name.as_str(), &format!("{:.2}", row.net_pay)])?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{analyze, EntityKind};
    use crate::person::{Meta, Person};

    fn sample_people() -> Vec<Person> {
        let owner = Person {
            id: "CC1122334D".to_string(),
            name: "DRITAN SHEHU".to_string(),
            gross_wage: 40000.0,
            social_total: 9200.0,
            supplementary_total: 0.0,
            social_employer: 0.0,
            social_employee: 0.0,
            supplementary_employer: 0.0,
            supplementary_employee: 0.0,
            health_total: 1360.0,
            voluntary_pension: 0.0,
            income_tax: 0.0,
        };
        let worker = Person {
            id: "AA1234567B".to_string(),
            name: "GERGJ PRENDI".to_string(),
            gross_wage: 60000.0,
            social_total: 14850.0,
            supplementary_total: 0.0,
            social_employer: 9150.0,
            social_employee: 5700.0,
            supplementary_employer: 0.0,
            supplementary_employee: 0.0,
            health_total: 2040.0,
            voluntary_pension: 0.0,
            income_tax: 1300.0,
        };
        vec![owner, worker]
    }

    fn meta() -> Meta {
        Meta {
            name: "DRITAN SHEHU".to_string(),
            month: "Janar".to_string(),
        }
    }

    #[test]
    fn test_render_pf_sections() {
        let analysis = analyze(EntityKind::Pf, &meta(), &sample_people(), None);
        let response = render(&analysis);

        assert_eq!(response.title, "Analysis PF: DRITAN SHEHU - Janar");
        assert!(response.owner_html.is_some());
        assert!(response.workers_html.is_some());
        assert_eq!(response.bank_rows.len(), 1);
        assert_eq!(response.full_rows.len(), 1);
    }

    #[test]
    fn test_render_shpk_has_no_owner_section() {
        let analysis = analyze(EntityKind::Shpk, &meta(), &sample_people(), None);
        let response = render(&analysis);
        assert!(response.owner_html.is_none());
        assert_eq!(response.full_rows.len(), 2);
    }

    #[test]
    fn test_render_empty_people_omits_worker_section() {
        let analysis = analyze(EntityKind::Pf, &meta(), &[], None);
        let response = render(&analysis);
        assert!(response.owner_html.is_none());
        assert!(response.workers_html.is_none());
        assert!(response.bank_rows.is_empty());
        assert!(response.ledger_html.contains("TOTALI"));
    }

    #[test]
    fn test_ledger_table_amounts_and_codes() {
        let analysis = analyze(EntityKind::Pf, &meta(), &sample_people(), None);
        let html = render(&analysis).ledger_html;

        // Worker: employer cost 9150 + 1020, net 60000 - 6720 - 1300.
        assert!(html.contains("<td>641</td><td>60,000</td>"));
        assert!(html.contains("<td>644</td><td>20,730.00</td>"));
        assert!(html.contains("<td>421</td><td></td><td>51,980.00</td>"));
        assert!(html.contains("<td>431</td><td></td><td>27,450.00</td>"));
        assert!(html.contains("<td>442</td><td></td><td>1,300</td>"));
        assert!(html.contains("<td>80,730.00</td><td>80,730.00</td>"));
    }

    #[test]
    fn test_worker_table_shows_employee_side() {
        let analysis = analyze(EntityKind::Pf, &meta(), &sample_people(), None);
        let html = render(&analysis).workers_html.unwrap();
        assert!(html.contains("<td>GERGJ PRENDI</td>"));
        assert!(html.contains("<td>6,720.00</td>"));
        assert!(html.contains("<td>51,980.00</td>"));
    }

    #[test]
    fn test_text_cells_are_escaped() {
        let mut people = sample_people();
        people[1].name = "A <b>B</b> & C".to_string();
        let analysis = analyze(EntityKind::Pf, &meta(), &people, None);
        let html = render(&analysis).workers_html.unwrap();
        assert!(html.contains("A &lt;b&gt;B&lt;/b&gt; &amp; C"));
        assert!(!html.contains("<b>B</b>"));
    }

    #[test]
    fn test_bank_rows_csv() {
        let analysis = analyze(EntityKind::Pf, &meta(), &sample_people(), None);
        let bytes = bank_rows_csv(&analysis.bank_rows).unwrap();
        let csv = String::from_utf8(bytes).unwrap();
        assert_eq!(csv, "Name,Net Pay\nGERGJ PRENDI,51980.00\n");
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let analysis = analyze(EntityKind::Shpk, &meta(), &sample_people(), None);
        let json = serde_json::to_value(render(&analysis)).unwrap();
        assert!(json.get("ledgerHtml").is_some());
        assert!(json.get("bankRows").is_some());
        assert!(json.get("fullRows").is_some());
        assert!(json.get("ownerHtml").is_none());
    }
}
