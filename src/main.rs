use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::Path;

// Use library instead of local modules
use payroll_analyzer::{
    analyze, bank_rows_csv, format_amount, parse_document, Analysis, EntityKind,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        bail!("usage: payroll-analyzer <PF|SHPK> <register.txt> [--bank-csv <out.csv>]");
    }

    let Some(kind) = EntityKind::from_code(&args[1]) else {
        bail!("unknown entity type '{}', expected PF or SHPK", args[1]);
    };

    let path = Path::new(&args[2]);
    let bank_csv_path = bank_csv_arg(&args)?;

    run_analysis(kind, path, bank_csv_path.as_deref())
}

fn bank_csv_arg(args: &[String]) -> Result<Option<String>> {
    match args.iter().position(|a| a == "--bank-csv") {
        Some(pos) => match args.get(pos + 1) {
            Some(out) => Ok(Some(out.clone())),
            None => bail!("--bank-csv needs an output path"),
        },
        None => Ok(None),
    }
}

fn run_analysis(kind: EntityKind, path: &Path, bank_csv_path: Option<&str>) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read register file: {}", path.display()))?;

    let (meta, people) = parse_document(&text);
    println!(
        "✓ Parsed {} people from {} ({} - {})",
        people.len(),
        path.display(),
        meta.name,
        meta.month
    );

    let analysis = analyze(kind, &meta, &people, None);
    print_analysis(&analysis);

    if let Some(out) = bank_csv_path {
        let csv = bank_rows_csv(&analysis.bank_rows)?;
        fs::write(out, csv).with_context(|| format!("Failed to write bank CSV: {out}"))?;
        println!("✓ Bank-transfer CSV written to {out}");
    }

    Ok(())
}

fn print_analysis(analysis: &Analysis) {
    let summary = &analysis.summary;

    println!("\n{}", analysis.title);
    println!("────────────────────────────────────────────────────");
    println!("  641 Shpenzime Page                 D {:>14}", format_amount(summary.wage_expense, 0));
    println!("  644 Shpenzime Sigurimesh           D {:>14}", format_amount(summary.insurance_expense, 2));
    println!("  421 Detyrime ndaj Personelit       K {:>14}", format_amount(summary.personnel_payable, 2));
    println!("  431 Detyrime për Sigurimet         K {:>14}", format_amount(summary.insurance_payable, 2));
    println!("  442 Detyrime për TAP               K {:>14}", format_amount(summary.tax_payable, 0));
    println!("────────────────────────────────────────────────────");
    println!(
        "  TOTALI                 D {:>14}  K {:>14}",
        format_amount(summary.debit_total, 2),
        format_amount(summary.credit_total, 2)
    );

    if let Some(owner) = &analysis.owner {
        println!("\nPronari: {} ({})", owner.name, owner.id);
        println!(
            "  Paga bruto (referencë) {}, kosto sigurimesh {}",
            format_amount(owner.gross_wage, 0),
            format_amount(owner.insurance_cost, 2)
        );
    }

    if !analysis.workers.is_empty() {
        println!("\nPunonjësit:");
        for row in &analysis.workers {
            println!(
                "  {} {:<24} bruto {:>10}  sigurime {:>10}  TAP {:>8}  neto {:>12}",
                row.id,
                row.name,
                format_amount(row.gross_wage, 0),
                format_amount(row.employee_deduction, 2),
                format_amount(row.income_tax, 0),
                format_amount(row.net_pay, 2)
            );
        }
    }
}
