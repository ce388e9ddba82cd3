use serde::Serialize;
use wipflow_core::report::{BatchReport, Report};

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    // Calculate column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  ").trim_end());

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }
}

/// Print a single-item report; an unsuccessful report is an error so the
/// exit status reflects it.
pub fn print_report(report: &Report, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(report)?;
    } else {
        println!("{report}");
    }
    if !report.success {
        let failed = report.failures().count();
        anyhow::bail!("{failed} of {} steps failed", report.steps.len());
    }
    Ok(())
}

pub fn print_batch(batch: &BatchReport, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(batch)?;
    } else {
        println!("{batch}");
    }
    if !batch.success {
        anyhow::bail!("no task in cart '{}' succeeded", batch.cart);
    }
    Ok(())
}
