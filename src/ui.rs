// UI utilities for the record form CLI

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::types::{Record, RecordSet};

const TABLE_HEADER: [&str; 5] = ["Type", "Hostname", "Target", "TTL", "PTR"];

/// Create a spinner with a message
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Print a horizontal line
pub fn print_line() {
    println!("{}", style("─".repeat(50)).dim());
}

/// Print a section header
pub fn print_header(title: &str) {
    println!();
    println!("{}", style(title).cyan().bold());
    println!();
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{}", style(format!("  ✅ {}", message)).green());
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{}", style(format!("  ❌ {}", message)).red());
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("{}", style(format!("  ⚠️  {}", message)).yellow());
}

/// Print info message
pub fn print_info(message: &str) {
    println!("{}", style(format!("  ℹ️  {}", message)).blue());
}

// =============================================================================
// RECORD TABLE
// =============================================================================

/// Cells shown for one record; the reverse name is derived here, at display time
fn record_cells(record: &Record) -> [String; 5] {
    [
        record.record_type().to_string(),
        record.name().to_string(),
        record.target().to_string(),
        record.ttl().to_string(),
        record.reverse_name(),
    ]
}

/// Lay out records as aligned text rows, header first
pub fn format_table(records: &RecordSet) -> Vec<String> {
    let rows: Vec<[String; 5]> = records.iter().map(record_cells).collect();

    let mut widths = TABLE_HEADER.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: &[&str]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render(&TABLE_HEADER[..]));
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        lines.push(render(&cells[..]));
    }
    lines
}

/// Print the record table
pub fn print_records(records: &RecordSet) {
    if records.is_empty() {
        print_empty_records();
        return;
    }

    let lines = format_table(records);
    println!();
    if let Some((header, body)) = lines.split_first() {
        println!("  {}", style(header).bold());
        for line in body {
            println!("  {}", line);
        }
    }
    println!();
    println!(
        "  {} {}",
        style(records.len()).white(),
        style("records").dim()
    );
    println!();
}

/// Print empty table message
pub fn print_empty_records() {
    println!();
    println!("  {}", style("No records yet").dim());
    println!();
    println!(
        "  {}",
        style("Add an A or CNAME record, or import a CSV/JSON file.").dim()
    );
    println!();
}
