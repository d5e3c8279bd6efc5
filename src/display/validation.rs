//! Validation report formatting

use crate::services::ValidationReport;

/// Format a validation report for the terminal
pub fn format_report(report: &ValidationReport, symbol: &str) -> String {
    let mut output = String::new();

    let expected = report
        .expected_total()
        .map(|m| m.format_with_symbol(symbol))
        .unwrap_or_else(|| "-".to_string());
    let difference = report
        .difference()
        .map(|m| m.format_signed(symbol))
        .unwrap_or_else(|| "-".to_string());

    output.push_str(&format!("Splits: {}\n", report.split_count()));
    output.push_str(&format!(
        "Sum: {}  Expected: {}  Difference: {}\n",
        report.sum().format_with_symbol(symbol),
        expected,
        difference
    ));

    if !report.categories_checked() {
        output.push_str("Category checks skipped: no category cache (run 'tally category refresh')\n");
    }

    output.push('\n');
    push_section(&mut output, "Issues", &report.issue_messages());
    push_section(&mut output, "Warnings", &report.warning_messages());

    output.push('\n');
    if report.is_valid() {
        output.push_str("Result: VALID\n");
    } else {
        output.push_str(&format!(
            "Result: INVALID ({} blocking issue{})\n",
            report.issues().len(),
            if report.issues().len() == 1 { "" } else { "s" }
        ));
    }

    output
}

fn push_section(output: &mut String, title: &str, messages: &[String]) {
    output.push_str(&format!("{} ({}):\n", title, messages.len()));
    if messages.is_empty() {
        output.push_str("  (none)\n");
    }
    for message in messages {
        output.push_str(&format!("  - {}\n", message));
    }
}
