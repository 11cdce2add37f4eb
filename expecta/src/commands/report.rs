// expecta/src/commands/report.rs
//
// Result tables printed after a run.

use comfy_table::Table;
use expecta_core::domain::result::ValidationResult;

pub fn verdict(success: bool) -> &'static str {
    if success { "✅ PASS" } else { "❌ FAIL" }
}

/// One row per rule of every given validation result.
pub fn results_table<'a>(
    results: impl IntoIterator<Item = (&'a str, &'a ValidationResult)>,
) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Checkpoint", "Definition", "Rule", "Status", "Details"]);

    for (group, result) in results {
        for rule in &result.results {
            let details = match (&rule.exception, &rule.observed.observed_value) {
                (Some(exception), _) => exception.clone(),
                (None, Some(value)) => format!("observed {value}"),
                (None, None) => match rule.observed.unexpected_percent {
                    Some(pct) => format!("{pct:.2}% unexpected"),
                    None => String::new(),
                },
            };
            table.add_row(vec![
                group.to_string(),
                result.validation_definition.clone(),
                rule.expectation.describe(),
                verdict(rule.success).to_string(),
                details,
            ]);
        }
    }
    table
}
