// Console report for a finished run.

use std::fmt;

use crate::result::{SummaryReport, SummaryResult};

const RULE_WIDTH: usize = 80;

/// Fixed-format text report. A failure renders as a single line.
pub struct Report<'a>(pub &'a SummaryResult);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            SummaryResult::Failure(failure) => writeln!(f, "Error: {}", failure.error),
            SummaryResult::Success(report) => write_success(f, report),
        }
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(f, "{rule}\n{title}\n{rule}")
}

fn write_success(f: &mut fmt::Formatter<'_>, report: &SummaryReport) -> fmt::Result {
    section(f, "DOCUMENT SUMMARY (files sent directly)")?;
    writeln!(f, "\n{}", report.summary)?;

    if let Some(stats) = &report.stats {
        writeln!(f)?;
        section(f, "STATISTICS")?;
        writeln!(f, "Total files: {}", stats.total_files)?;
        writeln!(f, "Files processed: {}", stats.files_prepared)?;
        writeln!(f, "Summary length: {} characters", stats.summary_length)?;
    }

    writeln!(f)?;
    section(f, "PROCESSED FILES")?;
    for (i, name) in report.file_names.iter().enumerate() {
        writeln!(f, "{}. {}", i + 1, name)?;
    }

    Ok(())
}

pub fn render_report(result: &SummaryResult) -> String {
    Report(result).to_string()
}

pub fn print_report(result: &SummaryResult) {
    print!("{}", Report(result));
}
