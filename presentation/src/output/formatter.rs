//! Output formatter trait

use tribunal_application::BatchReport;
use tribunal_domain::OutputFormat;

/// Trait for formatting batch results
pub trait OutputFormatter {
    /// Every stage of every problem
    fn format_full(&self, report: &BatchReport) -> String;

    /// One verdict per problem (concise output)
    fn format_verdicts(&self, report: &BatchReport) -> String;

    /// Format as JSON
    fn format_json(&self, report: &BatchReport) -> String;

    /// Dispatch on the configured format
    fn render(&self, report: &BatchReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format_full(report),
            OutputFormat::Verdict => self.format_verdicts(report),
            OutputFormat::Json => self.format_json(report),
        }
    }
}
