use crate::inference::PredictionResult;
use crate::io::output::OutputWriter;
use crate::report::{FileReport, ProjectSummary, QualityReport};
use std::io::Write;

pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for MarkdownWriter<W> {
    fn write_report(&mut self, report: &QualityReport) -> anyhow::Result<()> {
        writeln!(self.writer, "# Code Quality Report")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Generated: {}",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(self.writer)?;

        self.write_summary(&report.summary)?;
        self.write_smell_counts(&report.summary)?;

        let smelly: Vec<&FileReport> = report.smelly_files().collect();
        if !smelly.is_empty() {
            writeln!(self.writer, "## Files")?;
            writeln!(self.writer)?;
            for file in smelly {
                self.write_file(file)?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }

    fn write_predictions(&mut self, result: &PredictionResult) -> anyhow::Result<()> {
        let summary = &result.summary;
        writeln!(self.writer, "# Smell Predictions")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Generated: {}",
            result.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Metric | Value |")?;
        writeln!(self.writer, "|--------|-------|")?;
        writeln!(self.writer, "| Files analyzed | {} |", summary.files_analyzed)?;
        writeln!(
            self.writer,
            "| Files predicted smelly | {} |",
            summary.files_predicted_smelly
        )?;
        writeln!(
            self.writer,
            "| Mean probability | {} |",
            summary
                .mean_pred_proba
                .map_or_else(|| "-".to_string(), |p| format!("{p:.3}"))
        )?;
        writeln!(self.writer, "| Threshold | {:.2} |", summary.threshold)?;
        writeln!(self.writer, "| Unreadable files | {} |", result.errors)?;
        writeln!(self.writer)?;

        if !result.rows.is_empty() {
            writeln!(self.writer, "| File | Probability | Smelly | Predicted smells |")?;
            writeln!(self.writer, "|------|-------------|--------|------------------|")?;
            for row in &result.rows {
                let smells = row
                    .predicted_smells
                    .iter()
                    .map(|k| k.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                writeln!(
                    self.writer,
                    "| {} | {:.3} | {} | {} |",
                    escape_cell(&row.file_path),
                    row.pred_proba,
                    if row.pred_label { "yes" } else { "no" },
                    if smells.is_empty() { "-".to_string() } else { smells }
                )?;
            }
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> MarkdownWriter<W> {
    fn write_summary(&mut self, summary: &ProjectSummary) -> anyhow::Result<()> {
        let dist = &summary.files_by_quality;
        writeln!(self.writer, "## Summary")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Metric | Value |")?;
        writeln!(self.writer, "|--------|-------|")?;
        writeln!(self.writer, "| Files analyzed | {} |", summary.total_files)?;
        writeln!(self.writer, "| Lines of code | {} |", summary.total_lines_of_code)?;
        writeln!(self.writer, "| Functions | {} |", summary.total_functions)?;
        writeln!(
            self.writer,
            "| Average cyclomatic complexity | {:.2} |",
            summary.average_cyclomatic_complexity
        )?;
        writeln!(self.writer, "| Code smells | {} |", summary.total_code_smells)?;
        writeln!(
            self.writer,
            "| Average quality score | {:.1} |",
            summary.average_quality_score
        )?;
        writeln!(
            self.writer,
            "| Quality (excellent / good / fair / poor) | {} / {} / {} / {} |",
            dist.excellent, dist.good, dist.fair, dist.poor
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_smell_counts(&mut self, summary: &ProjectSummary) -> anyhow::Result<()> {
        if summary.smell_counts.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "## Smells")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Smell | Count |")?;
        writeln!(self.writer, "|-------|-------|")?;
        let mut counts: Vec<_> = summary.smell_counts.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1));
        for (kind, count) in counts {
            writeln!(self.writer, "| {kind} | {count} |")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_file(&mut self, file: &FileReport) -> anyhow::Result<()> {
        writeln!(
            self.writer,
            "### {} ({}, quality {} - {})",
            file.path.display(),
            file.language,
            file.quality.score,
            file.quality.label
        )?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Line | Smell | Severity | Details |")?;
        writeln!(self.writer, "|------|-------|----------|---------|")?;
        for smell in &file.smells {
            writeln!(
                self.writer,
                "| {} | {} | {} | {} |",
                smell.line,
                smell.kind,
                smell.severity,
                escape_cell(&smell.message)
            )?;
        }
        writeln!(self.writer)?;

        writeln!(self.writer, "**Suggestions**")?;
        writeln!(self.writer)?;
        for suggestion in &file.suggestions {
            writeln!(self.writer, "- **{}**: {}", suggestion.title, suggestion.action)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FileAnalysis, FunctionMetrics, Language};
    use crate::smells::{LabeledRecord, SmellDetector};
    use std::path::PathBuf;

    #[test]
    fn test_report_sections() {
        let mut analysis = FileAnalysis::empty(PathBuf::from("pkg/big.py"), Language::Python);
        let mut f = FunctionMetrics::new("process".to_string(), 4);
        f.length = 200;
        analysis.functions.push(f);
        let record = LabeledRecord::new(analysis, &SmellDetector::default());
        let report = QualityReport::build(&[record]);

        let mut out = Vec::new();
        MarkdownWriter::new(&mut out).write_report(&report).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("# Code Quality Report"));
        assert!(text.contains("| Files analyzed | 1 |"));
        assert!(text.contains("| Long Method | 1 |"));
        assert!(text.contains("### pkg/big.py (Python"));
        assert!(text.contains("Split 'process' into smaller functions"));
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("a|b\nc"), "a\\|b c");
    }
}
