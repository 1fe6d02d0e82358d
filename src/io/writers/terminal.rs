use crate::core::{QualityLabel, Severity};
use crate::inference::PredictionResult;
use crate::io::output::OutputWriter;
use crate::report::QualityReport;
use colored::*;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use std::io::Write;

/// Files listed in the terminal table; JSON and Markdown carry them all
const MAX_FILES_SHOWN: usize = 20;

pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl Default for TerminalWriter<std::io::Stdout> {
    fn default() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn header(&mut self, title: &str) -> anyhow::Result<()> {
        let rule = "═══════════════════════════════════════════";
        writeln!(self.writer)?;
        writeln!(self.writer, "{}", rule.cyan())?;
        writeln!(self.writer, "  {}", title.bold().cyan())?;
        writeln!(self.writer, "{}", rule.cyan())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

fn colored_label(label: QualityLabel) -> ColoredString {
    let text = label.to_string();
    match label {
        QualityLabel::Excellent | QualityLabel::Good => text.green(),
        QualityLabel::Fair => text.yellow(),
        QualityLabel::Poor | QualityLabel::VeryPoor => text.red(),
    }
}

fn colored_severity(severity: Severity) -> ColoredString {
    let text = severity.to_string();
    match severity {
        Severity::Blocker | Severity::Critical => text.red().bold(),
        Severity::Major => text.yellow(),
        Severity::Minor => text.normal(),
        Severity::Info => text.dimmed(),
    }
}

fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &QualityReport) -> anyhow::Result<()> {
        let summary = &report.summary;
        self.header("CODE QUALITY REPORT")?;

        writeln!(self.writer, "📊 {}", "Summary".bold())?;
        writeln!(self.writer, "───────────────────────────────────────────")?;
        writeln!(self.writer, "Files analyzed: {}", summary.total_files)?;
        writeln!(self.writer, "Lines of code: {}", summary.total_lines_of_code)?;
        writeln!(
            self.writer,
            "Average cyclomatic complexity: {:.2}",
            summary.average_cyclomatic_complexity
        )?;
        writeln!(self.writer, "Code smells: {}", summary.total_code_smells)?;
        writeln!(
            self.writer,
            "Average quality score: {:.1}",
            summary.average_quality_score
        )?;
        let dist = &summary.files_by_quality;
        writeln!(
            self.writer,
            "Quality: {} excellent, {} good, {} fair, {} poor",
            dist.excellent.to_string().green(),
            dist.good.to_string().green(),
            dist.fair.to_string().yellow(),
            dist.poor.to_string().red()
        )?;
        writeln!(self.writer)?;

        if !summary.smell_counts.is_empty() {
            let mut counts = table();
            counts.set_header(vec!["Smell", "Count"]);
            let mut sorted: Vec<_> = summary.smell_counts.iter().collect();
            sorted.sort_by(|a, b| b.1.cmp(a.1));
            for (kind, count) in sorted {
                counts.add_row(vec![kind.to_string(), count.to_string()]);
            }
            writeln!(self.writer, "{counts}")?;
            writeln!(self.writer)?;
        }

        let worst: Vec<_> = report.smelly_files().take(MAX_FILES_SHOWN).collect();
        if worst.is_empty() {
            writeln!(self.writer, "{}", "✓ No code smells detected".green().bold())?;
            return Ok(());
        }

        writeln!(self.writer, "🔍 {}", "Files needing attention".bold())?;
        let mut files = table();
        files.set_header(vec!["File", "Score", "Quality", "Smells"]);
        for file in &worst {
            files.add_row(vec![
                file.path.display().to_string(),
                file.quality.score.to_string(),
                file.quality.label.to_string(),
                file.smells.len().to_string(),
            ]);
        }
        writeln!(self.writer, "{files}")?;
        writeln!(self.writer)?;

        for file in worst.iter().take(5) {
            writeln!(
                self.writer,
                "{} ({})",
                file.path.display().to_string().bold(),
                colored_label(file.quality.label)
            )?;
            for (smell, suggestion) in file.smells.iter().zip(&file.suggestions) {
                writeln!(
                    self.writer,
                    "  [{}] line {}: {}",
                    colored_severity(smell.severity),
                    smell.line,
                    smell.message
                )?;
                writeln!(self.writer, "      → {}", suggestion.title.cyan())?;
            }
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn write_predictions(&mut self, result: &PredictionResult) -> anyhow::Result<()> {
        let summary = &result.summary;
        self.header("SMELL PREDICTIONS")?;

        writeln!(self.writer, "Files analyzed: {}", summary.files_analyzed)?;
        writeln!(
            self.writer,
            "Predicted smelly: {}",
            summary.files_predicted_smelly.to_string().red()
        )?;
        if let Some(mean) = summary.mean_pred_proba {
            writeln!(self.writer, "Mean probability: {mean:.3}")?;
        }
        writeln!(self.writer, "Threshold: {:.2}", summary.threshold)?;
        if result.errors > 0 {
            writeln!(
                self.writer,
                "{}",
                format!("{} files could not be analyzed", result.errors).yellow()
            )?;
        }
        writeln!(self.writer)?;

        if result.rows.is_empty() {
            writeln!(self.writer, "No analyzable files found")?;
            return Ok(());
        }

        let mut rows = table();
        rows.set_header(vec!["File", "Probability", "Smelly", "Predicted smells"]);
        for row in result.rows.iter().take(MAX_FILES_SHOWN) {
            rows.add_row(vec![
                row.file_path.clone(),
                format!("{:.3}", row.pred_proba),
                if row.pred_label { "yes" } else { "no" }.to_string(),
                row.predicted_smells
                    .iter()
                    .map(|k| k.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            ]);
        }
        writeln!(self.writer, "{rows}")?;
        if result.rows.len() > MAX_FILES_SHOWN {
            writeln!(
                self.writer,
                "... and {} more files",
                result.rows.len() - MAX_FILES_SHOWN
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
