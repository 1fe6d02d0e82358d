use crate::inference::PredictionResult;
use crate::io::output::OutputWriter;
use crate::report::QualityReport;
use std::io::Write;

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_value<T: serde::Serialize>(&mut self, value: &T) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, value)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &QualityReport) -> anyhow::Result<()> {
        self.write_value(report)
    }

    fn write_predictions(&mut self, result: &PredictionResult) -> anyhow::Result<()> {
        self.write_value(result)
    }
}
