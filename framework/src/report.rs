//! Result rendering
//!
//! [`ReportPrinter`] writes the column header, per-series statistics and status
//! lines in one of the [`PrintType`] layouts. Text layouts right-align every
//! column to a fixed width so rows from different tests line up.

use crate::config::PrintType;
use crate::metrics::Metrics;
use cbench_shared::utils::time::timestamp_rfc3339;
use cbench_shared::{MeasurementType, MeasurementUnit, TypeSelector};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use tracing::warn;

/// Width of the test name column unless configured otherwise
pub const DEFAULT_NAME_COLUMN_WIDTH: usize = 60;

const VALUE_COLUMN_WIDTH: usize = 15;
const TYPE_COLUMN_WIDTH: usize = 7;
const LABEL_COLUMN_WIDTH: usize = 15;

const VALUE_COLUMNS: [&str; 5] = ["Mean", "Median", "StdDev", "Min", "Max"];

/// Summary of one named series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesReport {
    pub label: String,
    pub unit: MeasurementUnit,
    pub measurement_type: MeasurementType,
    pub count: usize,
    pub metrics: Option<Metrics>,
    pub samples: Vec<f64>,
}

impl SeriesReport {
    /// `"<name> [unit]"`, or just the unit for the unnamed series
    pub fn unit_label(&self) -> String {
        if self.label.is_empty() {
            self.unit.label().to_string()
        } else {
            format!("{} {}", self.label, self.unit.label())
        }
    }
}

/// Everything a test run recorded, ready for printing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub series: Vec<SeriesReport>,
    /// Shape declared by a run that produced no samples
    pub declared: Option<TypeSelector>,
    /// A sample overflowed, mean and deviation are not meaningful
    pub reached_infinity: bool,
}

impl StatisticsReport {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|series| series.count == 0)
    }

    /// Shape used for noop rows
    pub fn shape(&self) -> Option<TypeSelector> {
        self.declared.or_else(|| {
            self.series
                .first()
                .map(|series| TypeSelector::new(series.unit, series.measurement_type))
        })
    }
}

struct MetricsStrings {
    mean: String,
    median: String,
    standard_deviation: String,
    min: String,
    max: String,
}

impl MetricsStrings {
    fn new(metrics: Option<&Metrics>, reached_infinity: bool) -> Self {
        let Some(metrics) = metrics else {
            let empty = || "-".to_string();
            return Self {
                mean: empty(),
                median: empty(),
                standard_deviation: empty(),
                min: empty(),
                max: empty(),
            };
        };

        let (mean, standard_deviation) = if reached_infinity {
            ("inf".to_string(), "inf".to_string())
        } else {
            (
                format_value(metrics.mean),
                format!("{:.2}%", 100.0 * metrics.relative_standard_deviation),
            )
        };

        Self {
            mean,
            median: format_value(metrics.median),
            standard_deviation,
            min: format_value(metrics.min),
            max: format_value(metrics.max),
        }
    }

    fn values(&self) -> [&str; 5] {
        [
            &self.mean,
            &self.median,
            &self.standard_deviation,
            &self.min,
            &self.max,
        ]
    }
}

fn format_value(value: f64) -> String {
    format!("{:.3}", value)
}

#[derive(Serialize)]
struct JsonStatistics<'a> {
    timestamp: String,
    test: &'a str,
    #[serde(flatten)]
    report: &'a StatisticsReport,
}

#[derive(Serialize)]
struct JsonStatus<'a> {
    timestamp: String,
    test: &'a str,
    status: &'a str,
}

pub struct ReportPrinter<W: Write> {
    writer: W,
    print_type: PrintType,
    name_width: usize,
}

impl<W: Write> ReportPrinter<W> {
    pub fn new(writer: W, print_type: PrintType) -> Self {
        Self {
            writer,
            print_type,
            name_width: DEFAULT_NAME_COLUMN_WIDTH,
        }
    }

    pub fn with_name_width(mut self, name_width: usize) -> Self {
        self.name_width = name_width;
        self
    }

    pub fn print_type(&self) -> PrintType {
        self.print_type
    }

    pub fn name_width(&self) -> usize {
        self.name_width
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn print_header(&mut self) -> io::Result<()> {
        match self.print_type {
            PrintType::Default | PrintType::DefaultWithVerbose | PrintType::Noop => {
                write!(self.writer, "{:>width$}", "TestCase", width = self.name_width)?;
                for label in VALUE_COLUMNS {
                    write!(self.writer, "{:>width$}", label, width = VALUE_COLUMN_WIDTH)?;
                }
                write!(self.writer, "{:>width$}", "Type", width = TYPE_COLUMN_WIDTH)?;
                writeln!(self.writer, "{:>width$}", "Label [unit]", width = LABEL_COLUMN_WIDTH)
            }
            PrintType::Csv => {
                let mut columns = vec!["TestCase"];
                columns.extend(VALUE_COLUMNS);
                columns.extend(["Type", "Label [unit]"]);
                writeln!(self.writer, "{}", columns.join(","))
            }
            PrintType::Json => Ok(()),
        }
    }

    pub fn print_statistics(&mut self, test_name: &str, report: &StatisticsReport) -> io::Result<()> {
        match self.print_type {
            PrintType::Default => self.print_default(test_name, report),
            PrintType::DefaultWithVerbose => {
                self.print_default(test_name, report)?;
                self.print_verbose(report)
            }
            PrintType::Csv => self.print_csv(test_name, report),
            PrintType::Noop => self.print_noop(test_name, report),
            PrintType::Json => self.print_json(test_name, report),
        }
    }

    /// One line carrying a result message instead of numbers.
    pub fn print_status(&mut self, test_name: &str, message: &str) -> io::Result<()> {
        match self.print_type {
            PrintType::Default | PrintType::DefaultWithVerbose | PrintType::Noop => {
                let message_width = 3 * VALUE_COLUMN_WIDTH;
                writeln!(
                    self.writer,
                    "{:>name_width$}{:>message_width$}",
                    test_name,
                    message,
                    name_width = self.name_width,
                    message_width = message_width
                )
            }
            PrintType::Csv => {
                let column_count = VALUE_COLUMNS.len() + 2;
                writeln!(
                    self.writer,
                    "{},{}",
                    test_name,
                    vec![message; column_count].join(",")
                )
            }
            PrintType::Json => {
                let line = JsonStatus {
                    timestamp: timestamp_rfc3339(),
                    test: test_name,
                    status: message,
                };
                self.write_json(&line)
            }
        }
    }

    fn print_default(&mut self, test_name: &str, report: &StatisticsReport) -> io::Result<()> {
        for (index, series) in report.series.iter().enumerate() {
            let name = if index == 0 { test_name } else { "" };
            let strings = MetricsStrings::new(series.metrics.as_ref(), report.reached_infinity);

            write!(self.writer, "{:>width$}", name, width = self.name_width)?;
            for value in strings.values() {
                write!(self.writer, "{:>width$}", value, width = VALUE_COLUMN_WIDTH)?;
            }
            write!(
                self.writer,
                "{:>width$}",
                series.measurement_type.label(),
                width = TYPE_COLUMN_WIDTH
            )?;
            writeln!(
                self.writer,
                " {:>width$}",
                series.unit_label(),
                width = LABEL_COLUMN_WIDTH - 1
            )?;
        }
        Ok(())
    }

    fn print_verbose(&mut self, report: &StatisticsReport) -> io::Result<()> {
        for series in &report.series {
            write!(self.writer, "individual ")?;
            if !series.label.is_empty() {
                write!(self.writer, "{} ", series.label)?;
            }
            write!(self.writer, "results: [ ")?;
            for sample in &series.samples {
                write!(self.writer, "{} ", sample)?;
            }
            writeln!(self.writer, "]")?;
        }
        writeln!(self.writer)
    }

    fn print_csv(&mut self, test_name: &str, report: &StatisticsReport) -> io::Result<()> {
        if report.series.is_empty() {
            warn!("Test {} did not generate any values", test_name);
        }
        for series in &report.series {
            let strings = MetricsStrings::new(series.metrics.as_ref(), report.reached_infinity);
            writeln!(
                self.writer,
                "{},{},{},{}",
                test_name,
                strings.values().join(","),
                series.measurement_type.label(),
                series.unit_label()
            )?;
        }
        Ok(())
    }

    fn print_noop(&mut self, test_name: &str, report: &StatisticsReport) -> io::Result<()> {
        let Some(shape) = report.shape() else {
            warn!("Test {} did not declare its measurement unit and type", test_name);
            return Ok(());
        };

        // Type and unit land under the last two columns
        let padding = VALUE_COLUMNS.len() * VALUE_COLUMN_WIDTH + TYPE_COLUMN_WIDTH;
        writeln!(
            self.writer,
            "{:>name_width$}{:>padding$}{:>label_width$}",
            test_name,
            shape.measurement_type.label(),
            shape.unit.label(),
            name_width = self.name_width,
            padding = padding,
            label_width = LABEL_COLUMN_WIDTH
        )
    }

    fn print_json(&mut self, test_name: &str, report: &StatisticsReport) -> io::Result<()> {
        let line = JsonStatistics {
            timestamp: timestamp_rfc3339(),
            test: test_name,
            report,
        };
        self.write_json(&line)
    }

    fn write_json<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        writeln!(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(label: &str, samples: &[f64]) -> SeriesReport {
        SeriesReport {
            label: label.to_string(),
            unit: MeasurementUnit::GigabytesPerSecond,
            measurement_type: MeasurementType::Gpu,
            count: samples.len(),
            metrics: Metrics::compute(samples, 0),
            samples: samples.to_vec(),
        }
    }

    fn render(print_type: PrintType, print: impl FnOnce(&mut ReportPrinter<Vec<u8>>)) -> String {
        let mut printer = ReportPrinter::new(Vec::new(), print_type).with_name_width(10);
        print(&mut printer);
        String::from_utf8(printer.into_inner()).unwrap()
    }

    #[test]
    fn test_header_layouts() {
        let text = render(PrintType::Default, |p| p.print_header().unwrap());
        assert!(text.starts_with("  TestCase           Mean"));
        assert!(text.ends_with("   Type   Label [unit]\n"));

        let csv = render(PrintType::Csv, |p| p.print_header().unwrap());
        assert_eq!(csv, "TestCase,Mean,Median,StdDev,Min,Max,Type,Label [unit]\n");

        assert_eq!(render(PrintType::Json, |p| p.print_header().unwrap()), "");
    }

    #[test]
    fn test_default_rows() {
        let report = StatisticsReport {
            series: vec![series("BCS", &[2.0, 4.0]), series("Total", &[6.0, 6.0])],
            ..Default::default()
        };
        let text = render(PrintType::Default, |p| p.print_statistics("Copy", &report).unwrap());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        assert!(lines[0].starts_with("      Copy          3.000          3.000         33.33%"));
        assert!(lines[0].ends_with("GPU     BCS [GB/s]"));
        assert!(lines[1].starts_with("                    6.000"));
        assert!(lines[1].contains("0.00%"));
    }

    #[test]
    fn test_infinity_hides_mean_and_deviation() {
        let report = StatisticsReport {
            series: vec![series("", &[1.0])],
            reached_infinity: true,
            ..Default::default()
        };
        let csv = render(PrintType::Csv, |p| p.print_statistics("T", &report).unwrap());
        assert_eq!(csv, "T,inf,1.000,inf,1.000,1.000,GPU,[GB/s]\n");
    }

    #[test]
    fn test_verbose_dump() {
        let report = StatisticsReport {
            series: vec![series("", &[1.5, 2.0]), series("x", &[3.0])],
            ..Default::default()
        };
        let text = render(PrintType::DefaultWithVerbose, |p| {
            p.print_statistics("T", &report).unwrap()
        });
        assert!(text.contains("individual results: [ 1.5 2 ]\n"));
        assert!(text.contains("individual x results: [ 3 ]\n"));
        assert!(text.ends_with("]\n\n"));
    }

    #[test]
    fn test_noop_row() {
        let report = StatisticsReport {
            declared: Some(TypeSelector::bandwidth(false)),
            ..Default::default()
        };
        let text = render(PrintType::Noop, |p| p.print_statistics("Noop", &report).unwrap());
        assert!(text.starts_with("      Noop"));
        assert!(text.trim_end().ends_with("CPU         [GB/s]"));
        assert_eq!(text.len(), 10 + 5 * 15 + 7 + 15 + 1);
    }

    #[test]
    fn test_status_lines() {
        let text = render(PrintType::Default, |p| p.print_status("T", "NO_SUPPORT").unwrap());
        assert_eq!(text.len(), 10 + 45 + 1);
        assert!(text.ends_with("NO_SUPPORT\n"));

        let csv = render(PrintType::Csv, |p| p.print_status("T", "ERROR").unwrap());
        assert_eq!(csv, "T,ERROR,ERROR,ERROR,ERROR,ERROR,ERROR,ERROR\n");
    }

    #[test]
    fn test_json_lines() {
        let report = StatisticsReport {
            series: vec![series("", &[1.0, 3.0])],
            ..Default::default()
        };
        let text = render(PrintType::Json, |p| {
            p.print_statistics("T", &report).unwrap();
            p.print_status("T", "SKIPPED").unwrap();
        });
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines[0]["test"], "T");
        assert_eq!(lines[0]["series"][0]["count"], 2);
        assert_eq!(lines[0]["series"][0]["unit"], "gigabytes_per_second");
        assert_eq!(lines[0]["series"][0]["metrics"]["mean"], 2.0);
        assert_eq!(lines[1]["status"], "SKIPPED");
        assert!(lines[1]["timestamp"].is_string());
    }
}
