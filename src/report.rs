//! Iteration-log persistence.
//!
//! The logical record per accepted decision is
//! `(iteration, user, item, {metric: value}..., elapsed_micros)`, preceded by
//! a header row naming the metric columns. The text codec here is
//! tab-separated; binary encodings are interchangeable at this logical level
//! and out of scope. The reader reconstructs the `(user, item, value)` prefix
//! a resumed loop replays.
//!
//! Persistence happens in the orchestrator between iterations; nothing in the
//! core state machine does I/O.

use std::io::{BufRead, Write};

use crate::error::ReportError;
use crate::record::{InteractionRecord, ItemIdx, UserIdx};

/// One persisted iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedIteration {
    /// Iteration number (1-based, as reported by the loop).
    pub iteration: u64,
    /// The user the decision was made for.
    pub user: UserIdx,
    /// The recommended item.
    pub item: ItemIdx,
    /// The revealed value.
    pub value: f64,
    /// Metric values, positionally matching the header row.
    pub metrics: Vec<f64>,
    /// Wall time the iteration took, in microseconds.
    pub elapsed_micros: u64,
}

impl LoggedIteration {
    /// The interaction this entry reveals, for replay.
    #[must_use]
    pub const fn record(&self) -> InteractionRecord {
        InteractionRecord::new(self.user, self.item, self.value)
    }
}

/// Sink for iteration records.
pub trait IterationWriter {
    /// Writes the header row naming the metric columns. Called once, first.
    ///
    /// # Errors
    /// [`ReportError`] on I/O failure.
    fn write_header(&mut self, metric_names: &[&str]) -> Result<(), ReportError>;

    /// Appends one iteration entry.
    ///
    /// # Errors
    /// [`ReportError`] on I/O failure.
    fn write(&mut self, entry: &LoggedIteration) -> Result<(), ReportError>;
}

/// Source of previously persisted iteration records.
pub trait IterationReader {
    /// Reads the full log: metric names from the header, then every entry in
    /// order.
    ///
    /// # Errors
    /// [`ReportError`] when the log is malformed.
    fn read_all(&mut self) -> Result<(Vec<String>, Vec<LoggedIteration>), ReportError>;
}

/// Fixed leading columns before the metric block.
const FIXED_COLUMNS: [&str; 3] = ["iter", "user", "item"];
/// Trailing column after the metric block.
const TIME_COLUMN: &str = "time_us";
/// Revealed-value column, right after the fixed block.
const VALUE_COLUMN: &str = "value";

/// Tab-separated text writer.
pub struct TsvWriter<W: Write> {
    inner: W,
    columns: usize,
}

impl<W: Write> TsvWriter<W> {
    /// Wraps a byte sink.
    #[must_use]
    pub const fn new(inner: W) -> Self {
        Self { inner, columns: 0 }
    }

    /// Unwraps the underlying sink, flushing it.
    ///
    /// # Errors
    /// [`ReportError`] if the flush fails.
    pub fn into_inner(mut self) -> Result<W, ReportError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> IterationWriter for TsvWriter<W> {
    fn write_header(&mut self, metric_names: &[&str]) -> Result<(), ReportError> {
        self.columns = metric_names.len();

        let mut row: Vec<&str> = FIXED_COLUMNS.to_vec();
        row.push(VALUE_COLUMN);
        row.extend_from_slice(metric_names);
        row.push(TIME_COLUMN);
        writeln!(self.inner, "{}", row.join("\t"))?;
        Ok(())
    }

    fn write(&mut self, entry: &LoggedIteration) -> Result<(), ReportError> {
        let metrics = entry
            .metrics
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("\t");

        if entry.metrics.len() == self.columns {
            writeln!(
                self.inner,
                "{}\t{}\t{}\t{}\t{}\t{}",
                entry.iteration, entry.user, entry.item, entry.value, metrics, entry.elapsed_micros
            )?;
        } else {
            return Err(ReportError::Malformed {
                line: 0,
                reason: format!(
                    "entry carries {} metric values, header named {}",
                    entry.metrics.len(),
                    self.columns
                ),
            });
        }
        Ok(())
    }
}

/// Tab-separated text reader.
pub struct TsvReader<R: BufRead> {
    inner: R,
}

impl<R: BufRead> TsvReader<R> {
    /// Wraps a buffered byte source.
    #[must_use]
    pub const fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Convenience: read only the interaction prefix, for resume.
    ///
    /// # Errors
    /// [`ReportError`] when the log is malformed.
    pub fn read_prefix(&mut self) -> Result<Vec<InteractionRecord>, ReportError> {
        let (_, entries) = self.read_all()?;
        Ok(entries.iter().map(LoggedIteration::record).collect())
    }

    /// Reads the prefix grouped by decision (entries sharing an iteration
    /// number), the shape ranking-mode resume needs.
    ///
    /// # Errors
    /// [`ReportError`] when the log is malformed.
    pub fn read_decisions(&mut self) -> Result<Vec<Vec<InteractionRecord>>, ReportError> {
        let (_, entries) = self.read_all()?;
        let mut decisions: Vec<Vec<InteractionRecord>> = Vec::new();
        let mut last_iteration = None;
        for entry in &entries {
            if last_iteration == Some(entry.iteration) {
                if let Some(current) = decisions.last_mut() {
                    current.push(entry.record());
                }
            } else {
                decisions.push(vec![entry.record()]);
                last_iteration = Some(entry.iteration);
            }
        }
        Ok(decisions)
    }
}

fn parse_field<T: std::str::FromStr>(
    field: &str,
    line: usize,
    what: &str,
) -> Result<T, ReportError> {
    field.parse().map_err(|_| ReportError::Malformed {
        line,
        reason: format!("unparseable {what}: '{field}'"),
    })
}

impl<R: BufRead> IterationReader for TsvReader<R> {
    fn read_all(&mut self) -> Result<(Vec<String>, Vec<LoggedIteration>), ReportError> {
        let mut lines = Vec::new();
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.inner.read_line(&mut buf)? == 0 {
                break;
            }
            let trimmed = buf.trim_end_matches(['\n', '\r']);
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }

        let Some(header) = lines.first() else {
            return Err(ReportError::InvalidHeader {
                reason: "empty log".to_string(),
            });
        };

        let columns: Vec<&str> = header.split('\t').collect();
        let fixed = FIXED_COLUMNS.len() + 1; // + value column
        if columns.len() < fixed + 1
            || columns[..FIXED_COLUMNS.len()] != FIXED_COLUMNS
            || columns[FIXED_COLUMNS.len()] != VALUE_COLUMN
            || columns[columns.len() - 1] != TIME_COLUMN
        {
            return Err(ReportError::InvalidHeader {
                reason: format!("unexpected columns: '{header}'"),
            });
        }
        let metric_names: Vec<String> = columns[fixed..columns.len() - 1]
            .iter()
            .map(ToString::to_string)
            .collect();

        let mut entries = Vec::with_capacity(lines.len().saturating_sub(1));
        for (idx, line) in lines.iter().enumerate().skip(1) {
            let line_no = idx + 1;
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != columns.len() {
                return Err(ReportError::Malformed {
                    line: line_no,
                    reason: format!(
                        "expected {} columns, found {}",
                        columns.len(),
                        fields.len()
                    ),
                });
            }

            let metrics = fields[fixed..fields.len() - 1]
                .iter()
                .map(|f| parse_field(f, line_no, "metric value"))
                .collect::<Result<Vec<f64>, _>>()?;

            entries.push(LoggedIteration {
                iteration: parse_field(fields[0], line_no, "iteration")?,
                user: parse_field(fields[1], line_no, "user")?,
                item: parse_field(fields[2], line_no, "item")?,
                value: parse_field(fields[3], line_no, "value")?,
                metrics,
                elapsed_micros: parse_field(fields[fields.len() - 1], line_no, "elapsed time")?,
            });
        }

        Ok((metric_names, entries))
    }
}
