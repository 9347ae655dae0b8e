//! Result table.

use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::Path;

use sim_config::Predictor;

use crate::columns::StatColumn;
use crate::extractor::StatRecord;
use crate::prelude::*;

/// Headers of the result table, in order.
pub const COLUMNS: [&str; 14] = [
    "benchmark",
    "predictor",
    "cycles",
    "instructions",
    "Ops",
    "Ticks",
    "Host",
    "branchMispredicts",
    "execBranches",
    "condPredicted",
    "condIncorrect",
    "ipc",
    "cpi",
    "accuracy",
];

/// `numerator / denominator`, or `NaN` when the denominator is zero.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

/// One `(benchmark, predictor)` row.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub benchmark: String,
    pub predictor: Predictor,
    pub cycles: f64,
    pub instructions: f64,
    pub ops: f64,
    /// Billions of ticks.
    pub ticks: f64,
    pub host: f64,
    pub branch_mispredicts: f64,
    pub exec_branches: f64,
    pub cond_predicted: f64,
    pub cond_incorrect: f64,
    /// Instructions per cycle.
    pub ipc: f64,
    /// Cycles per instruction.
    pub cpi: f64,
    /// Fraction of conditional branches predicted correctly.
    pub accuracy: f64,
}

impl ResultRow {
    /// Build a row from extracted stats, deriving the ratio columns.
    pub fn from_record(record: &StatRecord) -> Self {
        let raw = |column: StatColumn| column.scale(record.get(column.stat_name()));

        let cycles = raw(StatColumn::Cycles);
        let instructions = raw(StatColumn::Instructions);
        let cond_predicted = raw(StatColumn::CondPredicted);
        let cond_incorrect = raw(StatColumn::CondIncorrect);
        let ipc = ratio(instructions, cycles);

        Self {
            benchmark: record.benchmark.clone(),
            predictor: record.predictor,
            cycles,
            instructions,
            ops: raw(StatColumn::Ops),
            ticks: raw(StatColumn::Ticks),
            host: raw(StatColumn::Host),
            branch_mispredicts: raw(StatColumn::BranchMispredicts),
            exec_branches: raw(StatColumn::ExecBranches),
            cond_predicted,
            cond_incorrect,
            ipc,
            cpi: ratio(1.0, ipc),
            accuracy: 1.0 - ratio(cond_incorrect, cond_predicted),
        }
    }

    /// Value of a numeric column, looked up by header.
    pub fn value(&self, column: &str) -> Option<f64> {
        Some(match column {
            "cycles" => self.cycles,
            "instructions" => self.instructions,
            "Ops" => self.ops,
            "Ticks" => self.ticks,
            "Host" => self.host,
            "branchMispredicts" => self.branch_mispredicts,
            "execBranches" => self.exec_branches,
            "condPredicted" => self.cond_predicted,
            "condIncorrect" => self.cond_incorrect,
            "ipc" => self.ipc,
            "cpi" => self.cpi,
            "accuracy" => self.accuracy,
            _ => return None,
        })
    }

    fn values(&self) -> [f64; 12] {
        [
            self.cycles,
            self.instructions,
            self.ops,
            self.ticks,
            self.host,
            self.branch_mispredicts,
            self.exec_branches,
            self.cond_predicted,
            self.cond_incorrect,
            self.ipc,
            self.cpi,
            self.accuracy,
        ]
    }
}

/// Single cell of a selected column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnValue<'a> {
    pub benchmark: &'a str,
    pub predictor: Predictor,
    pub value: f64,
}

/// Rows ordered benchmark-major, predictor-minor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    /// Wrap rows that are already in table order.
    pub fn new(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row of `(benchmark, predictor)`.
    pub fn get(&self, benchmark: &str, predictor: Predictor) -> Option<&ResultRow> {
        self.rows
            .iter()
            .find(|row| row.benchmark == benchmark && row.predictor == predictor)
    }

    /// Every value of `column`, in table order.
    pub fn select(&self, column: &str) -> Result<Vec<ColumnValue<'_>>> {
        self.rows
            .iter()
            .map(|row| {
                let value = row
                    .value(column)
                    .ok_or_else(|| Error::UnknownColumn(String::from(column)))?;
                Ok(ColumnValue {
                    benchmark: &row.benchmark,
                    predictor: row.predictor,
                    value,
                })
            })
            .collect()
    }

    /// Like [`ResultTable::select`], dividing every value by the value of the
    /// first row of the same benchmark.
    pub fn select_normalized(&self, column: &str) -> Result<Vec<ColumnValue<'_>>> {
        let mut values = self.select(column)?;
        let mut base = (None, f64::NAN);
        for cell in values.iter_mut() {
            if base.0 != Some(cell.benchmark) {
                base = (Some(cell.benchmark), cell.value);
            }
            cell.value = ratio(cell.value, base.1);
        }
        Ok(values)
    }

    /// Write the table as CSV, header first.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(COLUMNS)?;
        for row in self.rows.iter() {
            let mut record = vec![row.benchmark.clone(), row.predictor.to_string()];
            record.extend(row.values().iter().map(f64::to_string));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the table as CSV to `path`, creating parent directories.
    pub fn write_csv_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.write_csv(File::create(path)?)
    }
}

fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else if value.is_finite() {
        format!("{value:.4}")
    } else {
        value.to_string()
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths: Vec<usize> = COLUMNS
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let cells = self.rows.iter().map(|row| match idx {
                    0 => row.benchmark.len(),
                    1 => row.predictor.label().len(),
                    _ => format_value(row.values()[idx - 2]).len(),
                });
                cells.fold(header.len(), usize::max)
            })
            .collect();

        for (idx, header) in COLUMNS.iter().enumerate() {
            if idx > 0 {
                f.write_str("  ")?;
            }
            write!(f, "{:>width$}", header, width = widths[idx])?;
        }
        writeln!(f)?;

        for row in self.rows.iter() {
            write!(f, "{:>width$}", row.benchmark, width = widths[0])?;
            write!(f, "  {:>width$}", row.predictor.label(), width = widths[1])?;
            for (idx, value) in row.values().iter().enumerate() {
                write!(f, "  {:>width$}", format_value(*value), width = widths[idx + 2])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
