//! Job ledger: one JSON record per line.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::warn;

use crate::prelude::*;
use crate::result::JobRecord;

/// Write `records` to `path`, replacing any previous ledger.
pub fn write_ledger<'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a JobRecord>,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        writeln!(writer, "{}", record.to_json_line()?)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a ledger.
///
/// Blank and malformed lines are skipped with a warning so one damaged entry
/// does not hide the rest of the batch.
pub fn read_ledger(path: &Path) -> Result<Vec<JobRecord>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<JobRecord>(&line) {
            Ok(record) => records.push(record),
            Err(err) => warn!("{:?}:{} - Skipping malformed record - {}", path, idx + 1, err),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use sim_config::Predictor;

    use super::*;
    use crate::result::JobStatus;

    fn record(benchmark: &str, stats_dump: usize) -> JobRecord {
        JobRecord {
            job_tag: String::from("microbench_tests"),
            benchmark: String::from(benchmark),
            variant: Predictor::Local,
            output_dir: PathBuf::from(format!("results/microbench_tests/{benchmark}/LocalBP")),
            exit_status: JobStatus::Completed,
            wall_duration: 12.25,
            exit_code: Some(0),
            stats_dump,
            message: None,
        }
    }

    #[test]
    fn write_then_read() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("jobs.jsonl");
        let records = vec![record("CCa", 0), record("CCl", 1)];

        write_ledger(&path, &records)?;
        assert_eq!(read_ledger(&path)?, records);
        Ok(())
    }

    #[test]
    fn malformed_lines_are_skipped() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("jobs.jsonl");
        let good = record("CCa", 0).to_json_line()?;
        fs::write(&path, format!("{good}\n{{not json\n\n"))?;

        assert_eq!(read_ledger(&path)?, vec![record("CCa", 0)]);
        Ok(())
    }
}
