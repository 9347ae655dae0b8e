//! Statistics log reader.
//!
//! A statistics log is a sequence of dumps. Each dump opens with a
//! `---------- Begin Simulation Statistics` line and holds lines shaped like
//!
//! ```text
//! system.cpu.numCycles     123456                       # Number of cpu cycles simulated
//! ```
//!
//! that is a dotted name, whitespace, a numeric token and an optional `#`
//! comment. The value of a stat is the trimmed text between the name and the
//! first `#`. A log without dump markers is a single dump.

use std::fs;
use std::path::Path;

use sim_config::layout::{DUMP_BEGIN_MARKER, STATS_FILE};
use tracing::debug;

/// Logs shorter than this are treated as missing.
pub const MIN_STATS_LEN: usize = 10;

/// One dump of a statistics log, held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsLog {
    text: String,
}

impl StatsLog {
    /// Wrap already loaded log text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Load dump number `dump` of the statistics log of `output_dir`.
    ///
    /// Returns `None` when the log is missing, unreadable or shorter than
    /// [`MIN_STATS_LEN`]. A dump index past the last dump selects the last
    /// one, so a non-empty log never yields an empty window.
    pub fn load(output_dir: &Path, dump: usize) -> Option<Self> {
        let path = output_dir.join(STATS_FILE);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!("{:?} - Statistics unavailable - {}", path, err);
                return None;
            }
        };
        if bytes.len() < MIN_STATS_LEN {
            debug!("{:?} - Statistics log too short ({} bytes)", path, bytes.len());
            return None;
        }

        let text = String::from_utf8_lossy(&bytes);
        Some(Self::from_text(select_dump(&text, dump)))
    }

    /// Value of the first line whose name is exactly `name`.
    ///
    /// A missing stat or an unparsable token yields `0.0`.
    pub fn lookup(&self, name: &str) -> f64 {
        self.text
            .lines()
            .find_map(|line| parse_stat_line(line, name))
            .unwrap_or(0.0)
    }
}

/// Text of dump number `dump`, or of the last dump when there are fewer.
fn select_dump(text: &str, dump: usize) -> &str {
    let mut starts = Vec::new();
    let mut pos = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_start().starts_with(DUMP_BEGIN_MARKER) {
            starts.push(pos);
        }
        pos += line.len();
    }

    let Some(last) = starts.len().checked_sub(1) else {
        return text;
    };
    if dump > last {
        debug!("Dump {} requested, log holds {}, using the last one", dump, starts.len());
    }
    let index = dump.min(last);
    let end = starts.get(index + 1).copied().unwrap_or(text.len());
    &text[starts[index]..end]
}

/// Extract the value of `name` from `line`, if the line holds that stat.
fn parse_stat_line(line: &str, name: &str) -> Option<f64> {
    let rest = line.trim_start().strip_prefix(name)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let token = match rest.find('#') {
        Some(end) => &rest[..end],
        None => rest,
    };
    match token.trim().parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            debug!("Malformed value '{}' for {}", token.trim(), name);
            Some(0.0)
        }
    }
}
