//! Region-of-interest tracking.
//!
//! The simulator announces checkpoint events on its output as
//! `Exit Event<cause>`. A `workbegin` cause marks the start of the region of
//! interest: statistics gathered so far are discarded. A `workend` cause
//! marks its end: statistics are final even if the simulator keeps running.
//!
//! ```text
//! PreRoi --workbegin--> InRoi --workend--> Done
//!    |                    |
//!    +----process exit----+-------------> DoneNoRoi
//! ```

use serde::{Deserialize, Serialize};

/// Prefix of checkpoint event lines.
pub const EXIT_EVENT_PREFIX: &str = "Exit Event";

/// Cause reported by a checkpoint event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitCause {
    /// `m5_work_begin` reached.
    WorkBegin,
    /// `m5_work_end` reached.
    WorkEnd,
    /// Any other exit cause.
    Other(String),
}

/// Parse a simulator output line into a checkpoint event.
///
/// Accepts both `Exit Eventworkbegin` and `Exit Event workbegin`.
pub fn parse_exit_event(line: &str) -> Option<ExitCause> {
    let cause = line.trim().strip_prefix(EXIT_EVENT_PREFIX)?.trim();
    Some(match cause {
        "workbegin" => ExitCause::WorkBegin,
        "workend" => ExitCause::WorkEnd,
        other => ExitCause::Other(String::from(other)),
    })
}

/// Phase of a run with respect to its region of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoiPhase {
    /// Region of interest not reached yet.
    PreRoi,
    /// Inside the region of interest.
    InRoi,
    /// Region of interest ended.
    Done,
    /// Process exited without closing a region of interest.
    DoneNoRoi,
}

/// Side effect a transition asks the caller to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoiTransition {
    /// Discard statistics collected so far.
    ResetStats,
    /// Statistics are final.
    SnapshotStats,
    /// Statistics cover everything since the last reset.
    Finished,
}

/// State machine following the region of interest of one run.
#[derive(Debug, Clone)]
pub struct RoiTracker {
    phase: RoiPhase,
}

impl Default for RoiTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RoiTracker {
    /// Start in [`RoiPhase::PreRoi`].
    pub fn new() -> Self {
        Self {
            phase: RoiPhase::PreRoi,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> RoiPhase {
        self.phase
    }

    /// Whether the region of interest was closed by a `workend` event.
    pub fn roi_completed(&self) -> bool {
        self.phase == RoiPhase::Done
    }

    /// Feed a checkpoint event.
    ///
    /// A `workend` without a preceding `workbegin` closes the run with
    /// whole-run statistics. Events after a terminal phase are ignored.
    pub fn observe(&mut self, cause: &ExitCause) -> Option<RoiTransition> {
        match (self.phase, cause) {
            (RoiPhase::PreRoi, ExitCause::WorkBegin) => {
                self.phase = RoiPhase::InRoi;
                Some(RoiTransition::ResetStats)
            }
            (RoiPhase::PreRoi | RoiPhase::InRoi, ExitCause::WorkEnd) => {
                self.phase = RoiPhase::Done;
                Some(RoiTransition::SnapshotStats)
            }
            _ => None,
        }
    }

    /// Record that the process exited.
    pub fn process_exited(&mut self) -> Option<RoiTransition> {
        match self.phase {
            RoiPhase::PreRoi | RoiPhase::InRoi => {
                self.phase = RoiPhase::DoneNoRoi;
                Some(RoiTransition::Finished)
            }
            RoiPhase::Done | RoiPhase::DoneNoRoi => None,
        }
    }
}
