//! Raw statistic columns of the result table.

use std::fmt;

/// A column read straight from the statistics log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatColumn {
    Cycles,
    Instructions,
    Ops,
    Ticks,
    Host,
    BranchMispredicts,
    ExecBranches,
    CondPredicted,
    CondIncorrect,
}

impl StatColumn {
    /// Every raw column, in table order.
    pub const ALL: [StatColumn; 9] = [
        StatColumn::Cycles,
        StatColumn::Instructions,
        StatColumn::Ops,
        StatColumn::Ticks,
        StatColumn::Host,
        StatColumn::BranchMispredicts,
        StatColumn::ExecBranches,
        StatColumn::CondPredicted,
        StatColumn::CondIncorrect,
    ];

    /// Column header.
    pub fn header(self) -> &'static str {
        match self {
            StatColumn::Cycles => "cycles",
            StatColumn::Instructions => "instructions",
            StatColumn::Ops => "Ops",
            StatColumn::Ticks => "Ticks",
            StatColumn::Host => "Host",
            StatColumn::BranchMispredicts => "branchMispredicts",
            StatColumn::ExecBranches => "execBranches",
            StatColumn::CondPredicted => "condPredicted",
            StatColumn::CondIncorrect => "condIncorrect",
        }
    }

    /// Name of the stat in the simulator's log.
    pub fn stat_name(self) -> &'static str {
        match self {
            StatColumn::Cycles => "system.cpu.numCycles",
            StatColumn::Instructions => "sim_insts",
            StatColumn::Ops => "sim_ops",
            StatColumn::Ticks => "sim_ticks",
            StatColumn::Host => "host_op_rate",
            StatColumn::BranchMispredicts => "system.cpu.iew.branchMispredicts",
            StatColumn::ExecBranches => "system.cpu.iew.exec_branches",
            StatColumn::CondPredicted => "system.cpu.branchPred.condPredicted",
            StatColumn::CondIncorrect => "system.cpu.branchPred.condIncorrect",
        }
    }

    /// Turn a raw stat value into the column's unit.
    ///
    /// Ticks are reported in billions.
    pub fn scale(self, raw: f64) -> f64 {
        match self {
            StatColumn::Ticks => raw / 1e9,
            _ => raw,
        }
    }

    /// Stat names of every raw column.
    pub fn stat_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|column| column.stat_name()).collect()
    }
}

impl fmt::Display for StatColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}
