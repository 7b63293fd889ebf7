use std::fmt;
use std::time::Duration;

/// Counters collected during one branch-and-bound run
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStatistics {
    /// Relaxations solved
    pub nodes_explored: u64,
    /// Nodes whose relaxation could not beat the incumbent
    pub pruned_by_bound: u64,
    /// Nodes skipped because an identical sub-problem was already seen
    pub pruned_by_duplicate: u64,
    /// Nodes with an infeasible relaxation
    pub infeasible_nodes: u64,
    /// Integral relaxations that became the new incumbent
    pub incumbent_updates: u64,
    /// Nodes split into two children
    pub branched: u64,
    /// Nodes dropped because the relaxation strategy failed
    pub abandoned: u64,
    /// Synchronized rounds (parallel search only)
    pub rounds: u64,
    /// The run stopped early on an interrupt request
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl SearchStatistics {
    pub(crate) fn record(&mut self, event: NodeEvent) {
        self.nodes_explored += 1;
        match event {
            NodeEvent::Unbounded | NodeEvent::IntegralRejected => {}
            NodeEvent::Infeasible => self.infeasible_nodes += 1,
            NodeEvent::Duplicate => self.pruned_by_duplicate += 1,
            NodeEvent::PrunedByBound => self.pruned_by_bound += 1,
            NodeEvent::IncumbentUpdated => self.incumbent_updates += 1,
            NodeEvent::Branched => self.branched += 1,
        }
    }
}

/// What happened to a single node, for bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeEvent {
    Unbounded,
    Infeasible,
    Duplicate,
    PrunedByBound,
    IncumbentUpdated,
    /// Integral, but another worker installed a better incumbent first
    IntegralRejected,
    Branched,
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes ({} branched, {} bound, {} duplicate, {} infeasible, {} abandoned), {} incumbent updates in {:.3?}",
            self.nodes_explored,
            self.branched,
            self.pruned_by_bound,
            self.pruned_by_duplicate,
            self.infeasible_nodes,
            self.abandoned,
            self.incumbent_updates,
            self.elapsed
        )?;
        if self.rounds > 0 {
            write!(f, ", {} rounds", self.rounds)?;
        }
        if self.interrupted {
            write!(f, ", interrupted")?;
        }
        Ok(())
    }
}
