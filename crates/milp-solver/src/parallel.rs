//! Round-based parallel branch-and-bound.
//!
//! Every round launches a scoped pool of workers over the open sub-problems.
//! Each worker takes at most one sub-problem, explores it, and writes its
//! children to an output list that only becomes visible in the next round.
//! Joining the workers is the barrier between rounds.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::{SearchConfig, SearchOrder};
use crate::error::{ConfigError, SolveError};
use crate::incumbent::Incumbent;
use crate::node::{self, NodeContext, NodeOutcome};
use crate::problem::Problem;
use crate::search::SearchOutcome;
use crate::solution::Solution;
use crate::stats::{NodeEvent, SearchStatistics};
use crate::strategy::Solver;
use crate::visited::VisitedSet;

/// What a single worker did during a round
type WorkerResult = Option<Result<NodeEvent, SolveError>>;

pub struct ParallelBranchAndBound<S> {
    strategy: S,
    config: SearchConfig,
    interrupt: Option<Arc<AtomicBool>>,
}

impl<S: Solver + Sync> ParallelBranchAndBound<S> {
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            config: SearchConfig::default(),
            interrupt: None,
        }
    }

    pub fn with_config(strategy: S, config: SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            strategy,
            config,
            interrupt: None,
        })
    }

    /// Stops the search at the next round barrier once `flag` is set.
    /// Workers already running finish their node.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Runs rounds until no open sub-problem is left.
    ///
    /// A failing or panicking relaxation abandons its node only; the search
    /// goes on and counts it in [`SearchStatistics::abandoned`].
    pub fn search(&self, problem: &Problem) -> SearchOutcome {
        let start = Instant::now();
        let workers = self.config.worker_count();
        let incumbent = Incumbent::new();
        let visited = VisitedSet::new();
        let ctx = NodeContext {
            config: &self.config,
            incumbent: &incumbent,
            visited: &visited,
        };
        let mut statistics = SearchStatistics::default();
        let mut open = VecDeque::from([problem.clone()]);

        while !open.is_empty() {
            if self.is_interrupted() {
                info!(open = open.len(), "search interrupted, returning best incumbent");
                statistics.interrupted = true;
                break;
            }

            statistics.rounds += 1;
            let threads = workers.min(open.len());
            let input = Mutex::new(open);
            let output = Mutex::new(Vec::new());
            let unbounded = AtomicBool::new(false);

            let results: Vec<thread::Result<WorkerResult>> = thread::scope(|scope| {
                let (ctx, input, output, unbounded) = (&ctx, &input, &output, &unbounded);
                let handles: Vec<_> = (0..threads)
                    .map(|_| scope.spawn(move || self.work(ctx, input, output, unbounded)))
                    .collect();
                handles.into_iter().map(|handle| handle.join()).collect()
            });

            for result in results {
                match result {
                    Ok(Some(Ok(event))) => statistics.record(event),
                    Ok(Some(Err(err))) => {
                        warn!(error = %err, "relaxation failed, node abandoned");
                        statistics.abandoned += 1;
                    }
                    Ok(None) => {}
                    Err(_) => {
                        warn!("worker panicked, node abandoned");
                        statistics.abandoned += 1;
                    }
                }
            }

            if unbounded.load(Ordering::Relaxed) {
                statistics.elapsed = start.elapsed();
                info!(rounds = statistics.rounds, "relaxation unbounded, stopping search");
                return SearchOutcome {
                    solution: Solution::unbounded(),
                    statistics,
                };
            }

            open = input.into_inner();
            open.extend(output.into_inner());

            if self.config.debug {
                debug!(round = statistics.rounds, open = open.len(), visited = visited.len(), "round finished");
            }
        }

        statistics.elapsed = start.elapsed();
        let solution = incumbent.into_inner().unwrap_or_else(Solution::infeasible);
        info!(
            status = ?solution.status,
            objective = solution.objective_value,
            workers,
            "parallel branch-and-bound finished: {}",
            statistics
        );

        SearchOutcome { solution, statistics }
    }

    fn work(
        &self,
        ctx: &NodeContext<'_>,
        input: &Mutex<VecDeque<Problem>>,
        output: &Mutex<Vec<Problem>>,
        unbounded: &AtomicBool,
    ) -> WorkerResult {
        if unbounded.load(Ordering::Relaxed) {
            return None;
        }

        let problem = {
            let mut queue = input.lock();
            match self.config.order {
                SearchOrder::DepthFirst => queue.pop_back(),
                SearchOrder::BreadthFirst => queue.pop_front(),
            }
        }?;

        let result = node::explore(&self.strategy, ctx, &problem).map(|outcome| {
            let event = outcome.event();
            match outcome {
                NodeOutcome::Unbounded => unbounded.store(true, Ordering::Relaxed),
                // Another worker may have hit an unbounded node meanwhile
                NodeOutcome::Branched(children) if !unbounded.load(Ordering::Relaxed) => {
                    output.lock().extend(children);
                }
                _ => {}
            }
            event
        });

        Some(result)
    }

    fn is_interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

impl<S: Solver + Sync> Solver for ParallelBranchAndBound<S> {
    fn solve(&self, problem: &Problem) -> Result<Solution, SolveError> {
        Ok(self.search(problem).solution)
    }
}
