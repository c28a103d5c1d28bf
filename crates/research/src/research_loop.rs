//! The plan, search and refine loop.
//!
//! ```text
//! Planning ──> Searching ──> Evaluating ──> Done
//!                  ^              │
//!                  └── follow-up ─┘  (one budget unit per refinement)
//! ```
//!
//! The initial plan and search are free. Every refinement cycle after that
//! spends one unit of the shared [`IterationBudget`]; the budget is checked
//! before the evaluator is consulted, so an exhausted budget costs no model
//! call.

use crate::budget::IterationBudget;
use crate::planner::QueryPlanner;
use crate::types::ResearchOutcome;
use delve_core::AppResult;
use delve_search::{ResultSet, SearchExecutor};

enum Phase {
    Planning,
    Searching(Vec<String>),
    Evaluating,
    Done,
}

/// Mutable state of one run.
struct ResearchState<'t> {
    topic: &'t str,
    results: ResultSet,
    queries_used: Vec<String>,
    cycles: u32,
}

pub struct ResearchLoop<'a> {
    planner: &'a QueryPlanner,
    executor: &'a SearchExecutor,
    max_queries_per_cycle: usize,
}

impl<'a> ResearchLoop<'a> {
    pub fn new(
        planner: &'a QueryPlanner,
        executor: &'a SearchExecutor,
        max_queries_per_cycle: usize,
    ) -> Self {
        Self {
            planner,
            executor,
            max_queries_per_cycle,
        }
    }

    /// Research `topic` until the evaluator is satisfied or `budget` runs out.
    pub async fn run(&self, topic: &str, budget: &IterationBudget) -> AppResult<ResearchOutcome> {
        let mut state = ResearchState {
            topic,
            results: ResultSet::new(),
            queries_used: Vec::new(),
            cycles: 0,
        };
        let mut phase = Phase::Planning;

        loop {
            phase = match phase {
                Phase::Planning => self.plan(&mut state).await?,
                Phase::Searching(batch) => self.search(&mut state, batch).await?,
                Phase::Evaluating => self.evaluate(&mut state, budget).await?,
                Phase::Done => break,
            };
        }

        tracing::info!(
            documents = state.results.len(),
            queries = state.queries_used.len(),
            cycles = state.cycles,
            "Research loop finished"
        );

        Ok(ResearchOutcome {
            results: state.results,
            queries_used: state.queries_used,
            refinement_cycles: state.cycles,
        })
    }

    async fn plan(&self, state: &mut ResearchState<'_>) -> AppResult<Phase> {
        let queries = self.planner.plan(state.topic).await?;
        if queries.is_empty() {
            tracing::warn!(topic = state.topic, "Planner produced no queries");
            return Ok(Phase::Done);
        }
        Ok(self.issue(state, queries))
    }

    async fn search(&self, state: &mut ResearchState<'_>, batch: Vec<String>) -> AppResult<Phase> {
        let found = self.executor.execute(&batch).await?;
        state.results = std::mem::take(&mut state.results).add(found).dedup();
        Ok(Phase::Evaluating)
    }

    async fn evaluate(
        &self,
        state: &mut ResearchState<'_>,
        budget: &IterationBudget,
    ) -> AppResult<Phase> {
        if budget.is_exhausted() {
            tracing::info!(cycles = state.cycles, "Refinement budget exhausted");
            return Ok(Phase::Done);
        }

        let follow_up = self
            .planner
            .evaluate(state.topic, &state.queries_used, &state.results)
            .await?;
        if follow_up.is_empty() || !budget.try_spend() {
            return Ok(Phase::Done);
        }

        state.cycles += 1;
        tracing::info!(cycle = state.cycles, queries = follow_up.len(), "Starting refinement cycle");
        Ok(self.issue(state, follow_up))
    }

    /// Cap a batch, record it in the history and schedule it.
    fn issue(&self, state: &mut ResearchState<'_>, mut queries: Vec<String>) -> Phase {
        queries.truncate(self.max_queries_per_cycle);
        state.queries_used.extend(queries.iter().cloned());
        Phase::Searching(queries)
    }
}
