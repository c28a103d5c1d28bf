//! Shared iteration budget.
//!
//! One budget is created per research run. Refinement cycles and feedback
//! rounds both spend from it, so together they never exceed the ceiling.

use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug)]
pub struct IterationBudget {
    limit: u32,
    spent: AtomicU32,
}

impl IterationBudget {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            spent: AtomicU32::new(0),
        }
    }

    /// Spend one unit. Returns false, spending nothing, when exhausted.
    pub fn try_spend(&self) -> bool {
        self.spent
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |spent| {
                (spent < self.limit).then_some(spent + 1)
            })
            .is_ok()
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.spent())
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn spent(&self) -> u32 {
        self.spent.load(Ordering::SeqCst)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}
