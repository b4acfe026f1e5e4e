use std::time::Duration;

use log::{info, warn};

use crate::error::AppError;
use crate::model::{Company, FetchOutcome, StockQuote};

/// Batch-level view over the per-company outcomes of one strategy run.
/// Derived in memory, never persisted.
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<FetchOutcome>,
    pub elapsed: Duration,
    pub success_count: usize,
    pub failure_count: usize,
}

/// Merge strategy output into a report. Outcomes are sorted by company code
/// so downstream consumers see one deterministic order regardless of which
/// strategy produced them.
pub fn aggregate(mut outcomes: Vec<FetchOutcome>, elapsed: Duration) -> BatchReport {
    outcomes.sort_by(|a, b| a.code().cmp(b.code()));

    let success_count = outcomes.iter().filter(|o| o.is_success()).count();
    let failure_count = outcomes.len() - success_count;

    BatchReport {
        outcomes,
        elapsed,
        success_count,
        failure_count,
    }
}

impl BatchReport {
    pub fn quotes(&self) -> impl Iterator<Item = &StockQuote> {
        self.outcomes.iter().filter_map(FetchOutcome::quote)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Company, &AppError)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            FetchOutcome::Failed { company, cause } => Some((company, cause)),
            FetchOutcome::Quote(_) => None,
        })
    }

    /// Companies whose fetch failed, for callers that want to re-run a
    /// strategy over just the failed subset.
    pub fn failed_companies(&self) -> Vec<Company> {
        self.failures().map(|(company, _)| company.clone()).collect()
    }

    /// Log the batch summary and every failed company with its cause, so
    /// partial data loss is visible and attributable, never silent.
    pub fn log_summary(&self) {
        info!(
            "fetched {} quotes ({} failed) in {:.3} sec",
            self.success_count,
            self.failure_count,
            self.elapsed.as_secs_f64()
        );
        for (company, cause) in self.failures() {
            warn!("{} ({}): {}", company.code, company.name, cause);
        }
    }
}
