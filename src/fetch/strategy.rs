use std::sync::Arc;

use futures::stream::{self, StreamExt};
use log::warn;

use crate::error::AppError;
use crate::fetch::ensure_worker_count;
use crate::fetch::quote::QuoteSource;
use crate::model::{Company, FetchOutcome};

/// Concurrency policy for driving per-company quote fetches.
///
/// The variants are interchangeable behind [`FetchStrategy::run`]; they differ
/// in scheduling and output order, never in the outcome set:
///
/// - `Sequential` fetches in input order on the calling task. No concurrency;
///   the correctness baseline and throughput floor.
/// - `DynamicPool` keeps at most `workers` fetches in flight and dispatches
///   the next pending company as soon as any fetch finishes, which balances
///   load when per-company latency is uneven. Output is in completion order;
///   re-sort by code when input order matters.
/// - `StaticPartition` pre-splits the list into `workers` contiguous chunks
///   and fetches each chunk sequentially on its own task. Concatenation in
///   partition order reproduces input order exactly, at the cost of load
///   balancing: a worker stuck on a slow chunk cannot hand work to an idle
///   sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    Sequential,
    DynamicPool { workers: usize },
    StaticPartition { workers: usize },
}

impl FetchStrategy {
    /// Resolve a strategy from its command-line name.
    pub fn from_name(name: &str, workers: usize) -> Option<Self> {
        match name {
            "sequential" => Some(FetchStrategy::Sequential),
            "dynamic" | "dynamic-pool" => Some(FetchStrategy::DynamicPool { workers }),
            "static" | "static-partition" => Some(FetchStrategy::StaticPartition { workers }),
            _ => None,
        }
    }

    /// Fetch one quote per company. Always returns exactly one outcome per
    /// input company: per-item failures become [`FetchOutcome::Failed`] and
    /// never abort the rest of the batch. Worker tasks are scoped to this
    /// call; nothing outlives the returned vector.
    pub async fn run<C>(&self, companies: Vec<Company>, client: Arc<C>) -> Vec<FetchOutcome>
    where
        C: QuoteSource + 'static,
    {
        match *self {
            FetchStrategy::Sequential => run_sequential(companies, client).await,
            FetchStrategy::DynamicPool { workers } => {
                run_dynamic_pool(companies, client, ensure_worker_count(workers)).await
            }
            FetchStrategy::StaticPartition { workers } => {
                run_static_partition(companies, client, ensure_worker_count(workers)).await
            }
        }
    }
}

async fn fetch_one<C: QuoteSource>(client: &C, company: Company) -> FetchOutcome {
    match client.fetch_quote(&company).await {
        Ok(quote) => FetchOutcome::Quote(quote),
        Err(cause) => {
            warn!("quote fetch for {} failed: {}", company.code, cause);
            FetchOutcome::Failed { company, cause }
        }
    }
}

async fn run_sequential<C>(companies: Vec<Company>, client: Arc<C>) -> Vec<FetchOutcome>
where
    C: QuoteSource,
{
    let mut outcomes = Vec::with_capacity(companies.len());
    for company in companies {
        outcomes.push(fetch_one(client.as_ref(), company).await);
    }
    outcomes
}

/// Fan the list out over at most `workers` spawned tasks; the next company is
/// dispatched as soon as any in-flight fetch completes. Outcomes are yielded
/// in completion order.
async fn run_dynamic_pool<C>(
    companies: Vec<Company>,
    client: Arc<C>,
    workers: usize,
) -> Vec<FetchOutcome>
where
    C: QuoteSource + 'static,
{
    stream::iter(companies.into_iter())
        .map(|company| {
            let client = Arc::clone(&client);
            async move {
                let fallback = company.clone();
                let handle =
                    tokio::spawn(async move { fetch_one(client.as_ref(), company).await });
                match handle.await {
                    Ok(outcome) => outcome,
                    // A panicked worker still owes the batch an outcome.
                    Err(err) => FetchOutcome::Failed {
                        company: fallback,
                        cause: AppError::from(err),
                    },
                }
            }
        })
        .buffer_unordered(workers)
        .collect()
        .await
}

/// One spawned task per contiguous chunk, each chunk fetched sequentially.
/// Joining the tasks in partition order reproduces input order exactly.
async fn run_static_partition<C>(
    companies: Vec<Company>,
    client: Arc<C>,
    workers: usize,
) -> Vec<FetchOutcome>
where
    C: QuoteSource + 'static,
{
    let total = companies.len();
    let mut handles = Vec::with_capacity(workers);

    for chunk in partition(companies, workers) {
        if chunk.is_empty() {
            continue;
        }
        let client = Arc::clone(&client);
        let fallback = chunk.clone();
        let handle = tokio::spawn(async move {
            let mut outcomes = Vec::with_capacity(chunk.len());
            for company in chunk {
                outcomes.push(fetch_one(client.as_ref(), company).await);
            }
            outcomes
        });
        handles.push((handle, fallback));
    }

    let mut outcomes = Vec::with_capacity(total);
    for (handle, fallback) in handles {
        match handle.await {
            Ok(chunk_outcomes) => outcomes.extend(chunk_outcomes),
            Err(err) => {
                // Every company in a panicked chunk is still owed an outcome.
                let cause = err.to_string();
                for company in fallback {
                    outcomes.push(FetchOutcome::Failed {
                        company,
                        cause: AppError::message(format!("partition worker failed: {cause}")),
                    });
                }
            }
        }
    }
    outcomes
}

/// Contiguous near-equal split: `len / workers` companies per partition, with
/// the remainder handed one extra to the leading partitions. Sizes differ by
/// at most one and every company lands in exactly one chunk, including when
/// the list length is not divisible by the worker count.
pub fn partition(companies: Vec<Company>, workers: usize) -> Vec<Vec<Company>> {
    let workers = ensure_worker_count(workers);
    let base = companies.len() / workers;
    let remainder = companies.len() % workers;

    let mut partitions = Vec::with_capacity(workers);
    let mut rest = companies;
    for index in 0..workers {
        let size = base + usize::from(index < remainder);
        let take = size.min(rest.len());
        let tail = rest.split_off(take);
        partitions.push(std::mem::replace(&mut rest, tail));
    }
    partitions
}
