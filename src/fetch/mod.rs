pub mod directory;
pub mod quote;
pub mod strategy;

pub use directory::DirectoryFetcher;
pub use quote::{QuoteClient, QuoteSource};
pub use strategy::FetchStrategy;

/// Floor applied to configured worker counts before a pool is sized.
#[inline]
pub fn ensure_worker_count(workers: usize) -> usize {
    workers.max(1)
}
