//! Transaction retrieval: wire schema for `getTransaction` responses and
//! the retrying fetcher that issues them.

pub mod fetcher;
pub mod types;

pub use fetcher::TransactionFetcher;
pub use types::TransactionRecord;
