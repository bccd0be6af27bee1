//! Abstract report storage.
//!
//! Every storage backend implements [`ReportStore`]; the rest of the
//! workspace depends only on the trait. The in-memory backend doubles as the
//! test store and as the source of truth for deployments where durability is
//! delegated elsewhere. Both the live push path and the polling fallback
//! read through the same trait, so neither can be stale relative to the
//! other.

pub mod error;
pub mod memory;
pub mod report;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use report::ReportStore;
