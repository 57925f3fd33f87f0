//! `tally-recon`: two-source transaction reconciliation engine.
//!
//! Records from a left and a right source are bucketed by a grouping key
//! (transaction ID, or a composite of amount, date window, profile and type),
//! paired tail-first inside each bucket, and classified as identical or as one
//! of three unmatched reasons.
//!
//! [`reconcile`] is pure: it takes loaded records and returns a result.
//! [`source`] adds CSV loading and a retrying file-level entry point.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod group;
pub mod key;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod retry;
pub mod source;
pub mod summary;

pub use config::{MatchConfig, ReconConfig, RetryConfig};
pub use engine::reconcile;
pub use error::{ErrorKind, ReconError};
pub use model::{ReasonCounts, ReconResult, TransactionRecord, UnmatchedReason, UnmatchedTransaction};
pub use retry::RetryPolicy;
pub use source::{load_csv_records, reconcile_files};
