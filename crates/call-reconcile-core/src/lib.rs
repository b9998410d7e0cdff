//! # call-reconcile core
//!
//! Pure, I/O-free logic for reconciling an outbound calling campaign with
//! the contact list it was generated from: identity normalization,
//! fingerprinting, rule-based outcome classification, the reconciliation
//! merge, and summary statistics.
//!
//! This crate contains no tokio, filesystem, or encoding dependencies.
//! Reading and writing tables, manifests, and rowmaps belongs to the host
//! (see the `call-reconcile` crate), which hands already-decoded strings
//! to the functions here.
//!
//! ## Pipelines
//!
//! ```text
//! ingestion:  contacts ──▶ export::build_export ──▶ JobBundle ──▶ JobStore
//!
//! analysis:   calls ──▶ classify ──▶ merge::reconcile ──▶ report table
//!                              └──▶ stats::compute  ──▶ StatisticsSnapshot
//! ```

pub mod classify;
pub mod duration;
pub mod error;
pub mod export;
pub mod fingerprint;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod schema;
pub mod stats;
pub mod store;
pub mod table;

pub use error::{ReconcileError, Result};
