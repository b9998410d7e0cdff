//! # call-reconcile
//!
//! Host side of the call reconciliation pipeline: a job store on disk,
//! CSV/JSON table adapters, TOML configuration, and the `recon` CLI. The
//! pure pipeline itself lives in [`call_reconcile_core`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌───────────────┐
//! │ contacts    │──▶│ export       │──▶│ FsJobStore    │
//! │ (csv/json)  │   │ rowmap+list  │   │ <root>/<job>/ │
//! └─────────────┘   └──────────────┘   └──────┬────────┘
//!                                             │
//! ┌─────────────┐   ┌──────────────┐   ┌──────▼────────┐
//! │ call log    │──▶│ classify     │──▶│ reconcile     │──▶ report
//! │ (csv/json)  │   │ + statistics │   │ (left join)   │
//! └─────────────┘   └──────────────┘   └───────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! recon job create contacts.csv --name "campaign-june"
//! recon job list
//! recon analyze 20240601_1030_ABCDE results.csv
//! recon stats results.csv
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`table_io`] | CSV/JSON table adapters |
//! | [`job_store`] | Directory-backed job store |
//! | [`create`] | Job creation |
//! | [`analyze`] | Classification, merge, and report writing |
//! | [`stats`] | Statistics output |
//! | [`jobs`] | Job history |
//! | [`logging`] | Tracing subscriber setup |

pub mod analyze;
pub mod config;
pub mod create;
pub mod job_store;
pub mod jobs;
pub mod logging;
pub mod stats;
pub mod table_io;
