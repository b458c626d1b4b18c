// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Anomaly alerting for supervised jobs.
//!
//! The supervision layer reports anomalies (cadence violations, failed or
//! slow runs) through an [`AlertSink`]. Alerts are keyed: an identical
//! `alert_key` within the de-duplication window is suppressed, so a job
//! failing on every trigger produces one notification per window rather
//! than one per run. Suppression state lives in the shared store
//! ([`beacon_store::DedupCache`]) and therefore holds across processes.

pub mod email;
pub mod recording;
pub mod sink;
pub mod tracing_sink;

pub use email::EmailAlertSink;
pub use recording::{RecordingAlertSink, SentAlert};
pub use sink::{AlertSink, DEFAULT_DEDUP_WINDOW};
pub use tracing_sink::TracingAlertSink;

use thiserror::Error;

/// Result type for alert operations.
pub type Result<T> = std::result::Result<T, AlertError>;

/// Errors that can occur delivering an alert.
#[derive(Debug, Error)]
pub enum AlertError {
	#[error("smtp delivery failed: {0}")]
	Smtp(#[from] beacon_smtp::SmtpError),

	#[error("dedup cache unavailable: {0}")]
	Dedup(#[from] beacon_store::StoreError),
}
