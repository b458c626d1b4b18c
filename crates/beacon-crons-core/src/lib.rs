// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Beacon cron job supervision.
//!
//! This crate defines the vocabulary shared by the supervision layer and its
//! clients: job registrations and policies, the explicit job outcome type,
//! the running statistics aggregate, and the shared-store wire contract
//! (record keys and hash field names) that the external health-check process
//! reads.

pub mod error;
pub mod job;
pub mod keys;
pub mod stats;

pub use error::{CoreError, Result};
pub use job::{JobOutcome, JobPolicy, JobSpec};
pub use keys::{
	day_offset, job_stats_key, job_status_key, start_time_field, FIELD_FINISH_TIME,
	FIELD_MAX_JOB_SECONDS, FIELD_MAX_NO_JOB_TIME_SECONDS, FIELD_STATS_AVG, FIELD_STATS_FAILURES,
	FIELD_STATS_MAX, FIELD_STATS_NUM,
};
pub use stats::JobStats;
