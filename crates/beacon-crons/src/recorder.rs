// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Persistence of per-job call statistics.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};

use beacon_crons_core::{day_offset, job_stats_key, JobStats, FIELD_STATS_FAILURES};
use beacon_store::JobStateStore;

use crate::error::Result;

/// Reads and updates the day-partitioned running aggregate for a job.
///
/// The read-fold-write sequence is not atomic in the store; it is safe
/// because the instance lock serialises invocations of a given job key, and
/// keys of different jobs never collide.
pub struct JobStatsRecorder {
	store: Arc<dyn JobStateStore>,
	stats_prefix: String,
}

impl JobStatsRecorder {
	pub fn new(store: Arc<dyn JobStateStore>, stats_prefix: impl Into<String>) -> Self {
		Self {
			store,
			stats_prefix: stats_prefix.into(),
		}
	}

	/// Fold one completed run of `duration_ms` into today's aggregate and
	/// return the updated statistics.
	#[instrument(skip(self), fields(job_key = %job_key))]
	pub async fn record(&self, job_key: &str, duration_ms: u64) -> Result<JobStats> {
		let key = self.stats_key(job_key);
		let fields = self.store.hash_get_all(&key).await?;
		let stats = JobStats::from_fields(&fields)?.fold(duration_ms);
		self.store.hash_set(&key, &stats.update_fields()).await?;
		debug!(
			key = %key,
			num = stats.num,
			max = %stats.max,
			avg = stats.avg,
			"recorded job statistics"
		);
		Ok(stats)
	}

	/// Atomically bump today's failure counter for `job_key`.
	#[instrument(skip(self), fields(job_key = %job_key))]
	pub async fn record_failure(&self, job_key: &str) -> Result<i64> {
		let key = self.stats_key(job_key);
		Ok(self
			.store
			.hash_increment(&key, FIELD_STATS_FAILURES, 1)
			.await?)
	}

	fn stats_key(&self, job_key: &str) -> String {
		job_stats_key(&self.stats_prefix, day_offset(Utc::now()), job_key)
	}
}
