// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Supervision configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::SupervisorError;

/// Process-wide default for the slow-run threshold, seconds.
pub const DEFAULT_MAX_JOB_SECONDS: u64 = 3_600;

const DEFAULT_JOB_PREFIX: &str = "cron_job";
const DEFAULT_STATS_PREFIX: &str = "cron_stats_";

/// Settings shared by all supervised jobs in a process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronsConfig {
	/// Key prefix of job-status records: `<job_prefix>_<job_key>`.
	pub job_prefix: String,

	/// Key prefix of job-stats records:
	/// `<stats_prefix><day_offset>__<job_key>`.
	pub stats_prefix: String,

	/// Slow-run threshold for jobs whose policy does not set one.
	pub default_max_job_seconds: u64,

	/// Directory holding instance lock files.
	pub lock_dir: PathBuf,
}

impl Default for CronsConfig {
	fn default() -> Self {
		Self {
			job_prefix: DEFAULT_JOB_PREFIX.to_string(),
			stats_prefix: DEFAULT_STATS_PREFIX.to_string(),
			default_max_job_seconds: DEFAULT_MAX_JOB_SECONDS,
			lock_dir: env::temp_dir(),
		}
	}
}

impl CronsConfig {
	/// Load configuration from `BEACON_CRON_*` environment variables,
	/// falling back to defaults for anything unset.
	///
	/// # Errors
	///
	/// Returns [`SupervisorError::Config`] when
	/// `BEACON_CRON_MAX_JOB_SECONDS` is set but not an integer.
	pub fn from_env() -> Result<Self, SupervisorError> {
		let mut config = Self::default();

		if let Ok(prefix) = env::var("BEACON_CRON_JOB_PREFIX") {
			config.job_prefix = prefix;
		}
		if let Ok(prefix) = env::var("BEACON_CRON_STATS_PREFIX") {
			config.stats_prefix = prefix;
		}
		if let Ok(raw) = env::var("BEACON_CRON_MAX_JOB_SECONDS") {
			config.default_max_job_seconds = raw.parse().map_err(|_| {
				SupervisorError::Config("BEACON_CRON_MAX_JOB_SECONDS must be an integer".into())
			})?;
		}
		if let Ok(dir) = env::var("BEACON_CRON_LOCK_DIR") {
			config.lock_dir = PathBuf::from(dir);
		}

		Ok(config)
	}
}
