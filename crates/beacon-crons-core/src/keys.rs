// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared-store record keys and hash field names.
//!
//! These strings are the wire contract between the supervision layer and the
//! external health-check process that scans job-status records. Field names
//! must not change without coordinating with that process.

use chrono::{DateTime, Utc};

/// Last completed run, epoch seconds. Overwritten on every completion.
pub const FIELD_FINISH_TIME: &str = "finish_time";
/// Duration threshold the health check compares stale start markers against.
pub const FIELD_MAX_JOB_SECONDS: &str = "max_job_seconds";
/// Maximum tolerated gap since `finish_time`, in seconds.
pub const FIELD_MAX_NO_JOB_TIME_SECONDS: &str = "max_no_job_time_seconds";

/// Maximum observed duration within the day, seconds.
pub const FIELD_STATS_MAX: &str = "max";
/// Number of completed invocations within the day.
pub const FIELD_STATS_NUM: &str = "num";
/// Running mean duration within the day, seconds.
pub const FIELD_STATS_AVG: &str = "avg";
/// Count of invocations whose job body returned an error.
pub const FIELD_STATS_FAILURES: &str = "failures";

/// Key of the job-status record for a job.
pub fn job_status_key(prefix: &str, job_key: &str) -> String {
	format!("{prefix}_{job_key}")
}

/// Key of the job-stats record for a job on a given day.
///
/// Day-partitioning via the offset keeps per-day aggregates addressable
/// without a rollover step: writers and readers derive the same key from the
/// current date.
pub fn job_stats_key(prefix: &str, day_offset: i64, job_key: &str) -> String {
	format!("{prefix}{day_offset}__{job_key}")
}

/// Start-marker field for one run, namespaced by its start second so that
/// near-simultaneous starts do not clobber each other.
pub fn start_time_field(epoch_secs: i64) -> String {
	format!("start_time_{epoch_secs}")
}

/// Integer day offset since the Unix epoch for the given instant.
pub fn day_offset(at: DateTime<Utc>) -> i64 {
	at.timestamp().div_euclid(86_400)
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn status_key_joins_prefix_and_job() {
		assert_eq!(
			job_status_key("cron_job", "ref_transactions"),
			"cron_job_ref_transactions"
		);
	}

	#[test]
	fn stats_key_embeds_day_offset() {
		assert_eq!(
			job_stats_key("cron_stats_", 20_000, "ref_transactions"),
			"cron_stats_20000__ref_transactions"
		);
	}

	#[test]
	fn start_field_is_namespaced_by_second() {
		assert_eq!(start_time_field(1_700_000_000), "start_time_1700000000");
	}

	#[test]
	fn day_offset_at_epoch_is_zero() {
		let epoch = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
		assert_eq!(day_offset(epoch), 0);
	}

	#[test]
	fn day_offset_is_stable_within_a_day() {
		let morning = Utc.with_ymd_and_hms(2026, 8, 7, 0, 0, 1).unwrap();
		let evening = Utc.with_ymd_and_hms(2026, 8, 7, 23, 59, 59).unwrap();
		assert_eq!(day_offset(morning), day_offset(evening));
	}

	#[test]
	fn day_offset_increments_at_midnight() {
		let before = Utc.with_ymd_and_hms(2026, 8, 7, 23, 59, 59).unwrap();
		let after = Utc.with_ymd_and_hms(2026, 8, 8, 0, 0, 0).unwrap();
		assert_eq!(day_offset(after), day_offset(before) + 1);
	}
}
