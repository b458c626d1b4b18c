// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Job registrations, policies, and the supervised outcome type.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Cadence and duration thresholds for one job.
///
/// A zero minute threshold disables the corresponding check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobPolicy {
	/// Alert when `finish_time` is older than this many minutes
	/// (read by the external health-check process, not by this layer).
	pub max_no_job_minutes: u64,
	/// Alert when a new run starts less than this many minutes after the
	/// previous finish.
	pub min_no_job_minutes: u64,
	/// Alert when a run takes longer than this many seconds. `None` falls
	/// back to the supervisor's process-wide default.
	pub max_job_seconds: Option<u64>,
}

/// A supervised job registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
	/// Stable identifier for the job across runs: "ref_transactions".
	pub job_key: String,
	/// Mutual-exclusion namespace; defaults to the job key.
	pub flavor: Option<String>,
	pub policy: JobPolicy,
}

impl JobSpec {
	/// Create a registration with the default policy.
	///
	/// # Errors
	///
	/// Returns [`CoreError::InvalidJobKey`] if the key is not a valid
	/// identifier (see [`JobSpec::validate_job_key`]).
	pub fn new(job_key: impl Into<String>) -> Result<Self> {
		let job_key = job_key.into();
		if !Self::validate_job_key(&job_key) {
			return Err(CoreError::InvalidJobKey(job_key));
		}
		Ok(Self {
			job_key,
			flavor: None,
			policy: JobPolicy::default(),
		})
	}

	pub fn with_policy(mut self, policy: JobPolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn with_flavor(mut self, flavor: impl Into<String>) -> Self {
		self.flavor = Some(flavor.into());
		self
	}

	/// The lock namespace for this job.
	pub fn flavor_id(&self) -> &str {
		self.flavor.as_deref().unwrap_or(&self.job_key)
	}

	/// Validate a job key. Keys become store record keys and lock file
	/// names, so they are restricted to lowercase alphanumerics plus
	/// `-` and `_`, starting with a letter.
	pub fn validate_job_key(key: &str) -> bool {
		if key.is_empty() || key.len() > 64 {
			return false;
		}
		key
			.chars()
			.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
			&& key.starts_with(|c: char| c.is_ascii_lowercase())
	}
}

/// Result of one supervised invocation.
///
/// The supervisor never propagates the wrapped job's error; callers decide
/// whether the absence of a value is actionable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome<T> {
	/// The job ran to completion; carries its result.
	Completed(T),
	/// The job body returned an error. Stats and finish markers were still
	/// recorded and the failure was alerted.
	Failed,
	/// Another live instance held the lock; nothing ran and nothing was
	/// written.
	Skipped,
}

impl<T> JobOutcome<T> {
	pub fn is_completed(&self) -> bool {
		matches!(self, Self::Completed(_))
	}

	pub fn is_skipped(&self) -> bool {
		matches!(self, Self::Skipped)
	}

	/// The job's result, if it completed.
	pub fn into_value(self) -> Option<T> {
		match self {
			Self::Completed(value) => Some(value),
			Self::Failed | Self::Skipped => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn valid_keys_start_with_lowercase(key in "[a-z][a-z0-9_-]{0,63}") {
			prop_assert!(JobSpec::validate_job_key(&key));
		}

		#[test]
		fn keys_reject_uppercase(key in "[A-Z][a-z0-9_-]{0,30}") {
			prop_assert!(!JobSpec::validate_job_key(&key));
		}

		#[test]
		fn keys_reject_leading_digits(key in "[0-9][a-z0-9_-]{0,30}") {
			prop_assert!(!JobSpec::validate_job_key(&key));
		}
	}

	#[test]
	fn empty_key_is_invalid() {
		assert!(!JobSpec::validate_job_key(""));
	}

	#[test]
	fn overlong_key_is_invalid() {
		let key = "a".repeat(65);
		assert!(!JobSpec::validate_job_key(&key));
	}

	#[test]
	fn new_rejects_invalid_key() {
		assert!(matches!(
			JobSpec::new("Not Valid"),
			Err(CoreError::InvalidJobKey(_))
		));
	}

	#[test]
	fn flavor_defaults_to_job_key() {
		let spec = JobSpec::new("nightly_sync").unwrap();
		assert_eq!(spec.flavor_id(), "nightly_sync");
	}

	#[test]
	fn explicit_flavor_wins() {
		let spec = JobSpec::new("nightly_sync").unwrap().with_flavor("sync");
		assert_eq!(spec.flavor_id(), "sync");
	}

	#[test]
	fn outcome_value_extraction() {
		assert_eq!(JobOutcome::Completed(7).into_value(), Some(7));
		assert_eq!(JobOutcome::<i32>::Failed.into_value(), None);
		assert_eq!(JobOutcome::<i32>::Skipped.into_value(), None);
	}
}
