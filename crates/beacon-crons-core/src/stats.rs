// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Running call statistics for a supervised job.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::error::{CoreError, Result};
use crate::keys::{FIELD_STATS_AVG, FIELD_STATS_FAILURES, FIELD_STATS_MAX, FIELD_STATS_NUM};

/// Aggregate statistics for one job on one day.
///
/// `max` is an exact decimal so that comparisons against new durations never
/// lose precision; `avg` is a plain floating running mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobStats {
	/// Completed invocations.
	pub num: u64,
	/// Maximum observed duration, seconds. Non-decreasing within the day.
	pub max: Decimal,
	/// Running mean duration, seconds.
	pub avg: f64,
	/// Invocations whose job body returned an error. Maintained by atomic
	/// increments, not by [`JobStats::fold`].
	pub failures: u64,
}

impl Default for JobStats {
	fn default() -> Self {
		Self {
			num: 0,
			max: Decimal::ZERO,
			avg: 0.0,
			failures: 0,
		}
	}
}

impl JobStats {
	/// Parse an aggregate from stored hash fields. Absent fields are zero;
	/// a record that does not exist yet parses as the empty aggregate.
	pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self> {
		let num = parse_field(fields, FIELD_STATS_NUM, |v| v.parse::<u64>().ok())?;
		let max = parse_field(fields, FIELD_STATS_MAX, |v| v.parse::<Decimal>().ok())?;
		let avg = parse_field(fields, FIELD_STATS_AVG, |v| v.parse::<f64>().ok())?;
		let failures = parse_field(fields, FIELD_STATS_FAILURES, |v| v.parse::<u64>().ok())?;
		Ok(Self {
			num,
			max,
			avg,
			failures,
		})
	}

	/// Fold one completed run into the aggregate.
	///
	/// The maximum comparison is exact: when the stored maximum wins it is
	/// carried through unchanged, including its stored scale.
	#[must_use]
	pub fn fold(&self, duration_ms: u64) -> Self {
		let duration = Decimal::new(duration_ms as i64, 3);
		let secs = duration_ms as f64 / 1_000.0;
		let num = self.num + 1;
		Self {
			num,
			max: if self.max >= duration { self.max } else { duration },
			avg: (self.avg * self.num as f64 + secs) / num as f64,
			failures: self.failures,
		}
	}

	/// Hash fields to write back after a fold.
	///
	/// `failures` is deliberately absent: it is only ever moved by atomic
	/// increments, and rewriting it here would race them.
	pub fn update_fields(&self) -> Vec<(String, String)> {
		vec![
			(FIELD_STATS_MAX.to_string(), self.max.to_string()),
			(FIELD_STATS_NUM.to_string(), self.num.to_string()),
			(FIELD_STATS_AVG.to_string(), self.avg.to_string()),
		]
	}
}

fn parse_field<T: Default>(
	fields: &HashMap<String, String>,
	field: &'static str,
	parse: impl Fn(&str) -> Option<T>,
) -> Result<T> {
	match fields.get(field) {
		None => Ok(T::default()),
		Some(value) => parse(value).ok_or_else(|| CoreError::MalformedField {
			field,
			value: value.clone(),
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn fields(max: &str, num: &str, avg: &str) -> HashMap<String, String> {
		[
			(FIELD_STATS_MAX.to_string(), max.to_string()),
			(FIELD_STATS_NUM.to_string(), num.to_string()),
			(FIELD_STATS_AVG.to_string(), avg.to_string()),
		]
		.into_iter()
		.collect()
	}

	#[test]
	fn empty_record_parses_as_zero_aggregate() {
		let stats = JobStats::from_fields(&HashMap::new()).unwrap();
		assert_eq!(stats, JobStats::default());
	}

	#[test]
	fn malformed_num_is_an_error() {
		let stored = fields("1.5", "not-a-number", "1.5");
		assert!(matches!(
			JobStats::from_fields(&stored),
			Err(CoreError::MalformedField { field: "num", .. })
		));
	}

	#[test]
	fn fold_from_empty() {
		let stats = JobStats::default().fold(2_500);
		assert_eq!(stats.num, 1);
		assert_eq!(stats.max, Decimal::new(2_500, 3));
		assert!((stats.avg - 2.5).abs() < 1e-9);
	}

	#[test]
	fn fold_keeps_stored_max_representation_when_it_wins() {
		let stored = fields("10.50", "3", "4.0");
		let stats = JobStats::from_fields(&stored).unwrap().fold(2_000);
		// 10.50 > 2.000 - the stored value survives with its stored scale.
		assert_eq!(stats.max.to_string(), "10.50");
	}

	#[test]
	fn fold_replaces_max_when_exceeded() {
		let stored = fields("1.5", "2", "1.0");
		let stats = JobStats::from_fields(&stored).unwrap().fold(3_250);
		assert_eq!(stats.max, Decimal::new(3_250, 3));
	}

	#[test]
	fn update_fields_never_touch_failures() {
		let stats = JobStats::default().fold(100);
		assert!(stats
			.update_fields()
			.iter()
			.all(|(field, _)| field != FIELD_STATS_FAILURES));
	}

	proptest! {
		#[test]
		fn folding_a_sequence_matches_mean_max_and_count(
			durations in prop::collection::vec(0u64..600_000, 0..40)
		) {
			let folded = durations
				.iter()
				.fold(JobStats::default(), |acc, &d| acc.fold(d));

			prop_assert_eq!(folded.num, durations.len() as u64);

			let expected_max = durations
				.iter()
				.map(|&d| Decimal::new(d as i64, 3))
				.max()
				.unwrap_or(Decimal::ZERO);
			prop_assert_eq!(folded.max, expected_max);

			if !durations.is_empty() {
				let mean = durations.iter().map(|&d| d as f64 / 1_000.0).sum::<f64>()
					/ durations.len() as f64;
				prop_assert!((folded.avg - mean).abs() < 1e-6);
			}
		}

		#[test]
		fn max_is_monotone(seed in 0u64..600_000, next in 0u64..600_000) {
			let first = JobStats::default().fold(seed);
			let second = first.fold(next);
			prop_assert!(second.max >= first.max);
		}
	}
}
