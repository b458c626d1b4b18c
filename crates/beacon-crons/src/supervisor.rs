// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The job supervisor: middleware composition over a job body.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use beacon_alerts::{AlertSink, DEFAULT_DEDUP_WINDOW};
use beacon_crons_core::{
	job_status_key, start_time_field, CoreError, JobOutcome, JobSpec, FIELD_FINISH_TIME,
	FIELD_MAX_JOB_SECONDS, FIELD_MAX_NO_JOB_TIME_SECONDS,
};
use beacon_store::JobStateStore;

use crate::config::CronsConfig;
use crate::error::Result;
use crate::lock::{InstanceLock, LockError};
use crate::recorder::JobStatsRecorder;

/// Suppression window for job-failure alerts. Shorter than the default so a
/// persistently failing daily job still reminds within the hour.
const ERROR_DEDUP_WINDOW: Duration = Duration::from_secs(9 * 60);

/// Wraps job bodies with single-instance locking, cadence validation,
/// start/finish markers, duration statistics, and anomaly alerting.
///
/// Layer order is fixed: the lock is outermost, so a contended invocation
/// produces no store writes and no alerts; everything else lives in the
/// inner stats layer, which assumes it is the only writer for its job key.
pub struct Supervisor {
	store: Arc<dyn JobStateStore>,
	alerts: Arc<dyn AlertSink>,
	recorder: JobStatsRecorder,
	config: CronsConfig,
}

impl Supervisor {
	pub fn new(
		store: Arc<dyn JobStateStore>,
		alerts: Arc<dyn AlertSink>,
		config: CronsConfig,
	) -> Self {
		let recorder = JobStatsRecorder::new(Arc::clone(&store), config.stats_prefix.clone());
		Self {
			store,
			alerts,
			recorder,
			config,
		}
	}

	/// Run `job` under full supervision.
	///
	/// Returns [`JobOutcome::Skipped`] without side effects when another
	/// live instance holds the flavor lock. Store failures during
	/// bookkeeping abort the invocation with an error; a failing job body
	/// does not (see [`Supervisor::run_with_stats`]).
	pub async fn run<F, Fut, T, E>(&self, spec: &JobSpec, job: F) -> Result<JobOutcome<T>>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = std::result::Result<T, E>>,
		E: std::fmt::Display,
	{
		let _lock = match InstanceLock::acquire(&self.config.lock_dir, spec.flavor_id()) {
			Ok(lock) => lock,
			Err(LockError::AlreadyRunning { .. }) => {
				// Expected under at-most-once scheduling with slow jobs;
				// the next trigger retries.
				debug!(job_key = %spec.job_key, "another instance holds the lock, skipping");
				return Ok(JobOutcome::Skipped);
			}
			Err(e) => return Err(e.into()),
		};
		self.run_with_stats(spec, job).await
	}

	/// The inner stats/alerting layer, callable on its own for jobs whose
	/// mutual exclusion is handled elsewhere.
	///
	/// A job body returning `Err` is contained: the failure is counted,
	/// alerted and logged, cleanup still records duration statistics and
	/// the finish marker, and the outcome is [`JobOutcome::Failed`].
	pub async fn run_with_stats<F, Fut, T, E>(&self, spec: &JobSpec, job: F) -> Result<JobOutcome<T>>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = std::result::Result<T, E>>,
		E: std::fmt::Display,
	{
		let started = Utc::now();
		let clock = Instant::now();
		let status_key = job_status_key(&self.config.job_prefix, &spec.job_key);
		let max_job_seconds = spec
			.policy
			.max_job_seconds
			.unwrap_or(self.config.default_max_job_seconds);

		if spec.policy.min_no_job_minutes > 0 {
			self.check_cadence(spec, &status_key, started.timestamp_millis())
				.await?;
		}

		// The start marker and thresholds exist for the external health
		// check, which alerts on stale start markers (hung jobs) and on
		// finish times older than the no-job threshold (jobs that stopped
		// being scheduled).
		let start_field = start_time_field(started.timestamp());
		self
			.store
			.hash_set(
				&status_key,
				&[
					(
						start_field.clone(),
						epoch_seconds(started.timestamp_millis()),
					),
					(
						FIELD_MAX_JOB_SECONDS.to_string(),
						max_job_seconds.to_string(),
					),
					(
						FIELD_MAX_NO_JOB_TIME_SECONDS.to_string(),
						(spec.policy.max_no_job_minutes * 60).to_string(),
					),
				],
			)
			.await?;

		let outcome = match job().await {
			Ok(value) => {
				info!(job_key = %spec.job_key, "supervised job completed");
				JobOutcome::Completed(value)
			}
			Err(e) => {
				// Best effort: a store or alert hiccup here must not skip
				// the cleanup below.
				if let Err(record_err) = self.recorder.record_failure(&spec.job_key).await {
					warn!(job_key = %spec.job_key, error = %record_err, "failed to count job failure");
				}
				let message = format!(
					"ERROR AT: {}\nMESSAGE: {}",
					std::any::type_name::<F>(),
					e
				);
				if let Err(alert_err) = self
					.alerts
					.send(
						&format!("job_error_{}", spec.job_key),
						"Cron job error",
						&message,
						ERROR_DEDUP_WINDOW,
					)
					.await
				{
					warn!(job_key = %spec.job_key, error = %alert_err, "failed to alert job failure");
				}
				error!(job_key = %spec.job_key, error = %e, "supervised job failed");
				JobOutcome::Failed
			}
		};

		// Cleanup runs for success and failure alike: stats, slow-run
		// check, finish marker, and removal of this run's start marker so
		// the health check does not see a finished run as still running.
		let duration_ms = clock.elapsed().as_millis() as u64;
		let stats = self.recorder.record(&spec.job_key, duration_ms).await?;

		let duration_secs = duration_ms as f64 / 1_000.0;
		if duration_secs > max_job_seconds as f64 {
			self
				.alerts
				.send(
					&format!("long_job_{}", spec.job_key),
					"Cron job finished but took too long",
					&format!(
						"Job: {}\nExecution time: {duration_secs:.3} seconds\nmax_job_seconds: {max_job_seconds}",
						spec.job_key
					),
					DEFAULT_DEDUP_WINDOW,
				)
				.await?;
		}

		let finished = Utc::now();
		self
			.store
			.hash_set(
				&status_key,
				&[(
					FIELD_FINISH_TIME.to_string(),
					epoch_seconds(finished.timestamp_millis()),
				)],
			)
			.await?;
		self.store.hash_delete_field(&status_key, &start_field).await?;

		debug!(
			job_key = %spec.job_key,
			duration_secs,
			num = stats.num,
			avg = stats.avg,
			"job bookkeeping written"
		);

		Ok(outcome)
	}

	/// Advisory check that the job is not being triggered more often than
	/// its policy allows. Never aborts the run.
	async fn check_cadence(&self, spec: &JobSpec, status_key: &str, now_ms: i64) -> Result<()> {
		let record = self.store.hash_get_all(status_key).await?;
		match record.get(FIELD_FINISH_TIME) {
			None => {
				// Expected on the first ever run of a job.
				self
					.alerts
					.send(
						&format!("cron_start_warning_{}", spec.job_key),
						"Job start time warning",
						&format!(
							"No finish time recorded for {status_key} yet. (Okay when called for the first time)"
						),
						DEFAULT_DEDUP_WINDOW,
					)
					.await?;
			}
			Some(raw) => {
				let finish: f64 = raw.parse().map_err(|_| CoreError::MalformedField {
					field: FIELD_FINISH_TIME,
					value: raw.clone(),
				})?;
				let gap_minutes = (now_ms as f64 / 1_000.0 - finish) / 60.0;
				if gap_minutes < spec.policy.min_no_job_minutes as f64 {
					self
						.alerts
						.send(
							&format!("cron_start_warning_{}", spec.job_key),
							"Job start time warning",
							&format!(
								"Job is being called too often.\nJob: {}\nStart time difference: {gap_minutes:.1} minutes\nminimum gap: {} minutes",
								spec.job_key, spec.policy.min_no_job_minutes
							),
							DEFAULT_DEDUP_WINDOW,
						)
						.await?;
				}
			}
		}
		Ok(())
	}
}

/// Epoch timestamp in seconds with millisecond precision, as stored.
fn epoch_seconds(epoch_ms: i64) -> String {
	format!("{:.3}", epoch_ms as f64 / 1_000.0)
}

#[cfg(test)]
mod tests {
	use super::*;
	use beacon_alerts::RecordingAlertSink;
	use beacon_crons_core::JobPolicy;
	use beacon_store::MemoryStore;
	use rust_decimal::Decimal;
	use tokio::sync::Notify;

	struct Harness {
		supervisor: Supervisor,
		store: Arc<MemoryStore>,
		alerts: Arc<RecordingAlertSink>,
		_lock_dir: tempfile::TempDir,
	}

	fn harness() -> Harness {
		let store = Arc::new(MemoryStore::new());
		let alerts = Arc::new(RecordingAlertSink::new());
		let lock_dir = tempfile::tempdir().unwrap();
		let config = CronsConfig {
			lock_dir: lock_dir.path().to_path_buf(),
			..CronsConfig::default()
		};
		let supervisor = Supervisor::new(
			Arc::clone(&store) as Arc<dyn JobStateStore>,
			Arc::clone(&alerts) as Arc<dyn AlertSink>,
			config,
		);
		Harness {
			supervisor,
			store,
			alerts,
			_lock_dir: lock_dir,
		}
	}

	fn spec(job_key: &str, policy: JobPolicy) -> JobSpec {
		JobSpec::new(job_key).unwrap().with_policy(policy)
	}

	async fn status_record(
		store: &MemoryStore,
		job_key: &str,
	) -> std::collections::HashMap<String, String> {
		store
			.hash_get_all(&job_status_key("cron_job", job_key))
			.await
			.unwrap()
	}

	#[tokio::test]
	async fn completed_run_returns_the_job_result() {
		let h = harness();
		let outcome = h
			.supervisor
			.run(&spec("ok_job", JobPolicy::default()), || async {
				Ok::<_, String>(42)
			})
			.await
			.unwrap();
		assert_eq!(outcome.into_value(), Some(42));
	}

	#[tokio::test]
	async fn run_writes_finish_marker_and_thresholds() {
		let h = harness();
		let policy = JobPolicy {
			max_no_job_minutes: 25 * 60,
			min_no_job_minutes: 0,
			max_job_seconds: Some(120),
		};
		h.supervisor
			.run(&spec("marker_job", policy), || async { Ok::<_, String>(()) })
			.await
			.unwrap();

		let record = status_record(&h.store, "marker_job").await;
		assert!(record.contains_key(FIELD_FINISH_TIME));
		assert_eq!(
			record.get(FIELD_MAX_JOB_SECONDS).map(String::as_str),
			Some("120")
		);
		assert_eq!(
			record.get(FIELD_MAX_NO_JOB_TIME_SECONDS).map(String::as_str),
			Some((25 * 60 * 60).to_string().as_str())
		);
		// The start marker for the finished run must be gone.
		assert!(!record.keys().any(|field| field.starts_with("start_time_")));
	}

	#[tokio::test]
	async fn failed_run_is_contained() {
		let h = harness();
		let outcome = h
			.supervisor
			.run(&spec("failing_job", JobPolicy::default()), || async {
				Err::<(), _>("boom".to_string())
			})
			.await
			.unwrap();

		assert_eq!(outcome, JobOutcome::Failed);

		// Cleanup still ran: finish marker written, start marker removed.
		let record = status_record(&h.store, "failing_job").await;
		assert!(record.contains_key(FIELD_FINISH_TIME));
		assert!(!record.keys().any(|field| field.starts_with("start_time_")));

		// Stats recorded the run and the failure.
		let stats = h
			.supervisor
			.recorder
			.record("failing_job", 0)
			.await
			.unwrap();
		assert_eq!(stats.num, 2);
		assert_eq!(stats.failures, 1);

		// The failure was alerted with the error text.
		let sent = h.alerts.sent_with_prefix("job_error_failing_job").await;
		assert_eq!(sent.len(), 1);
		assert!(sent[0].message.contains("boom"));
		assert_eq!(sent[0].dedup_window, ERROR_DEDUP_WINDOW);
	}

	#[tokio::test]
	async fn contended_lock_skips_without_side_effects() {
		let h = harness();
		let policy = JobPolicy {
			min_no_job_minutes: 60,
			..JobPolicy::default()
		};
		let spec = spec("busy_job", policy);

		let _held = InstanceLock::acquire(&h.supervisor.config.lock_dir, "busy_job").unwrap();

		let outcome = h
			.supervisor
			.run(&spec, || async { Ok::<_, String>(()) })
			.await
			.unwrap();

		assert!(outcome.is_skipped());
		assert!(status_record(&h.store, "busy_job").await.is_empty());
		assert!(h.alerts.sent().await.is_empty());
	}

	#[tokio::test]
	async fn overlapping_runs_admit_exactly_one() {
		let h = Arc::new(harness());
		let spec_first = spec("overlap_job", JobPolicy::default());
		let spec_second = spec_first.clone();

		let entered = Arc::new(Notify::new());
		let release = Arc::new(Notify::new());

		let h1 = Arc::clone(&h);
		let entered_tx = Arc::clone(&entered);
		let release_rx = Arc::clone(&release);
		let first = tokio::spawn(async move {
			h1.supervisor
				.run(&spec_first, || async move {
					entered_tx.notify_one();
					release_rx.notified().await;
					Ok::<_, String>(1)
				})
				.await
				.unwrap()
		});

		entered.notified().await;

		let second = h
			.supervisor
			.run(&spec_second, || async { Ok::<_, String>(2) })
			.await
			.unwrap();
		assert!(second.is_skipped());

		release.notify_one();
		assert_eq!(first.await.unwrap().into_value(), Some(1));
	}

	#[tokio::test]
	async fn sequential_runs_never_falsely_contend() {
		let h = harness();
		let spec = spec("serial_job", JobPolicy::default());
		for _ in 0..3 {
			let outcome = h
				.supervisor
				.run(&spec, || async { Ok::<_, String>(()) })
				.await
				.unwrap();
			assert!(outcome.is_completed());
		}
	}

	#[tokio::test]
	async fn first_ever_run_warns_about_missing_finish_time() {
		let h = harness();
		let policy = JobPolicy {
			min_no_job_minutes: 30,
			..JobPolicy::default()
		};
		let outcome = h
			.supervisor
			.run(&spec("fresh_job", policy), || async { Ok::<_, String>(()) })
			.await
			.unwrap();

		// Informational only - the job still ran.
		assert!(outcome.is_completed());
		let sent = h.alerts.sent_with_prefix("cron_start_warning_fresh_job").await;
		assert_eq!(sent.len(), 1);
		assert!(sent[0].message.contains("No finish time"));
	}

	#[tokio::test]
	async fn run_inside_minimum_gap_alerts_but_proceeds() {
		let h = harness();
		let minutes = 30u64;
		let policy = JobPolicy {
			min_no_job_minutes: minutes,
			..JobPolicy::default()
		};

		// Previous finish (m - 1) minutes ago: one minute too soon.
		let finish = Utc::now().timestamp() as f64 - ((minutes - 1) * 60) as f64;
		h.store
			.hash_set(
				&job_status_key("cron_job", "eager_job"),
				&[(FIELD_FINISH_TIME.to_string(), format!("{finish:.3}"))],
			)
			.await
			.unwrap();

		let outcome = h
			.supervisor
			.run(&spec("eager_job", policy), || async { Ok::<_, String>(()) })
			.await
			.unwrap();

		assert!(outcome.is_completed());
		let sent = h.alerts.sent_with_prefix("cron_start_warning_eager_job").await;
		assert_eq!(sent.len(), 1);
		assert!(sent[0].message.contains("too often"));
	}

	#[tokio::test]
	async fn run_outside_minimum_gap_does_not_alert() {
		let h = harness();
		let minutes = 30u64;
		let policy = JobPolicy {
			min_no_job_minutes: minutes,
			..JobPolicy::default()
		};

		let finish = Utc::now().timestamp() as f64 - ((minutes + 1) * 60) as f64;
		h.store
			.hash_set(
				&job_status_key("cron_job", "patient_job"),
				&[(FIELD_FINISH_TIME.to_string(), format!("{finish:.3}"))],
			)
			.await
			.unwrap();

		h.supervisor
			.run(&spec("patient_job", policy), || async { Ok::<_, String>(()) })
			.await
			.unwrap();

		assert!(h.alerts.sent().await.is_empty());
	}

	#[tokio::test]
	async fn slow_run_alerts_exactly_once() {
		let h = harness();
		let policy = JobPolicy {
			max_job_seconds: Some(0),
			..JobPolicy::default()
		};
		h.supervisor
			.run(&spec("slow_job", policy), || async {
				tokio::time::sleep(Duration::from_millis(20)).await;
				Ok::<_, String>(())
			})
			.await
			.unwrap();

		let sent = h.alerts.sent_with_prefix("long_job_slow_job").await;
		assert_eq!(sent.len(), 1);
		assert!(sent[0].message.contains("max_job_seconds: 0"));
	}

	#[tokio::test]
	async fn fast_run_does_not_alert() {
		let h = harness();
		let policy = JobPolicy {
			max_job_seconds: Some(60),
			..JobPolicy::default()
		};
		h.supervisor
			.run(&spec("fast_job", policy), || async { Ok::<_, String>(()) })
			.await
			.unwrap();

		assert!(h.alerts.sent_with_prefix("long_job_").await.is_empty());
	}

	#[tokio::test]
	async fn stats_accumulate_across_runs() {
		let h = harness();
		let spec = spec("counted_job", JobPolicy::default());
		for _ in 0..2 {
			h.supervisor
				.run(&spec, || async { Ok::<_, String>(()) })
				.await
				.unwrap();
		}

		let stats = h.supervisor.recorder.record("counted_job", 0).await.unwrap();
		assert_eq!(stats.num, 3);
		assert!(stats.max >= Decimal::ZERO);
	}
}
