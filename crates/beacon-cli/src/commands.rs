// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Subcommand implementations.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use beacon_alerts::{AlertSink, EmailAlertSink, TracingAlertSink};
use beacon_crons::{JobOutcome, JobPolicy, JobSpec, Supervisor};
use beacon_referrals::{PgReferralRepository, RefTransactionsJob, ReferralRepository};
use beacon_smtp::SmtpClient;
use beacon_store::{DedupCache, JobStateStore, RedisStore};

use crate::config::BeaconConfig;

/// Run the referral-income batch under full supervision.
///
/// The job is registered with the cadence expected of a daily trigger:
/// a warning when more than 25 hours pass without a run (read by the
/// external health check) and when runs start less than 23 hours apart.
pub async fn run_ref_transactions(
	config: &BeaconConfig,
	verbosity: u8,
) -> Result<(), Box<dyn std::error::Error>> {
	let store = Arc::new(RedisStore::connect(&config.redis_url).await?);

	let alerts: Arc<dyn AlertSink> = match &config.smtp {
		Some(smtp_config) => {
			let smtp = SmtpClient::new(smtp_config.clone())?;
			Arc::new(EmailAlertSink::new(
				smtp,
				config.alert_recipients.clone(),
				Arc::clone(&store) as Arc<dyn DedupCache>,
			))
		}
		None => {
			warn!("no SMTP relay configured, alerts go to the log");
			Arc::new(TracingAlertSink::new())
		}
	};

	let supervisor = Supervisor::new(
		Arc::clone(&store) as Arc<dyn JobStateStore>,
		alerts,
		config.crons.clone(),
	);

	let pool = PgPoolOptions::new()
		.max_connections(5)
		.connect(&config.database_url)
		.await?;
	let repository = Arc::new(PgReferralRepository::new(pool)) as Arc<dyn ReferralRepository>;
	let job = RefTransactionsJob::new(repository).with_verbosity(verbosity);

	let spec = JobSpec::new("ref_transactions")?.with_policy(JobPolicy {
		max_no_job_minutes: 25 * 60,
		min_no_job_minutes: 23 * 60,
		max_job_seconds: None,
	});

	let outcome = supervisor
		.run(&spec, || async {
			job.run(RefTransactionsJob::default_date_to()).await
		})
		.await?;

	match outcome {
		JobOutcome::Completed(written) => {
			info!(written, "ref transactions batch finished");
		}
		JobOutcome::Failed => {
			// Already counted, alerted and logged by the supervisor; the
			// exit code stays 0 so the scheduler simply retries next time.
			warn!("ref transactions batch failed");
		}
		JobOutcome::Skipped => {
			info!("another ref transactions instance is still running");
		}
	}

	Ok(())
}
