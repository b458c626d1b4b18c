// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment-based configuration for the beacon binary.

use std::env;

use beacon_crons::CronsConfig;
use beacon_smtp::SmtpConfig;

/// A missing or malformed `BEACON_*` environment variable.
#[derive(Debug, thiserror::Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(pub String);

/// Everything the binary needs to wire its jobs.
#[derive(Debug)]
pub struct BeaconConfig {
	/// Shared job-state store, e.g. `redis://127.0.0.1/0`.
	pub redis_url: String,

	/// Referral database, e.g. `postgres://beacon@localhost/beacon`.
	pub database_url: String,

	/// Alert recipients. Empty list plus no SMTP host means alerts go to
	/// the log.
	pub alert_recipients: Vec<String>,

	/// SMTP relay; `None` when `BEACON_SMTP_HOST` is unset.
	pub smtp: Option<SmtpConfig>,

	pub crons: CronsConfig,
}

impl BeaconConfig {
	/// Load configuration from `BEACON_*` environment variables.
	///
	/// `BEACON_REDIS_URL` and `BEACON_DATABASE_URL` are required.
	/// `BEACON_ALERT_RECIPIENTS` is a comma-separated address list.
	pub fn from_env() -> Result<Self, ConfigError> {
		let redis_url = env::var("BEACON_REDIS_URL")
			.map_err(|_| ConfigError("BEACON_REDIS_URL is required".into()))?;

		let database_url = env::var("BEACON_DATABASE_URL")
			.map_err(|_| ConfigError("BEACON_DATABASE_URL is required".into()))?;

		let alert_recipients = env::var("BEACON_ALERT_RECIPIENTS")
			.map(|raw| {
				raw
					.split(',')
					.map(str::trim)
					.filter(|address| !address.is_empty())
					.map(String::from)
					.collect()
			})
			.unwrap_or_default();

		let smtp = if env::var("BEACON_SMTP_HOST").is_ok() {
			Some(SmtpConfig::from_env().map_err(|e| ConfigError(e.to_string()))?)
		} else {
			None
		};

		let crons = CronsConfig::from_env().map_err(|e| ConfigError(e.to_string()))?;

		Ok(Self {
			redis_url,
			database_url,
			alert_recipients,
			smtp,
			crons,
		})
	}
}
