// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SMTP configuration.

use serde::{Deserialize, Serialize};
use std::env;

use crate::secret::SecretString;
use crate::SmtpError;

/// Settings for connecting to an SMTP relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
	/// Relay hostname, e.g. "smtp.example.com".
	pub host: String,

	/// Relay port. 587 (STARTTLS) unless overridden.
	pub port: u16,

	/// Optional authentication username.
	pub username: Option<String>,

	/// Optional authentication password, redacted in logs.
	pub password: Option<SecretString>,

	/// Sender address, e.g. "alerts@example.com".
	pub from_address: String,

	/// Sender display name.
	pub from_name: String,

	/// Whether to negotiate STARTTLS.
	#[serde(default = "default_use_tls")]
	pub use_tls: bool,
}

fn default_use_tls() -> bool {
	true
}

impl SmtpConfig {
	/// Load configuration from `BEACON_SMTP_*` environment variables.
	///
	/// `BEACON_SMTP_HOST` and `BEACON_SMTP_FROM_ADDRESS` are required;
	/// port defaults to 587, the display name to "Beacon", and TLS to on.
	///
	/// # Errors
	///
	/// Returns [`SmtpError::Config`] when a required variable is missing or
	/// the port is not a number.
	pub fn from_env() -> Result<Self, SmtpError> {
		let host = env::var("BEACON_SMTP_HOST")
			.map_err(|_| SmtpError::Config("BEACON_SMTP_HOST is required".into()))?;

		let port = env::var("BEACON_SMTP_PORT")
			.unwrap_or_else(|_| "587".into())
			.parse()
			.map_err(|_| SmtpError::Config("BEACON_SMTP_PORT must be a valid port number".into()))?;

		let username = env::var("BEACON_SMTP_USERNAME").ok();
		let password = env::var("BEACON_SMTP_PASSWORD").ok().map(SecretString::new);

		let from_address = env::var("BEACON_SMTP_FROM_ADDRESS")
			.map_err(|_| SmtpError::Config("BEACON_SMTP_FROM_ADDRESS is required".into()))?;

		let from_name = env::var("BEACON_SMTP_FROM_NAME").unwrap_or_else(|_| "Beacon".into());

		let use_tls = env::var("BEACON_SMTP_USE_TLS")
			.map(|v| v.to_lowercase() != "false" && v != "0")
			.unwrap_or(true);

		Ok(Self {
			host,
			port,
			username,
			password,
			from_address,
			from_name,
			use_tls,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_tls_is_on() {
		assert!(default_use_tls());
	}

	#[test]
	fn debug_never_leaks_password() {
		let config = SmtpConfig {
			host: "smtp.example.com".to_string(),
			port: 587,
			username: Some("user".to_string()),
			password: Some(SecretString::new("super-secret".to_string())),
			from_address: "alerts@example.com".to_string(),
			from_name: "Beacon".to_string(),
			use_tls: true,
		};

		let debug = format!("{config:?}");
		assert!(!debug.contains("super-secret"));
		assert!(debug.contains("[REDACTED]"));
	}
}
