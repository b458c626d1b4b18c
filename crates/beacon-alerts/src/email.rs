// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Email delivery of alerts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use beacon_smtp::SmtpClient;
use beacon_store::DedupCache;

use crate::sink::AlertSink;
use crate::Result;

/// Store-key namespace for alert suppression claims.
const DEDUP_KEY_PREFIX: &str = "alert_dedup_";

/// Sends alerts by email to a fixed recipient list.
///
/// Suppression is claimed in the shared store before the first SMTP call,
/// so concurrent processes reporting the same anomaly produce one email.
pub struct EmailAlertSink {
	smtp: SmtpClient,
	recipients: Vec<String>,
	dedup: Arc<dyn DedupCache>,
}

impl EmailAlertSink {
	pub fn new(smtp: SmtpClient, recipients: Vec<String>, dedup: Arc<dyn DedupCache>) -> Self {
		Self {
			smtp,
			recipients,
			dedup,
		}
	}
}

#[async_trait]
impl AlertSink for EmailAlertSink {
	async fn send(
		&self,
		alert_key: &str,
		subject: &str,
		message: &str,
		dedup_window: Duration,
	) -> Result<bool> {
		let claim_key = format!("{DEDUP_KEY_PREFIX}{alert_key}");
		if !self.dedup.try_acquire(&claim_key, dedup_window).await? {
			debug!(alert_key, "alert suppressed within dedup window");
			return Ok(false);
		}

		let body_html = message.replace('\n', "<br>");
		for recipient in &self.recipients {
			if let Err(e) = self
				.smtp
				.send_email(recipient, subject, &body_html, message)
				.await
			{
				// One bad recipient must not starve the rest of the list.
				warn!(alert_key, recipient = %recipient, error = %e, "alert email failed");
			}
		}

		info!(alert_key, subject, "alert delivered");
		Ok(true)
	}
}
