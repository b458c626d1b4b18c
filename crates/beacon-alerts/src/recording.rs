// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Recording alert sink for tests.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::sink::AlertSink;
use crate::Result;

/// One alert captured by [`RecordingAlertSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentAlert {
	pub alert_key: String,
	pub subject: String,
	pub message: String,
	pub dedup_window: Duration,
}

/// Captures alerts instead of delivering them. No suppression: tests assert
/// on the exact sequence of reports.
#[derive(Default)]
pub struct RecordingAlertSink {
	sent: Mutex<Vec<SentAlert>>,
}

impl RecordingAlertSink {
	pub fn new() -> Self {
		Self::default()
	}

	/// All alerts reported so far, in order.
	pub async fn sent(&self) -> Vec<SentAlert> {
		self.sent.lock().await.clone()
	}

	/// Alerts whose key starts with `prefix`.
	pub async fn sent_with_prefix(&self, prefix: &str) -> Vec<SentAlert> {
		self
			.sent
			.lock()
			.await
			.iter()
			.filter(|alert| alert.alert_key.starts_with(prefix))
			.cloned()
			.collect()
	}
}

#[async_trait]
impl AlertSink for RecordingAlertSink {
	async fn send(
		&self,
		alert_key: &str,
		subject: &str,
		message: &str,
		dedup_window: Duration,
	) -> Result<bool> {
		self.sent.lock().await.push(SentAlert {
			alert_key: alert_key.to_string(),
			subject: subject.to_string(),
			message: message.to_string(),
			dedup_window,
		});
		Ok(true)
	}
}
