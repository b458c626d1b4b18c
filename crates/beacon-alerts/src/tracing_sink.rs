// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Log-only alert sink.

use std::time::Duration;

use async_trait::async_trait;
use tracing::error;

use crate::sink::AlertSink;
use crate::Result;

/// Writes alerts to the tracing error stream.
///
/// Used when no SMTP relay is configured (local runs, CI). Diagnostic only:
/// every alert is logged, without suppression.
#[derive(Default)]
pub struct TracingAlertSink;

impl TracingAlertSink {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl AlertSink for TracingAlertSink {
	async fn send(
		&self,
		alert_key: &str,
		subject: &str,
		message: &str,
		_dedup_window: Duration,
	) -> Result<bool> {
		error!(alert_key, subject, message, "job alert");
		Ok(true)
	}
}
