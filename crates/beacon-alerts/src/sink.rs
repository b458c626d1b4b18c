// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The alert channel contract.

use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// Default suppression window for repeated alerts.
pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_secs(600);

/// A de-duplicating notification channel.
#[async_trait]
pub trait AlertSink: Send + Sync {
	/// Report an anomaly.
	///
	/// An identical `alert_key` within `dedup_window` of a delivered alert
	/// is suppressed. Returns `true` when the alert was delivered and
	/// `false` when it was suppressed.
	async fn send(
		&self,
		alert_key: &str,
		subject: &str,
		message: &str,
		dedup_window: Duration,
	) -> Result<bool>;
}
