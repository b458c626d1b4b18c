// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for cron supervision.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in core supervision types.
#[derive(Debug, Error)]
pub enum CoreError {
	#[error("invalid job key: {0}")]
	InvalidJobKey(String),

	#[error("malformed stored field {field}: {value:?}")]
	MalformedField { field: &'static str, value: String },
}
