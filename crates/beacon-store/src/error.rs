// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for store operations.

use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur talking to the shared store.
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("store connection failed: {0}")]
	Connection(String),

	#[error("store command failed: {0}")]
	Backend(#[from] ::redis::RedisError),

	#[error("stored value for {key}.{field} is not numeric: {value:?}")]
	NonNumericField {
		key: String,
		field: String,
		value: String,
	},
}
