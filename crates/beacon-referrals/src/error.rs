// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the referral batch.

use thiserror::Error;

/// Result type for referral operations.
pub type Result<T> = std::result::Result<T, ReferralError>;

/// Errors that can occur computing referral transactions.
#[derive(Debug, Error)]
pub enum ReferralError {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("internal error: {0}")]
	Internal(String),
}
