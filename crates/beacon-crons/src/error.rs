// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the supervision layer.

use thiserror::Error;

use crate::lock::LockError;

/// Result type for supervision operations.
pub type Result<T> = std::result::Result<T, SupervisorError>;

/// Errors that abort a supervised invocation.
///
/// A failing job body is not represented here - it is contained and
/// surfaces as [`beacon_crons_core::JobOutcome::Failed`].
#[derive(Debug, Error)]
pub enum SupervisorError {
	#[error("shared store unavailable: {0}")]
	Store(#[from] beacon_store::StoreError),

	#[error("alert delivery failed: {0}")]
	Alert(#[from] beacon_alerts::AlertError),

	#[error(transparent)]
	Core(#[from] beacon_crons_core::CoreError),

	#[error(transparent)]
	Lock(#[from] LockError),

	#[error("invalid configuration: {0}")]
	Config(String),
}
