// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Store traits consumed by the supervision layer.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Hash-record access for job-status and job-stats records.
///
/// One key maps to one hash of string fields. Individual operations are
/// atomic on the backend; sequences of operations are not, and callers are
/// expected to hold the per-job instance lock across read-modify-write.
#[async_trait]
pub trait JobStateStore: Send + Sync {
	/// All fields of the hash at `key`. A missing key is an empty map.
	async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>>;

	/// Write the given fields of the hash at `key` in one operation,
	/// creating the record if absent and leaving other fields untouched.
	async fn hash_set(&self, key: &str, fields: &[(String, String)]) -> Result<()>;

	/// Atomically add `by` to an integer field, treating an absent field as
	/// zero. Returns the new value.
	async fn hash_increment(&self, key: &str, field: &str, by: i64) -> Result<i64>;

	/// Delete one field of the hash at `key`. Deleting an absent field is
	/// not an error.
	async fn hash_delete_field(&self, key: &str, field: &str) -> Result<()>;
}

/// Cross-process suppression window for repeated alerts.
#[async_trait]
pub trait DedupCache: Send + Sync {
	/// Claim `key` for `ttl`. Returns `true` when this caller won the
	/// window and `false` when another claim is still live.
	async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<bool>;
}
