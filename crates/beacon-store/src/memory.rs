// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory store fake with the same semantics as the Redis backend.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{Result, StoreError};
use crate::state::{DedupCache, JobStateStore};

/// Process-local store for tests and single-process deployments.
#[derive(Default)]
pub struct MemoryStore {
	hashes: Mutex<HashMap<String, HashMap<String, String>>>,
	claims: Mutex<HashMap<String, Instant>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Whether the hash at `key` currently has the given field. Test helper.
	pub async fn has_field(&self, key: &str, field: &str) -> bool {
		self
			.hashes
			.lock()
			.await
			.get(key)
			.is_some_and(|record| record.contains_key(field))
	}
}

#[async_trait]
impl JobStateStore for MemoryStore {
	async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
		Ok(self.hashes.lock().await.get(key).cloned().unwrap_or_default())
	}

	async fn hash_set(&self, key: &str, fields: &[(String, String)]) -> Result<()> {
		let mut hashes = self.hashes.lock().await;
		let record = hashes.entry(key.to_string()).or_default();
		for (field, value) in fields {
			record.insert(field.clone(), value.clone());
		}
		Ok(())
	}

	async fn hash_increment(&self, key: &str, field: &str, by: i64) -> Result<i64> {
		let mut hashes = self.hashes.lock().await;
		let record = hashes.entry(key.to_string()).or_default();
		let current = match record.get(field) {
			None => 0,
			Some(value) => value
				.parse::<i64>()
				.map_err(|_| StoreError::NonNumericField {
					key: key.to_string(),
					field: field.to_string(),
					value: value.clone(),
				})?,
		};
		let next = current + by;
		record.insert(field.to_string(), next.to_string());
		Ok(next)
	}

	async fn hash_delete_field(&self, key: &str, field: &str) -> Result<()> {
		let mut hashes = self.hashes.lock().await;
		if let Some(record) = hashes.get_mut(key) {
			record.remove(field);
			if record.is_empty() {
				hashes.remove(key);
			}
		}
		Ok(())
	}
}

#[async_trait]
impl DedupCache for MemoryStore {
	async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<bool> {
		let mut claims = self.claims.lock().await;
		let now = Instant::now();
		if claims.get(key).is_some_and(|expiry| *expiry > now) {
			return Ok(false);
		}
		claims.insert(key.to_string(), now + ttl);
		Ok(true)
	}
}
