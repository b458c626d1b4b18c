// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redis implementation of the store traits.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::{Result, StoreError};
use crate::state::{DedupCache, JobStateStore};

/// Redis-backed store over a multiplexed connection manager.
///
/// The connection manager reconnects transparently; individual command
/// failures surface as [`StoreError::Backend`].
#[derive(Clone)]
pub struct RedisStore {
	conn: ::redis::aio::ConnectionManager,
}

impl RedisStore {
	/// Connect to the Redis instance at `url` (e.g. `redis://127.0.0.1/0`).
	#[instrument(skip(url))]
	pub async fn connect(url: &str) -> Result<Self> {
		let client = ::redis::Client::open(url)
			.map_err(|e| StoreError::Connection(e.to_string()))?;
		let conn = client
			.get_connection_manager()
			.await
			.map_err(|e| StoreError::Connection(e.to_string()))?;
		debug!("connected to redis store");
		Ok(Self { conn })
	}
}

#[async_trait]
impl JobStateStore for RedisStore {
	async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
		let mut conn = self.conn.clone();
		let fields: HashMap<String, String> = ::redis::cmd("HGETALL")
			.arg(key)
			.query_async(&mut conn)
			.await?;
		Ok(fields)
	}

	async fn hash_set(&self, key: &str, fields: &[(String, String)]) -> Result<()> {
		if fields.is_empty() {
			return Ok(());
		}
		let mut conn = self.conn.clone();
		let mut cmd = ::redis::cmd("HSET");
		cmd.arg(key);
		for (field, value) in fields {
			cmd.arg(field).arg(value);
		}
		cmd.query_async::<()>(&mut conn).await?;
		Ok(())
	}

	async fn hash_increment(&self, key: &str, field: &str, by: i64) -> Result<i64> {
		let mut conn = self.conn.clone();
		let value: i64 = ::redis::cmd("HINCRBY")
			.arg(key)
			.arg(field)
			.arg(by)
			.query_async(&mut conn)
			.await?;
		Ok(value)
	}

	async fn hash_delete_field(&self, key: &str, field: &str) -> Result<()> {
		let mut conn = self.conn.clone();
		::redis::cmd("HDEL")
			.arg(key)
			.arg(field)
			.query_async::<()>(&mut conn)
			.await?;
		Ok(())
	}
}

#[async_trait]
impl DedupCache for RedisStore {
	async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<bool> {
		let mut conn = self.conn.clone();
		// SET NX EX: the first claimant within the window wins.
		let claimed: Option<String> = ::redis::cmd("SET")
			.arg(key)
			.arg(1)
			.arg("NX")
			.arg("EX")
			.arg(ttl.as_secs().max(1))
			.query_async(&mut conn)
			.await?;
		Ok(claimed.is_some())
	}
}
