// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository layer for referral database operations.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use crate::error::Result;
use crate::model::{DailyIncome, RefTransaction, ReferralUser};

/// Data access needed by the referral batch.
///
/// The production implementation is [`PgReferralRepository`];
/// [`crate::MemoryReferralRepository`] backs the tests.
#[async_trait]
pub trait ReferralRepository: Send + Sync {
	/// All users that were referred by someone, with their referrer.
	async fn list_referral_users(&self) -> Result<Vec<ReferralUser>>;

	/// Dates that already carry a transaction for the given acceptor.
	async fn transaction_dates(&self, acceptor_id: i64) -> Result<HashSet<NaiveDate>>;

	/// Summed per-user daily income for the given users on the given dates.
	/// Days without income produce no row.
	async fn daily_incomes(
		&self,
		user_ids: &[i64],
		dates: &[NaiveDate],
	) -> Result<Vec<DailyIncome>>;

	/// Bulk-insert transactions. Returns the number of rows written.
	async fn insert_transactions(&self, transactions: &[RefTransaction]) -> Result<u64>;
}

/// Postgres implementation of the referral repository.
#[derive(Clone)]
pub struct PgReferralRepository {
	pool: PgPool,
}

impl PgReferralRepository {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}

#[derive(sqlx::FromRow)]
struct ReferralUserRow {
	user_id: i64,
	parent_id: i64,
	date_joined: NaiveDate,
}

#[derive(sqlx::FromRow)]
struct DailyIncomeRow {
	user_id: i64,
	date: NaiveDate,
	income: Decimal,
}

#[async_trait]
impl ReferralRepository for PgReferralRepository {
	#[instrument(skip(self))]
	async fn list_referral_users(&self) -> Result<Vec<ReferralUser>> {
		let rows = sqlx::query_as::<_, ReferralUserRow>(
			r#"
			SELECT u.id AS user_id, p.parent_id, u.date_joined::date AS date_joined
			FROM users u
			INNER JOIN user_profiles p ON p.user_id = u.id
			WHERE p.parent_id IS NOT NULL
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows
			.into_iter()
			.map(|row| ReferralUser {
				user_id: row.user_id,
				parent_id: row.parent_id,
				date_joined: row.date_joined,
			})
			.collect())
	}

	#[instrument(skip(self), fields(acceptor_id = acceptor_id))]
	async fn transaction_dates(&self, acceptor_id: i64) -> Result<HashSet<NaiveDate>> {
		let dates: Vec<NaiveDate> = sqlx::query_scalar(
			r#"
			SELECT date FROM ref_transactions WHERE acceptor_id = $1
			"#,
		)
		.bind(acceptor_id)
		.fetch_all(&self.pool)
		.await?;

		Ok(dates.into_iter().collect())
	}

	#[instrument(skip(self, user_ids, dates), fields(users = user_ids.len(), days = dates.len()))]
	async fn daily_incomes(
		&self,
		user_ids: &[i64],
		dates: &[NaiveDate],
	) -> Result<Vec<DailyIncome>> {
		// Income is recorded per ad block; blocks belong to sites, sites to
		// users. Summing here keeps one row per user and day.
		let rows = sqlx::query_as::<_, DailyIncomeRow>(
			r#"
			SELECT si.user_id, st.date, SUM(st.user_income) AS income
			FROM rtb_stats st
			INNER JOIN blocks b ON b.id = st.block_id
			INNER JOIN sites si ON si.id = b.site_id
			WHERE si.user_id = ANY($1) AND st.date = ANY($2)
			GROUP BY si.user_id, st.date
			"#,
		)
		.bind(user_ids)
		.bind(dates)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows
			.into_iter()
			.map(|row| DailyIncome {
				user_id: row.user_id,
				date: row.date,
				income: row.income,
			})
			.collect())
	}

	#[instrument(skip(self, transactions), fields(count = transactions.len()))]
	async fn insert_transactions(&self, transactions: &[RefTransaction]) -> Result<u64> {
		if transactions.is_empty() {
			return Ok(0);
		}

		let acceptors: Vec<i64> = transactions.iter().map(|t| t.acceptor_id).collect();
		let remitters: Vec<i64> = transactions.iter().map(|t| t.remitter_id).collect();
		let amounts: Vec<Decimal> = transactions.iter().map(|t| t.amount).collect();
		let dates: Vec<NaiveDate> = transactions.iter().map(|t| t.date).collect();

		let result = sqlx::query(
			r#"
			INSERT INTO ref_transactions (acceptor_id, remitter_id, amount, date)
			SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::numeric[], $4::date[])
			"#,
		)
		.bind(&acceptors)
		.bind(&remitters)
		.bind(&amounts)
		.bind(&dates)
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected())
	}
}
