// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory referral repository for tests.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::model::{DailyIncome, RefTransaction, ReferralUser};
use crate::repository::ReferralRepository;

/// Process-local referral data with the same contract as the Postgres
/// repository.
#[derive(Default)]
pub struct MemoryReferralRepository {
	referrals: Vec<ReferralUser>,
	incomes: Vec<DailyIncome>,
	transactions: Mutex<Vec<RefTransaction>>,
}

impl MemoryReferralRepository {
	pub fn new(referrals: Vec<ReferralUser>, incomes: Vec<DailyIncome>) -> Self {
		Self {
			referrals,
			incomes,
			transactions: Mutex::new(Vec::new()),
		}
	}

	/// All transactions inserted so far.
	pub async fn transactions(&self) -> Vec<RefTransaction> {
		self.transactions.lock().await.clone()
	}
}

#[async_trait]
impl ReferralRepository for MemoryReferralRepository {
	async fn list_referral_users(&self) -> Result<Vec<ReferralUser>> {
		Ok(self.referrals.clone())
	}

	async fn transaction_dates(&self, acceptor_id: i64) -> Result<HashSet<NaiveDate>> {
		Ok(self
			.transactions
			.lock()
			.await
			.iter()
			.filter(|t| t.acceptor_id == acceptor_id)
			.map(|t| t.date)
			.collect())
	}

	async fn daily_incomes(
		&self,
		user_ids: &[i64],
		dates: &[NaiveDate],
	) -> Result<Vec<DailyIncome>> {
		Ok(self
			.incomes
			.iter()
			.filter(|income| user_ids.contains(&income.user_id) && dates.contains(&income.date))
			.cloned()
			.collect())
	}

	async fn insert_transactions(&self, transactions: &[RefTransaction]) -> Result<u64> {
		let mut stored = self.transactions.lock().await;
		stored.extend_from_slice(transactions);
		Ok(transactions.len() as u64)
	}
}
