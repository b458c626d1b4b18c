// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The referral-income batch computation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::error::Result;
use crate::model::{RefTransaction, ReferralUser, REF_PERCENT};
use crate::repository::ReferralRepository;

/// Creates referral-income transactions for all uncomputed days.
///
/// For every parent, every day from that parent's earliest referral join
/// date through `date_to` either already has transactions (skipped) or gets
/// one transaction per referral joined by that day. Zero-income days are
/// written as zero-amount rows so the day is never recomputed.
pub struct RefTransactionsJob {
	repository: Arc<dyn ReferralRepository>,
	percent: Decimal,
	verbose: bool,
}

impl RefTransactionsJob {
	pub fn new(repository: Arc<dyn ReferralRepository>) -> Self {
		Self {
			repository,
			percent: REF_PERCENT,
			verbose: false,
		}
	}

	/// Verbosity 1 narrates per-parent progress to stdout; 0 is silent.
	/// Diagnostic only, no behavioural effect.
	pub fn with_verbosity(mut self, verbosity: u8) -> Self {
		self.verbose = verbosity >= 1;
		self
	}

	/// The default upper bound: yesterday, the last complete day.
	pub fn default_date_to() -> NaiveDate {
		Utc::now().date_naive() - Days::new(1)
	}

	/// Compute and insert all missing transactions up to and including
	/// `date_to`. Returns the number of transactions created.
	#[instrument(skip(self), fields(date_to = %date_to))]
	pub async fn run(&self, date_to: NaiveDate) -> Result<u64> {
		let referral_users = self.repository.list_referral_users().await?;

		// Group by parent; BTreeMap keeps the processing order stable.
		let mut by_parent: BTreeMap<i64, Vec<ReferralUser>> = BTreeMap::new();
		for referral in referral_users {
			by_parent.entry(referral.parent_id).or_default().push(referral);
		}

		let mut new_transactions = Vec::new();
		for (parent_id, referrals) in &by_parent {
			let Some(date_from) = referrals.iter().map(|r| r.date_joined).min() else {
				continue;
			};
			if date_from > date_to {
				// Earliest referral joined today - no complete day yet.
				continue;
			}

			let existing = self.repository.transaction_dates(*parent_id).await?;
			let dates_to_get: Vec<NaiveDate> = date_from
				.iter_days()
				.take_while(|day| *day <= date_to)
				.filter(|day| !existing.contains(day))
				.collect();

			if self.verbose {
				println!("--------------------");
				println!("parent {parent_id}");
				println!("from {date_from} to {date_to}");
				println!("referrals count {}", referrals.len());
				println!("dates to compute {}", dates_to_get.len());
			}

			if dates_to_get.is_empty() {
				continue;
			}

			let referral_ids: Vec<i64> = referrals.iter().map(|r| r.user_id).collect();
			let incomes = self
				.repository
				.daily_incomes(&referral_ids, &dates_to_get)
				.await?;
			let income_by_user_day: HashMap<(i64, NaiveDate), Decimal> = incomes
				.into_iter()
				.map(|income| ((income.user_id, income.date), income.income))
				.collect();

			for day in &dates_to_get {
				for referral in referrals {
					if *day < referral.date_joined {
						continue;
					}
					let income = income_by_user_day
						.get(&(referral.user_id, *day))
						.copied()
						.unwrap_or(Decimal::ZERO);
					if self.verbose {
						println!("\treferral {}   -   income {income}", referral.user_id);
					}
					new_transactions.push(RefTransaction {
						acceptor_id: *parent_id,
						remitter_id: referral.user_id,
						amount: income * self.percent,
						date: *day,
					});
				}
			}
		}

		if new_transactions.is_empty() {
			info!("no uncomputed referral days");
			return Ok(0);
		}

		let written = self
			.repository
			.insert_transactions(&new_transactions)
			.await?;
		info!(written, "referral transactions created");
		Ok(written)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::MemoryReferralRepository;
	use crate::model::DailyIncome;

	fn date(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	fn referral(user_id: i64, parent_id: i64, joined: NaiveDate) -> ReferralUser {
		ReferralUser {
			user_id,
			parent_id,
			date_joined: joined,
		}
	}

	#[tokio::test]
	async fn creates_one_row_per_referral_per_day() {
		let repo = Arc::new(MemoryReferralRepository::new(
			vec![referral(2, 1, date(2026, 8, 1))],
			vec![DailyIncome {
				user_id: 2,
				date: date(2026, 8, 1),
				income: Decimal::new(10_000, 2), // 100.00
			}],
		));
		let job = RefTransactionsJob::new(Arc::clone(&repo) as Arc<dyn ReferralRepository>);

		let written = job.run(date(2026, 8, 3)).await.unwrap();
		assert_eq!(written, 3); // Aug 1, 2, 3

		let transactions = repo.transactions().await;
		let first = transactions
			.iter()
			.find(|t| t.date == date(2026, 8, 1))
			.unwrap();
		assert_eq!(first.acceptor_id, 1);
		assert_eq!(first.remitter_id, 2);
		assert_eq!(first.amount.to_string(), "5.0000"); // 100.00 * 0.05
	}

	#[tokio::test]
	async fn zero_income_days_get_zero_amount_rows() {
		let repo = Arc::new(MemoryReferralRepository::new(
			vec![referral(2, 1, date(2026, 8, 1))],
			vec![],
		));
		let job = RefTransactionsJob::new(Arc::clone(&repo) as Arc<dyn ReferralRepository>);

		let written = job.run(date(2026, 8, 2)).await.unwrap();
		assert_eq!(written, 2);
		assert!(repo
			.transactions()
			.await
			.iter()
			.all(|t| t.amount == Decimal::ZERO));
	}

	#[tokio::test]
	async fn second_run_creates_nothing() {
		let repo = Arc::new(MemoryReferralRepository::new(
			vec![referral(2, 1, date(2026, 8, 1))],
			vec![],
		));
		let job = RefTransactionsJob::new(Arc::clone(&repo) as Arc<dyn ReferralRepository>);

		let first = job.run(date(2026, 8, 5)).await.unwrap();
		assert!(first > 0);

		// Existence of the rows, not their value, marks days as computed.
		let second = job.run(date(2026, 8, 5)).await.unwrap();
		assert_eq!(second, 0);
	}

	#[tokio::test]
	async fn referrals_do_not_earn_before_joining() {
		let repo = Arc::new(MemoryReferralRepository::new(
			vec![
				referral(2, 1, date(2026, 8, 1)),
				referral(3, 1, date(2026, 8, 3)),
			],
			vec![],
		));
		let job = RefTransactionsJob::new(Arc::clone(&repo) as Arc<dyn ReferralRepository>);

		job.run(date(2026, 8, 3)).await.unwrap();

		let transactions = repo.transactions().await;
		// Referral 2: Aug 1-3. Referral 3: Aug 3 only.
		assert_eq!(transactions.iter().filter(|t| t.remitter_id == 2).count(), 3);
		assert_eq!(transactions.iter().filter(|t| t.remitter_id == 3).count(), 1);
	}

	#[tokio::test]
	async fn window_starts_at_each_parents_own_referrals() {
		let repo = Arc::new(MemoryReferralRepository::new(
			vec![
				referral(2, 1, date(2026, 8, 1)),
				referral(4, 3, date(2026, 8, 4)),
			],
			vec![],
		));
		let job = RefTransactionsJob::new(Arc::clone(&repo) as Arc<dyn ReferralRepository>);

		job.run(date(2026, 8, 5)).await.unwrap();

		let transactions = repo.transactions().await;
		// Parent 3's window opens with its own referral on Aug 4, not with
		// the globally earliest join date.
		assert!(transactions
			.iter()
			.filter(|t| t.acceptor_id == 3)
			.all(|t| t.date >= date(2026, 8, 4)));
		assert_eq!(transactions.iter().filter(|t| t.acceptor_id == 3).count(), 2);
	}

	#[tokio::test]
	async fn parent_whose_referrals_joined_after_the_window_is_skipped() {
		let repo = Arc::new(MemoryReferralRepository::new(
			vec![referral(2, 1, date(2026, 8, 10))],
			vec![],
		));
		let job = RefTransactionsJob::new(Arc::clone(&repo) as Arc<dyn ReferralRepository>);

		let written = job.run(date(2026, 8, 5)).await.unwrap();
		assert_eq!(written, 0);
	}

	#[tokio::test]
	async fn backfill_resumes_around_existing_days() {
		let repo = Arc::new(MemoryReferralRepository::new(
			vec![referral(2, 1, date(2026, 8, 1))],
			vec![],
		));
		let job = RefTransactionsJob::new(Arc::clone(&repo) as Arc<dyn ReferralRepository>);

		job.run(date(2026, 8, 2)).await.unwrap();
		let written = job.run(date(2026, 8, 4)).await.unwrap();

		// Only the two new days are filled in.
		assert_eq!(written, 2);
		let mut dates: Vec<NaiveDate> = repo.transactions().await.iter().map(|t| t.date).collect();
		dates.sort();
		assert_eq!(
			dates,
			vec![
				date(2026, 8, 1),
				date(2026, 8, 2),
				date(2026, 8, 3),
				date(2026, 8, 4),
			]
		);
	}
}
