// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Referral-income transaction batch for Beacon.
//!
//! Each user who referred others earns a fixed percentage of their
//! referrals' daily income. The batch walks every calendar day from a
//! parent's earliest referral join date through yesterday and creates one
//! transaction per referral for each day that has no recorded transaction
//! yet. Existence of a row - not its value - marks a day as computed, so
//! zero-income days are recorded too and never revisited.
//!
//! The batch is a client of the supervision layer in `beacon-crons`; it has
//! no locking or alerting of its own.

pub mod batch;
pub mod error;
pub mod memory;
pub mod model;
pub mod repository;

pub use batch::RefTransactionsJob;
pub use error::{ReferralError, Result};
pub use memory::MemoryReferralRepository;
pub use model::{DailyIncome, RefTransaction, ReferralUser, REF_PERCENT};
pub use repository::{PgReferralRepository, ReferralRepository};
