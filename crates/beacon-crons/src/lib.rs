// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cron job supervision for Beacon.
//!
//! Scheduled batch jobs run as one OS process per trigger, with nothing in
//! the scheduler preventing overlap, silent death, or runaway duration. This
//! crate wraps a job body in two layers, composed in a fixed order:
//!
//! 1. **Single-instance layer** (outermost): an OS-level file lock keyed by
//!    the job's flavor. Contention skips the invocation entirely - no store
//!    writes, no alerts.
//! 2. **Stats and alerting layer**: validates call cadence, writes start and
//!    finish markers for the external health-check process, records running
//!    duration statistics, contains job failures, and reports anomalies
//!    through the alert channel.
//!
//! The order matters: lock failure must skip every stats and alert side
//! effect, and the stats layer assumes it is the only writer for its job
//! key.

pub mod config;
pub mod error;
pub mod lock;
pub mod recorder;
pub mod supervisor;

pub use beacon_crons_core::{JobOutcome, JobPolicy, JobSpec};
pub use config::CronsConfig;
pub use error::{Result, SupervisorError};
pub use lock::{InstanceLock, LockError};
pub use recorder::JobStatsRecorder;
pub use supervisor::Supervisor;
