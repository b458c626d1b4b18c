// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Single-instance mutual exclusion.
//!
//! One lock file per flavor, held with a non-blocking exclusive `flock`.
//! The kernel releases the lock when the owning process exits - including
//! on crash or kill - so a stale lock file can never block future runs.
//! Contention is a hard failure for the invocation, never a wait: the next
//! scheduled trigger retries.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur acquiring the instance lock.
#[derive(Debug, Error)]
pub enum LockError {
	#[error("another instance of {flavor_id} is already running")]
	AlreadyRunning { flavor_id: String },

	#[error("lock file error at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
}

/// Exclusive ownership of a flavor for the lifetime of this guard.
///
/// The lock is released when the guard is dropped or the process exits,
/// whichever comes first. The lock file itself is left in place; only the
/// kernel lock state matters.
#[derive(Debug)]
pub struct InstanceLock {
	_file: File,
	path: PathBuf,
}

impl InstanceLock {
	/// Acquire the lock for `flavor_id`, failing immediately if another
	/// live process holds it.
	pub fn acquire(lock_dir: &Path, flavor_id: &str) -> Result<Self, LockError> {
		let path = lock_dir.join(format!("beacon_{flavor_id}.lock"));
		let file = OpenOptions::new()
			.create(true)
			.read(true)
			.write(true)
			.truncate(false)
			.open(&path)
			.map_err(|source| LockError::Io {
				path: path.clone(),
				source,
			})?;

		#[cfg(unix)]
		{
			use std::os::unix::fs::PermissionsExt;
			let perms = std::fs::Permissions::from_mode(0o600);
			if let Err(e) = std::fs::set_permissions(&path, perms) {
				tracing::warn!(path = %path.display(), error = %e, "failed to set lock file permissions");
			}
		}

		match try_flock_exclusive(&file) {
			Ok(true) => Ok(Self { _file: file, path }),
			Ok(false) => Err(LockError::AlreadyRunning {
				flavor_id: flavor_id.to_string(),
			}),
			Err(source) => Err(LockError::Io { path, source }),
		}
	}

	/// Path of the underlying lock file.
	pub fn path(&self) -> &Path {
		&self.path
	}
}

/// Try to acquire an exclusive flock on a file (non-blocking).
///
/// Returns `Ok(true)` if the lock was acquired, `Ok(false)` if the file is
/// already locked by another holder.
fn try_flock_exclusive(file: &File) -> io::Result<bool> {
	#[cfg(unix)]
	{
		use std::os::unix::io::AsRawFd;
		let fd = file.as_raw_fd();
		// SAFETY: flock is a standard POSIX call and fd is a valid file
		// descriptor owned by `file`. LOCK_EX | LOCK_NB is a non-blocking
		// exclusive lock.
		let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
		if result == 0 {
			return Ok(true);
		}
		let err = io::Error::last_os_error();
		if err.kind() == io::ErrorKind::WouldBlock || err.raw_os_error() == Some(libc::EWOULDBLOCK) {
			return Ok(false);
		}
		Err(err)
	}
	#[cfg(not(unix))]
	{
		let _ = file;
		Ok(true)
	}
}
