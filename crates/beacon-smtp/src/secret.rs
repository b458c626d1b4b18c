// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacted string wrapper for credentials.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shown in place of the wrapped value by `Debug` and `Display`.
pub const REDACTED: &str = "[REDACTED]";

/// A string whose value never appears in log output.
///
/// `Debug` and `Display` print [`REDACTED`]; the value is only reachable
/// through [`SecretString::into_inner`] at the point of use.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
	pub fn new(value: String) -> Self {
		Self(value)
	}

	/// Consume the wrapper and expose the value.
	pub fn into_inner(self) -> String {
		self.0
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn debug_is_redacted() {
		let secret = SecretString::new("hunter2".to_string());
		assert_eq!(format!("{secret:?}"), REDACTED);
	}

	#[test]
	fn display_is_redacted() {
		let secret = SecretString::new("hunter2".to_string());
		assert_eq!(secret.to_string(), REDACTED);
	}

	#[test]
	fn into_inner_exposes_value() {
		let secret = SecretString::new("hunter2".to_string());
		assert_eq!(secret.into_inner(), "hunter2");
	}
}
