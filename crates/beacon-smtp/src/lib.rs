// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Async SMTP client for Beacon alert delivery.
//!
//! Thin wrapper over [`lettre`]: STARTTLS, optional authentication, and
//! multipart (plain text + HTML) messages. Credentials are held in a
//! [`SecretString`] so they never appear in logs.

pub mod client;
pub mod config;
pub mod secret;

pub use client::{is_valid_email, SmtpClient};
pub use config::SmtpConfig;
pub use secret::SecretString;

use thiserror::Error;

/// Errors that can occur during SMTP operations.
#[derive(Debug, Error)]
pub enum SmtpError {
	#[error("connection failed: {0}")]
	Connection(String),

	#[error("send failed: {0}")]
	Send(String),

	#[error("invalid configuration: {0}")]
	Config(String),

	#[error("invalid email address: {0}")]
	Address(String),
}
