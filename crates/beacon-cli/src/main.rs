// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Beacon batch job binary.
//!
//! An external scheduler triggers subcommands of this binary; the
//! supervision layer in `beacon-crons` takes care of mutual exclusion,
//! statistics, and alerting around each job. Anomalies never surface
//! through the exit code - a contained job failure still exits 0, and the
//! next trigger retries.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

/// Beacon - referral program batch jobs.
#[derive(Parser, Debug)]
#[command(name = "beacon", about = "Beacon referral batch jobs", version)]
struct Args {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Create referral-income transactions for all uncomputed days
	RefTransactions {
		/// 1 narrates per-parent progress to stdout, 0 is silent
		#[arg(long, default_value_t = 1)]
		verbosity: u8,
	},
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Command::Version = args.command {
		println!("beacon {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "info".into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	let config = config::BeaconConfig::from_env()?;

	match args.command {
		Command::RefTransactions { verbosity } => {
			commands::run_ref_transactions(&config, verbosity).await?;
		}
		Command::Version => unreachable!("handled above"),
	}

	Ok(())
}
