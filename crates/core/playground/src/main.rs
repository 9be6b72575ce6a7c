// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

mod error;

use clap::{Parser, ValueEnum};
use error::Result;
use lib_reduce::{DispatchError, EngineConfig, InputVector, LaunchParams, Partition, Reducer};
use lib_store::cfg::{Fill, LaunchFile};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FillArg {
	Sequence,
	Zeros,
	Ones,
	Random,
}

impl From<FillArg> for Fill {
	fn from(arg: FillArg) -> Self {
		match arg {
			FillArg::Sequence => Fill::Sequence,
			FillArg::Zeros => Fill::Zeros,
			FillArg::Ones => Fill::Ones,
			FillArg::Random => Fill::Random,
		}
	}
}

/// Per-group partial sums of a vector, one line per work-group.
#[derive(Parser, Debug)]
#[command(name = "playground")]
#[command(version)]
struct Args {
	/// JSON launch file; the 1024-element reference launch when omitted
	#[arg(short, long)]
	config: Option<PathBuf>,

	#[arg(short = 'n', long)]
	elements: Option<usize>,

	/// Work-items per group, a power of two
	#[arg(short, long)]
	local_size: Option<usize>,

	#[arg(long)]
	compute_units: Option<usize>,

	#[arg(long)]
	timeout_ms: Option<u64>,

	#[arg(long, value_enum)]
	fill: Option<FillArg>,

	/// Seed for `--fill random`
	#[arg(long, default_value_t = 0)]
	seed: u64,

	/// Used when RUST_LOG is unset
	#[arg(long, default_value = "info")]
	log_level: String,
}

fn apply_overrides(
	args: &Args,
	launch: &mut LaunchFile,
) {
	if let Some(elements) = args.elements {
		launch.launch.total_elements = elements;
	}
	if let Some(local) = args.local_size {
		launch.launch.local_item_size = local;
	}
	if let Some(units) = args.compute_units {
		launch.device.compute_units = Some(units);
	}
	if let Some(timeout_ms) = args.timeout_ms {
		launch.device.timeout_ms = timeout_ms;
	}
	if let Some(fill) = args.fill {
		launch.fill = fill.into();
	}
}

fn engine_config(launch: &LaunchFile) -> EngineConfig {
	let mut config =
		EngineConfig::builder().with_timeout(Duration::from_millis(launch.device.timeout_ms));
	if let Some(units) = launch.device.compute_units {
		config = config.with_compute_units(units);
	}
	if let Some(core) = launch.device.pin_core {
		config = config.with_core_pinning(core);
	}
	config
}

fn fill_input(
	fill: Fill,
	len: usize,
	seed: u64,
) -> InputVector<f32> {
	match fill {
		Fill::Sequence => InputVector::sequence(len),
		Fill::Zeros => InputVector::zeros(len),
		Fill::Ones => InputVector::filled(len, 1.0),
		Fill::Random => {
			let mut rng = StdRng::seed_from_u64(seed);
			InputVector::new((0..len).map(|_| rng.gen_range(0.0..1.0)).collect())
		},
	}
}

/// Resolves the launch and validates its shape before anything is allocated.
fn plan(args: &Args) -> Result<(LaunchFile, LaunchParams, Partition)> {
	let mut launch = lib_store::launch_from_file(args.config.as_deref())?;
	apply_overrides(args, &mut launch);

	let section = &launch.launch;
	let params = LaunchParams::new(section.total_elements, section.local_item_size)
		.with_packing_width(section.packing_width);
	let partition = Partition::compute(&params).map_err(DispatchError::from)?;
	Ok((launch, params, partition))
}

fn run(args: &Args) -> Result<()> {
	let (launch, params, partition) = plan(args)?;
	let input = fill_input(launch.fill, partition.total_elements(), args.seed);

	let reducer: Reducer<f32> = engine_config(&launch).build()?;
	info!(
		elements = params.total_elements,
		local = params.local_item_size,
		fill = ?launch.fill,
		"running reduction"
	);
	let sums = reducer.run(&params, input.data())?;

	let mut out = io::stdout().lock();
	for value in sums.values() {
		writeln!(out, "sum of vector elements: {:.6}", value)?;
	}
	reducer.shutdown()?;
	Ok(())
}

fn main() -> ExitCode {
	let args = Args::parse();

	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
		)
		.with_writer(io::stderr)
		.init();

	match run(&args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!(error = %e, "reduction failed");
			ExitCode::FAILURE
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use lib_reduce::PartitionError;

	#[test]
	fn test_overrides_replace_file_values() {
		let args = Args::try_parse_from([
			"playground",
			"--elements",
			"2048",
			"--local-size",
			"128",
			"--compute-units",
			"2",
			"--fill",
			"ones",
		])
		.unwrap();

		let mut launch = LaunchFile::reference();
		apply_overrides(&args, &mut launch);
		assert_eq!(launch.launch.total_elements, 2048);
		assert_eq!(launch.launch.local_item_size, 128);
		assert_eq!(launch.device.compute_units, Some(2));
		assert_eq!(launch.fill, Fill::Ones);
		assert_eq!(engine_config(&launch).compute_units(), Some(2));
	}

	#[test]
	fn test_no_overrides_keeps_reference() {
		let args = Args::try_parse_from(["playground"]).unwrap();
		let mut launch = LaunchFile::reference();
		apply_overrides(&args, &mut launch);
		assert_eq!(launch, LaunchFile::reference());
	}

	#[test]
	fn test_untileable_shape_is_rejected_before_fill() {
		for elements in ["1000", "18446744073709551615"] {
			let args = Args::try_parse_from(["playground", "--elements", elements]).unwrap();
			assert!(matches!(
				plan(&args),
				Err(error::Error::Dispatch(DispatchError::InvalidPartition(
					PartitionError::Indivisible { .. }
				)))
			));
		}
	}

	#[test]
	fn test_plan_sizes_input_from_partition() {
		let args = Args::try_parse_from(["playground", "--elements", "512", "--local-size", "32"])
			.unwrap();
		let (_, params, partition) = plan(&args).unwrap();
		assert_eq!(params.total_elements, 512);
		assert_eq!(partition.total_elements(), 512);
		assert_eq!(partition.group_count(), 4);
	}

	#[test]
	fn test_random_fill_is_seeded() {
		let a = fill_input(Fill::Random, 64, 9);
		let b = fill_input(Fill::Random, 64, 9);
		assert_eq!(a, b);
		assert!(a.data().iter().all(|v| (0.0..1.0).contains(v)));
	}

	#[test]
	fn test_reference_run() {
		let launch = LaunchFile::reference();
		let reducer: Reducer<f32> = engine_config(&launch).build().unwrap();
		let input = fill_input(launch.fill, 1024, 0);
		let sums = reducer.run(&LaunchParams::new(1024, 64), input.data()).unwrap();
		assert_eq!(sums.values(), &[32640.0, 98176.0, 163712.0, 229248.0]);
	}
}
