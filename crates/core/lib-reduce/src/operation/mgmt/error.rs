// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use crate::operation::device::BuildError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, DispatchError>;

/// Host-visible step of a reduction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
	DeviceInit,
	Upload,
	Allocate,
	Launch,
	Completion,
	Download,
	Release,
}

impl fmt::Display for Stage {
	fn fmt(
		&self,
		f: &mut fmt::Formatter<'_>,
	) -> fmt::Result {
		let name = match self {
			Self::DeviceInit => "device init",
			Self::Upload => "upload",
			Self::Allocate => "output allocation",
			Self::Launch => "kernel launch",
			Self::Completion => "completion wait",
			Self::Download => "download",
			Self::Release => "buffer release",
		};
		f.write_str(name)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
	#[error("Input is empty")]
	EmptyInput,

	#[error("Local item size must be at least 1")]
	ZeroLocalSize,

	#[error("Packing width {width} is not supported, only {supported} is")]
	UnsupportedPackingWidth { width: usize, supported: usize },

	#[error("Local item size {local} is not a power of two")]
	NonPowerOfTwoGroup { local: usize },

	#[error("{total} elements do not tile into groups of {tile}")]
	Indivisible { total: usize, tile: usize },

	#[error("Local item size {local} exceeds the device maximum of {max}")]
	GroupTooLarge { local: usize, max: usize },

	#[error("Work-group needs {required} bytes of local memory, device has {available}")]
	LocalMemoryExceeded { required: usize, available: usize },

	#[error("Launch expects {expected} elements, input has {actual}")]
	LengthMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum DispatchError {
	#[error("{stage} failed: {message}")]
	Setup { stage: Stage, message: String },

	#[error("{stage} timed out after {after:?}")]
	Timeout { stage: Stage, after: Duration },

	#[error("Program build failed: {0}")]
	Build(#[from] BuildError),

	#[error("Invalid partition: {0}")]
	InvalidPartition(#[from] PartitionError),

	#[error("Invalid configuration: {0}")]
	InvalidConfiguration(String),

	#[error("Invalid device {id}, available devices: 0-{max}")]
	InvalidDevice { id: usize, max: usize },

	#[error("Device channel closed during {stage}")]
	ChannelClosed { stage: Stage },

	#[error("Invalid response received from device worker during {stage}")]
	InvalidResponse { stage: Stage },

	#[error("Device {device} is stalled behind a timed out command")]
	Stalled { device: usize },

	#[error("Device worker panicked")]
	WorkerPanic,
}

impl DispatchError {
	pub fn stage(&self) -> Option<Stage> {
		match self {
			Self::Setup { stage, .. }
			| Self::Timeout { stage, .. }
			| Self::ChannelClosed { stage }
			| Self::InvalidResponse { stage } => Some(*stage),
			_ => None,
		}
	}
}
