// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use std::sync::PoisonError;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, DeviceError>;

#[derive(Debug, Error)]
pub enum DeviceError {
	#[error("Device memory lock is poisoned")]
	LockError,

	#[error("Buffer {id} not found on device")]
	BufferNotFound { id: usize },

	#[error("Staging failed: {0}")]
	Staging(String),

	#[error("A work-item panicked during the launch")]
	WorkItemPanic,

	#[error("Failed to spawn work-item thread: {0}")]
	Spawn(String),

	#[error("Invalid ND range: global size {global}, local size {local}")]
	InvalidRange { global: usize, local: usize },
}

impl<T> From<PoisonError<T>> for DeviceError {
	fn from(_: PoisonError<T>) -> Self {
		DeviceError::LockError
	}
}

/// Program build failures. Always fatal, never folded into setup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
	#[error("Program contains no kernels")]
	EmptyProgram,

	#[error("Kernel '{name}' is defined twice")]
	DuplicateKernel { name: String },

	#[error("Kernel '{name}' targets ABI {found}, device expects {expected}")]
	AbiMismatch {
		name: String,
		found: u32,
		expected: u32,
	},

	#[error("Kernel '{name}' needs {required} bytes of local memory per item, device has {available}")]
	LocalMemoryExceeded {
		name: String,
		required: usize,
		available: usize,
	},

	#[error("Kernel '{name}' not found in program")]
	KernelNotFound { name: String },
}
