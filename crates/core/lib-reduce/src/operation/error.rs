// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use super::device::DeviceError;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, OpError>;

#[derive(Debug, Error)]
pub enum OpError {
	#[error(transparent)]
	Device(#[from] DeviceError),

	#[error("Kernel '{kernel}' rejected its arguments: {reason}")]
	InvalidArguments {
		kernel: &'static str,
		reason: String,
	},
}
