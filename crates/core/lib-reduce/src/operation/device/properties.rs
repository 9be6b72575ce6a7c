// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use std::num::NonZeroUsize;
use std::thread;

pub const MAX_WORK_GROUP_SIZE: usize = 256;
pub const LOCAL_MEM_SIZE: usize = 32 * 1024;

// Each compute unit spawns a full team of work-item threads.
const MAX_DETECTED_UNITS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProperties {
	pub index: usize,
	pub name: String,
	pub compute_units: usize,
	pub max_work_group_size: usize,
	pub local_mem_size: usize,
}

impl DeviceProperties {
	pub fn detect(index: usize) -> Self {
		let compute_units = thread::available_parallelism()
			.map(NonZeroUsize::get)
			.unwrap_or(1)
			.min(MAX_DETECTED_UNITS);

		Self {
			index,
			name: format!("cpu-workgroup-{}", index),
			compute_units,
			max_work_group_size: MAX_WORK_GROUP_SIZE,
			local_mem_size: LOCAL_MEM_SIZE,
		}
	}

	pub fn with_compute_units(
		mut self,
		compute_units: usize,
	) -> Self {
		self.compute_units = compute_units.max(1);
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_detect_bounds_compute_units() {
		let props = DeviceProperties::detect(0);
		assert!(props.compute_units >= 1);
		assert!(props.compute_units <= MAX_DETECTED_UNITS);
		assert_eq!(props.max_work_group_size, MAX_WORK_GROUP_SIZE);
	}

	#[test]
	fn test_compute_units_never_zero() {
		let props = DeviceProperties::detect(1).with_compute_units(0);
		assert_eq!(props.compute_units, 1);
		assert_eq!(props.name, "cpu-workgroup-1");
	}
}
