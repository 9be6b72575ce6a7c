// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use super::error::PartitionError;
use crate::operation::device::{BuiltKernel, NdRange, PACKING_WIDTH};
use std::ops::Range;

/// Caller-facing launch parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LaunchParams {
	pub total_elements: usize,
	pub local_item_size: usize,
	pub packing_width: usize,
}

impl LaunchParams {
	pub fn new(
		total_elements: usize,
		local_item_size: usize,
	) -> Self {
		Self {
			total_elements,
			local_item_size,
			packing_width: PACKING_WIDTH,
		}
	}

	pub fn with_packing_width(
		mut self,
		packing_width: usize,
	) -> Self {
		self.packing_width = packing_width;
		self
	}
}

/// Validated tiling of the input into work-groups.
///
/// Group `g` owns elements `[g * 4 * L, (g + 1) * 4 * L)`. Slices are disjoint and
/// cover the input exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
	total_elements: usize,
	packing_width: usize,
	local_size: usize,
	global_size: usize,
	group_count: usize,
}

impl Partition {
	pub fn compute(params: &LaunchParams) -> Result<Self, PartitionError> {
		let LaunchParams {
			total_elements,
			local_item_size: local,
			packing_width,
		} = *params;

		if packing_width != PACKING_WIDTH {
			return Err(PartitionError::UnsupportedPackingWidth {
				width: packing_width,
				supported: PACKING_WIDTH,
			});
		}
		if total_elements == 0 {
			return Err(PartitionError::EmptyInput);
		}
		if local == 0 {
			return Err(PartitionError::ZeroLocalSize);
		}
		// The halving tree drops the middle element of odd-sized steps.
		if !local.is_power_of_two() {
			return Err(PartitionError::NonPowerOfTwoGroup { local });
		}

		let tile = local.saturating_mul(packing_width);
		if total_elements % tile != 0 {
			return Err(PartitionError::Indivisible {
				total: total_elements,
				tile,
			});
		}

		let global_size = total_elements / packing_width;
		Ok(Self {
			total_elements,
			packing_width,
			local_size: local,
			global_size,
			group_count: global_size / local,
		})
	}

	/// Checks the group against the limits `kernel` was built for.
	pub fn check_kernel(
		&self,
		kernel: &BuiltKernel,
	) -> Result<(), PartitionError> {
		if self.local_size > kernel.max_work_group_size {
			return Err(PartitionError::GroupTooLarge {
				local: self.local_size,
				max: kernel.max_work_group_size,
			});
		}

		let required = kernel.local_bytes(self.local_size);
		if required > kernel.local_mem_size {
			return Err(PartitionError::LocalMemoryExceeded {
				required,
				available: kernel.local_mem_size,
			});
		}
		Ok(())
	}

	pub fn nd_range(&self) -> NdRange {
		NdRange::new(self.global_size, self.local_size)
	}

	pub fn total_elements(&self) -> usize {
		self.total_elements
	}

	pub fn packing_width(&self) -> usize {
		self.packing_width
	}

	pub fn local_size(&self) -> usize {
		self.local_size
	}

	pub fn global_size(&self) -> usize {
		self.global_size
	}

	pub fn group_count(&self) -> usize {
		self.group_count
	}

	pub fn elements_per_group(&self) -> usize {
		self.packing_width * self.local_size
	}

	pub fn group_slice(
		&self,
		group: usize,
	) -> Range<usize> {
		let start = group * self.elements_per_group();
		start..start + self.elements_per_group()
	}

	pub fn group_slices(&self) -> impl Iterator<Item = Range<usize>> + '_ {
		(0..self.group_count).map(move |g| self.group_slice(g))
	}
}
