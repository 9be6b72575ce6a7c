// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use super::base::*;
use crate::operation::device::program::PROGRAM_ABI_VERSION;
use crate::operation::device::PACKING_WIDTH;
use std::mem::size_of;

/// Two-level sum: packed 4-wide loads, then a shared-memory halving tree per group.
///
/// Writes one scalar per work-group to `output[group_id]`. The group size must be a
/// power of two; the partition step rejects anything else before launch.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReductionVector;

impl ReductionVector {
	pub const NAME: &'static str = "reduction_vector";

	pub fn source<N: Numeric>() -> KernelSource {
		KernelSource {
			name: Self::NAME,
			abi_version: PROGRAM_ABI_VERSION,
			local_bytes_per_item: size_of::<Line4<N>>(),
		}
	}
}

impl<N: Numeric> Kernel<N> for ReductionVector {
	type Cfg = NdRange;
	type Input = BufferRep;
	type Output = BufferRep;

	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn exec(
		&self,
		order: &KernelOrder<N, Self>,
		pool: &DeviceMemoryPool<N>,
	) -> Result<()> {
		let range = order.config;
		let data = pool.get_buffer(&order.input)?;
		let output = pool.get_buffer(&order.output)?;

		expect_len(Self::NAME, "data", &data, range.global_size * PACKING_WIDTH)?;
		expect_len(Self::NAME, "output", &output, range.group_count())?;

		launch(
			pool.properties(),
			range,
			range.local_size,
			|item, partial_sums| reduction_vector(item, &data, partial_sums, &output),
		)?;
		Ok(())
	}
}

pub(crate) fn reduction_vector<N: Numeric>(
	item: &WorkItem<'_>,
	data: &GlobalBuffer<N>,
	partial_sums: &LocalMemory<Line4<N>>,
	output: &GlobalBuffer<N>,
) {
	let lid = item.local_id();
	partial_sums.store(lid, data.load_line(item.global_id()));
	item.barrier();

	let mut stride = item.local_size() / 2;
	while stride > 0 {
		if lid < stride {
			let folded = partial_sums.load(lid) + partial_sums.load(lid + stride);
			partial_sums.store(lid, folded);
		}
		item.barrier();
		stride >>= 1;
	}

	if lid == 0 {
		output.store(item.group_id(), partial_sums.load(0).horizontal_sum());
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::operation::device::DeviceProperties;

	fn run(
		values: &[f32],
		local_size: usize,
		units: usize,
	) -> Vec<f32> {
		let props = DeviceProperties::detect(0).with_compute_units(units);
		let data = GlobalBuffer::from_slice(values);
		let range = NdRange::new(values.len() / PACKING_WIDTH, local_size);
		let output = GlobalBuffer::zeroed(range.group_count());

		launch(&props, range, local_size, |item, partial_sums| {
			reduction_vector(item, &data, partial_sums, &output)
		})
		.unwrap();
		output.to_vec()
	}

	#[test]
	fn test_reference_scenario() {
		let values: Vec<f32> = (0..1024).map(|v| v as f32).collect();
		assert_eq!(
			run(&values, 64, 4),
			vec![32640.0, 98176.0, 163712.0, 229248.0]
		);
	}

	#[test]
	fn test_compute_unit_count_does_not_change_result() {
		let values: Vec<f32> = (0..512).map(|v| (v % 7) as f32).collect();
		assert_eq!(run(&values, 16, 1), run(&values, 16, 5));
	}

	#[test]
	fn test_group_of_one() {
		let values = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
		assert_eq!(run(&values, 1, 2), vec![10.0, 26.0]);
	}

	#[test]
	fn test_source_tracks_element_width() {
		assert_eq!(ReductionVector::source::<f32>().local_bytes_per_item, 16);
		assert_eq!(ReductionVector::source::<f64>().local_bytes_per_item, 32);
	}
}
