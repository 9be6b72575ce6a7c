// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use super::buffer::DeviceBuffer;
use super::config::EngineConfig;
use super::error::{DispatchError, PartitionError, Result};
use super::partition::{LaunchParams, Partition};
use super::queue::CommandQueue;
use crate::operation::device::{BuiltKernel, KernelSource, Numeric, Program, ReductionVector};
use crate::vector::InputVector;
use std::ops::Range;
use tracing::{debug, info_span};

/// One partial sum per work-group, in group order.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialSums<N: Numeric> {
	values: Vec<N>,
	partition: Partition,
}

impl<N: Numeric> PartialSums<N> {
	pub fn values(&self) -> &[N] {
		&self.values
	}

	pub fn partition(&self) -> &Partition {
		&self.partition
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Pairs each partial sum with the input slice it covers.
	pub fn iter(&self) -> impl Iterator<Item = (Range<usize>, N)> + '_ {
		self.partition.group_slices().zip(self.values.iter().copied())
	}

	pub fn into_values(self) -> Vec<N> {
		self.values
	}
}

/// Host side of the reduction: partitions, stages, launches and collects.
pub struct Reducer<N: Numeric> {
	queue: CommandQueue<N>,
	programs: Vec<Program>,
}

impl<N: Numeric> Reducer<N> {
	pub fn new(config: &EngineConfig) -> Result<Self> {
		Self::from_sources(config, &[ReductionVector::source::<N>()])
	}

	/// Builds `sources` for every device. They must include the reduction kernel.
	pub(crate) fn from_sources(
		config: &EngineConfig,
		sources: &[KernelSource],
	) -> Result<Self> {
		let queue = CommandQueue::init(config)?;

		let mut programs = Vec::with_capacity(queue.device_count());
		for device in 0..queue.device_count() {
			let program = Program::build(queue.device(device)?, sources)?;
			program.kernel(ReductionVector::NAME)?;
			programs.push(program);
		}

		Ok(Self { queue, programs })
	}

	/// Reduces `input` on device 0 with groups of `local_item_size` work-items.
	pub fn partial_sums(
		&self,
		input: &InputVector<N>,
		local_item_size: usize,
	) -> Result<PartialSums<N>> {
		self.run(&LaunchParams::new(input.len(), local_item_size), input.data())
	}

	pub fn run(
		&self,
		params: &LaunchParams,
		input: &[N],
	) -> Result<PartialSums<N>> {
		self.run_on(0, params, input)
	}

	/// Runs one reduction on `device`.
	///
	/// Everything the device could reject is checked before any buffer is staged. Device
	/// buffers are released on every path, except on a device that has stalled.
	pub fn run_on(
		&self,
		device: usize,
		params: &LaunchParams,
		input: &[N],
	) -> Result<PartialSums<N>> {
		let partition = Partition::compute(params)?;
		if input.len() != partition.total_elements() {
			return Err(PartitionError::LengthMismatch {
				expected: partition.total_elements(),
				actual: input.len(),
			}
			.into());
		}
		partition.check_kernel(self.kernel(device)?)?;

		let _span = info_span!(
			"reduce",
			device,
			elements = partition.total_elements(),
			local = partition.local_size(),
			groups = partition.group_count()
		)
		.entered();

		let data = DeviceBuffer::upload(&self.queue, device, input)?;
		let output = DeviceBuffer::zeroed(&self.queue, device, partition.group_count())?;
		debug!("buffers staged");

		self.queue.exec_kernel(
			device,
			ReductionVector,
			partition.nd_range(),
			data.rep().clone(),
			output.rep().clone(),
		)?;
		debug!("kernel completed");

		let values = output.read()?;
		output.release()?;
		data.release()?;

		Ok(PartialSums { values, partition })
	}

	pub fn kernel(
		&self,
		device: usize,
	) -> Result<&BuiltKernel> {
		Ok(self.program(device)?.kernel(ReductionVector::NAME)?)
	}

	pub fn program(
		&self,
		device: usize,
	) -> Result<&Program> {
		self.programs
			.get(device)
			.ok_or(DispatchError::InvalidDevice {
				id: device,
				max: self.programs.len().saturating_sub(1),
			})
	}

	pub fn queue(&self) -> &CommandQueue<N> {
		&self.queue
	}

	pub fn device_count(&self) -> usize {
		self.queue.device_count()
	}

	pub fn shutdown(self) -> Result<()> {
		self.queue.shutdown()
	}
}
