// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use std::marker::PhantomData;

pub(crate) use crate::operation::device::launch::{launch, NdRange, WorkItem};
pub(crate) use crate::operation::device::line::{Line4, Numeric};
pub(crate) use crate::operation::device::memory::{GlobalBuffer, LocalMemory};
pub(crate) use crate::operation::device::{BufferRep, DeviceMemoryPool, KernelSource};
pub(crate) use crate::operation::error::{OpError, Result};

pub trait KernelConfig: Send + Sync + Clone + 'static {}
pub trait KernelInput: Send + Sync + Clone + 'static {}
pub trait KernelOutput: Send + Sync + Clone + 'static {}

impl KernelConfig for NdRange {}
impl KernelConfig for () {}

impl KernelInput for () {}
impl KernelInput for BufferRep {}
impl KernelInput for (BufferRep, BufferRep) {}

impl KernelOutput for () {}
impl KernelOutput for BufferRep {}

pub trait Kernel<N: Numeric>: Send + Sync + Sized + 'static {
	type Cfg: KernelConfig;
	type Input: KernelInput;
	type Output: KernelOutput;

	fn name(&self) -> &'static str;

	fn exec(
		&self,
		order: &KernelOrder<N, Self>,
		pool: &DeviceMemoryPool<N>,
	) -> Result<()>;
}

pub struct KernelOrder<N: Numeric, K: Kernel<N>> {
	pub op: K,
	pub config: K::Cfg,
	pub input: K::Input,
	pub output: K::Output,
	_phantom: PhantomData<N>,
}

impl<N: Numeric, K: Kernel<N>> KernelOrder<N, K> {
	pub(crate) fn order(
		op: K,
		config: K::Cfg,
		input: K::Input,
		output: K::Output,
	) -> Self {
		Self {
			op,
			config,
			input,
			output,
			_phantom: PhantomData,
		}
	}
}

/// Fails with [`OpError::InvalidArguments`] unless `buffer` holds exactly `expected` elements.
pub(crate) fn expect_len<N: Numeric>(
	kernel: &'static str,
	what: &str,
	buffer: &GlobalBuffer<N>,
	expected: usize,
) -> Result<()> {
	if buffer.len() != expected {
		return Err(OpError::InvalidArguments {
			kernel,
			reason: format!(
				"{} holds {} elements, launch needs {}",
				what,
				buffer.len(),
				expected
			),
		});
	}
	Ok(())
}
