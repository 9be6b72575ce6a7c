// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use super::error::Result;
use super::queue::CommandQueue;
use crate::operation::device::{BufferRep, Numeric};
use tracing::{debug, warn};

/// Device buffer released when dropped, on every exit path of a run.
pub struct DeviceBuffer<'q, N: Numeric> {
	queue: &'q CommandQueue<N>,
	device: usize,
	rep: BufferRep,
	live: bool,
}

impl<'q, N: Numeric> DeviceBuffer<'q, N> {
	pub fn upload(
		queue: &'q CommandQueue<N>,
		device: usize,
		values: &[N],
	) -> Result<Self> {
		let rep = queue.buffer_upload(device, values)?;
		Ok(Self::wrap(queue, device, rep))
	}

	pub fn zeroed(
		queue: &'q CommandQueue<N>,
		device: usize,
		len: usize,
	) -> Result<Self> {
		let rep = queue.buffer_zeroed(device, len)?;
		Ok(Self::wrap(queue, device, rep))
	}

	fn wrap(
		queue: &'q CommandQueue<N>,
		device: usize,
		rep: BufferRep,
	) -> Self {
		Self {
			queue,
			device,
			rep,
			live: true,
		}
	}

	pub fn rep(&self) -> &BufferRep {
		&self.rep
	}

	pub fn read(&self) -> Result<Vec<N>> {
		self.queue.buffer_read(self.device, &self.rep)
	}

	/// Releases the buffer now and reports failure instead of logging it.
	pub fn release(mut self) -> Result<()> {
		self.live = false;
		self.queue.buffer_release(self.device, &self.rep)
	}
}

impl<N: Numeric> Drop for DeviceBuffer<'_, N> {
	fn drop(&mut self) {
		if !self.live {
			return;
		}
		let buffer = self.rep.id;
		if self.queue.is_stalled(self.device) {
			debug!(device = self.device, buffer, "skipping release on stalled device");
			return;
		}
		if let Err(e) = self.queue.buffer_release(self.device, &self.rep) {
			warn!(device = self.device, buffer, error = %e, "buffer release failed");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use super::super::config::EngineConfig;

	#[test]
	fn test_drop_releases() {
		let queue = CommandQueue::<f32>::init(&EngineConfig::default()).unwrap();
		{
			let buffer = DeviceBuffer::upload(&queue, 0, &[1.0, 2.0]).unwrap();
			assert_eq!(buffer.read().unwrap(), vec![1.0, 2.0]);
			assert_eq!(queue.allocation_count(0).unwrap(), 1);
		}
		assert_eq!(queue.allocation_count(0).unwrap(), 0);
	}

	#[test]
	fn test_explicit_release() {
		let queue = CommandQueue::<f64>::init(&EngineConfig::default()).unwrap();
		let buffer = DeviceBuffer::zeroed(&queue, 0, 3).unwrap();
		assert_eq!(buffer.rep().len, 3);
		buffer.release().unwrap();
		assert_eq!(queue.allocation_count(0).unwrap(), 0);
	}
}
