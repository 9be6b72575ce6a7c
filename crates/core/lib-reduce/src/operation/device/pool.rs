// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use super::error::{DeviceError, Result};
use super::line::Numeric;
use super::mem_rep::BufferRep;
use super::memory::GlobalBuffer;
use super::properties::DeviceProperties;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::mem::size_of;
use std::sync::{Arc, Mutex};

pub struct DeviceMemoryPool<N: Numeric> {
	props: DeviceProperties,
	allocations: Mutex<HashMap<BufferRep, Arc<GlobalBuffer<N>>>>,
	next_id: Mutex<usize>,
	_pd: PhantomData<N>,
}

impl<N: Numeric> DeviceMemoryPool<N> {
	pub fn new(props: DeviceProperties) -> Self {
		Self {
			props,
			allocations: Mutex::new(HashMap::new()),
			next_id: Mutex::new(0),
			_pd: PhantomData,
		}
	}

	fn create_handle(
		&self,
		len: usize,
	) -> Result<BufferRep> {
		let mut next_id = self.next_id.lock()?;
		let id = *next_id;
		*next_id += 1;
		Ok(BufferRep {
			id,
			len,
			byte_size: size_of::<N>(),
		})
	}

	fn insert(
		&self,
		buffer: GlobalBuffer<N>,
	) -> Result<BufferRep> {
		let rep = self.create_handle(buffer.len())?;
		self.allocations
			.lock()?
			.insert(rep.clone(), Arc::new(buffer));
		Ok(rep)
	}

	/// Allocates `len` elements, zero-initialised over the full region.
	pub fn allocate_zeroed(
		&self,
		len: usize,
	) -> Result<BufferRep> {
		self.insert(GlobalBuffer::zeroed(len))
	}

	/// Allocates a buffer from host bytes staged in native element layout.
	pub fn allocate_from_bytes(
		&self,
		bytes: &[u8],
	) -> Result<BufferRep> {
		if bytes.len() % size_of::<N>() != 0 {
			return Err(DeviceError::Staging(format!(
				"{} bytes is not a whole number of {}-byte elements",
				bytes.len(),
				size_of::<N>()
			)));
		}
		let values: Vec<N> = bytemuck::pod_collect_to_vec(bytes);
		self.insert(GlobalBuffer::from_slice(&values))
	}

	pub fn get_buffer(
		&self,
		rep: &BufferRep,
	) -> Result<Arc<GlobalBuffer<N>>> {
		let allocations = self.allocations.lock()?;
		match allocations.get(rep) {
			Some(buffer) => Ok(Arc::clone(buffer)),
			None => Err(DeviceError::BufferNotFound { id: rep.id }),
		}
	}

	pub fn read_bytes(
		&self,
		rep: &BufferRep,
	) -> Result<Vec<u8>> {
		let buffer = self.get_buffer(rep)?;
		let values = buffer.to_vec();
		Ok(bytemuck::cast_slice(&values).to_vec())
	}

	pub fn deallocate(
		&self,
		rep: &BufferRep,
	) -> Result<()> {
		let mut allocations = self.allocations.lock()?;
		match allocations.remove(rep) {
			Some(_) => Ok(()),
			None => Err(DeviceError::BufferNotFound { id: rep.id }),
		}
	}

	pub fn allocation_count(&self) -> Result<usize> {
		Ok(self.allocations.lock()?.len())
	}

	pub fn properties(&self) -> &DeviceProperties {
		&self.props
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pool() -> DeviceMemoryPool<f32> {
		DeviceMemoryPool::new(DeviceProperties::detect(0))
	}

	#[test]
	fn test_staging_round_trip() {
		let pool = pool();
		let values = [1.5f32, -2.0, 3.25, 0.0];
		let rep = pool
			.allocate_from_bytes(bytemuck::cast_slice(&values))
			.unwrap();

		assert_eq!(rep.len, 4);
		assert_eq!(rep.size_in_bytes(), 16);
		let bytes = pool.read_bytes(&rep).unwrap();
		assert_eq!(bytemuck::pod_collect_to_vec::<u8, f32>(&bytes), values);
	}

	#[test]
	fn test_partial_element_is_rejected() {
		let pool = pool();
		let result = pool.allocate_from_bytes(&[0u8; 6]);
		assert!(matches!(result, Err(DeviceError::Staging(_))));
		assert_eq!(pool.allocation_count().unwrap(), 0);
	}

	#[test]
	fn test_zeroed_covers_full_region() {
		let pool = pool();
		let rep = pool.allocate_zeroed(16).unwrap();
		let buffer = pool.get_buffer(&rep).unwrap();
		assert_eq!(buffer.to_vec(), vec![0.0; 16]);
	}

	#[test]
	fn test_deallocate_twice_fails() {
		let pool = pool();
		let rep = pool.allocate_zeroed(4).unwrap();
		pool.deallocate(&rep).unwrap();
		assert!(matches!(
			pool.deallocate(&rep),
			Err(DeviceError::BufferNotFound { .. })
		));
		assert!(pool.get_buffer(&rep).is_err());
	}

	#[test]
	fn test_handles_are_unique() {
		let pool = pool();
		let a = pool.allocate_zeroed(4).unwrap();
		let b = pool.allocate_zeroed(4).unwrap();
		assert_ne!(a, b);
		assert_eq!(pool.allocation_count().unwrap(), 2);
	}
}
