// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use super::error::BuildError;
use super::properties::DeviceProperties;
use std::collections::HashMap;

/// Kernel ABI understood by this device. Bumped whenever the launch contract changes.
pub const PROGRAM_ABI_VERSION: u32 = 1;

/// Versioned description of a device kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelSource {
	pub name: &'static str,
	pub abi_version: u32,
	pub local_bytes_per_item: usize,
}

/// Kernel validated against a device, ready to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltKernel {
	pub name: &'static str,
	pub local_bytes_per_item: usize,
	pub max_work_group_size: usize,
	pub local_mem_size: usize,
}

impl BuiltKernel {
	pub fn local_bytes(
		&self,
		local_size: usize,
	) -> usize {
		self.local_bytes_per_item.saturating_mul(local_size)
	}
}

#[derive(Debug, Clone)]
pub struct Program {
	device: usize,
	kernels: HashMap<&'static str, BuiltKernel>,
}

impl Program {
	/// Builds every source for `props`. Any invalid source fails the whole build.
	pub fn build(
		props: &DeviceProperties,
		sources: &[KernelSource],
	) -> Result<Self, BuildError> {
		if sources.is_empty() {
			return Err(BuildError::EmptyProgram);
		}

		let mut kernels = HashMap::with_capacity(sources.len());
		for source in sources {
			if source.abi_version != PROGRAM_ABI_VERSION {
				return Err(BuildError::AbiMismatch {
					name: source.name.to_string(),
					found: source.abi_version,
					expected: PROGRAM_ABI_VERSION,
				});
			}

			// At least one work-item must fit in local memory.
			if source.local_bytes_per_item > props.local_mem_size {
				return Err(BuildError::LocalMemoryExceeded {
					name: source.name.to_string(),
					required: source.local_bytes_per_item,
					available: props.local_mem_size,
				});
			}

			let built = BuiltKernel {
				name: source.name,
				local_bytes_per_item: source.local_bytes_per_item,
				max_work_group_size: props.max_work_group_size,
				local_mem_size: props.local_mem_size,
			};
			if kernels.insert(source.name, built).is_some() {
				return Err(BuildError::DuplicateKernel {
					name: source.name.to_string(),
				});
			}
		}

		Ok(Self {
			device: props.index,
			kernels,
		})
	}

	pub fn kernel(
		&self,
		name: &str,
	) -> Result<&BuiltKernel, BuildError> {
		self.kernels
			.get(name)
			.ok_or_else(|| BuildError::KernelNotFound {
				name: name.to_string(),
			})
	}

	pub fn device(&self) -> usize {
		self.device
	}

	pub fn len(&self) -> usize {
		self.kernels.len()
	}

	pub fn is_empty(&self) -> bool {
		self.kernels.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SUM: KernelSource = KernelSource {
		name: "sum",
		abi_version: PROGRAM_ABI_VERSION,
		local_bytes_per_item: 16,
	};

	#[test]
	fn test_build_and_lookup() {
		let props = DeviceProperties::detect(0);
		let program = Program::build(&props, &[SUM]).unwrap();
		let kernel = program.kernel("sum").unwrap();
		assert_eq!(kernel.local_bytes(64), 1024);
		assert_eq!(program.len(), 1);
	}

	#[test]
	fn test_unknown_kernel() {
		let props = DeviceProperties::detect(0);
		let program = Program::build(&props, &[SUM]).unwrap();
		assert_eq!(
			program.kernel("scan"),
			Err(BuildError::KernelNotFound {
				name: "scan".to_string()
			})
		);
	}

	#[test]
	fn test_rejects_invalid_sources() {
		let props = DeviceProperties::detect(0);

		assert_eq!(
			Program::build(&props, &[]).unwrap_err(),
			BuildError::EmptyProgram
		);
		assert!(matches!(
			Program::build(&props, &[SUM, SUM]),
			Err(BuildError::DuplicateKernel { .. })
		));

		let stale = KernelSource {
			abi_version: PROGRAM_ABI_VERSION + 1,
			..SUM
		};
		assert!(matches!(
			Program::build(&props, &[stale]),
			Err(BuildError::AbiMismatch { .. })
		));

		let huge = KernelSource {
			local_bytes_per_item: props.local_mem_size + 1,
			..SUM
		};
		assert!(matches!(
			Program::build(&props, &[huge]),
			Err(BuildError::LocalMemoryExceeded { .. })
		));
	}
}
