// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use super::dispatch::Reducer;
use super::error::{DispatchError, Result};
use crate::operation::device::{DeviceProperties, Numeric};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_QUEUE_DEPTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
	device_count: usize,
	compute_units: Option<usize>,
	timeout: Duration,
	pin_core: Option<usize>,
	queue_depth: usize,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			device_count: 1,
			compute_units: None,
			timeout: DEFAULT_TIMEOUT,
			pin_core: None,
			queue_depth: DEFAULT_QUEUE_DEPTH,
		}
	}
}

impl EngineConfig {
	pub fn builder() -> Self {
		Self::default()
	}

	pub fn with_device_count(
		mut self,
		count: usize,
	) -> Self {
		self.device_count = count;
		self
	}

	/// Fixes the number of compute units per device instead of detecting it.
	pub fn with_compute_units(
		mut self,
		units: usize,
	) -> Self {
		self.compute_units = Some(units);
		self
	}

	/// Upper bound for every blocking wait on a device response.
	pub fn with_timeout(
		mut self,
		timeout: Duration,
	) -> Self {
		self.timeout = timeout;
		self
	}

	/// Pins device worker `d` to core `first_core + d`.
	pub fn with_core_pinning(
		mut self,
		first_core: usize,
	) -> Self {
		self.pin_core = Some(first_core);
		self
	}

	pub fn with_queue_depth(
		mut self,
		depth: usize,
	) -> Self {
		self.queue_depth = depth;
		self
	}

	pub fn validate(&self) -> Result<()> {
		if self.device_count == 0 {
			return Err(DispatchError::InvalidConfiguration(
				"device count must be at least 1".to_string(),
			));
		}
		if self.compute_units == Some(0) {
			return Err(DispatchError::InvalidConfiguration(
				"compute units must be at least 1".to_string(),
			));
		}
		if self.timeout.is_zero() {
			return Err(DispatchError::InvalidConfiguration(
				"timeout must be non-zero".to_string(),
			));
		}
		if self.queue_depth == 0 {
			return Err(DispatchError::InvalidConfiguration(
				"queue depth must be at least 1".to_string(),
			));
		}
		Ok(())
	}

	pub fn device_properties(
		&self,
		index: usize,
	) -> DeviceProperties {
		let props = DeviceProperties::detect(index);
		match self.compute_units {
			Some(units) => props.with_compute_units(units),
			None => props,
		}
	}

	pub fn build<N: Numeric>(self) -> Result<Reducer<N>> {
		Reducer::new(&self)
	}

	pub fn device_count(&self) -> usize {
		self.device_count
	}

	pub fn compute_units(&self) -> Option<usize> {
		self.compute_units
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	pub fn pin_core(&self) -> Option<usize> {
		self.pin_core
	}

	pub fn queue_depth(&self) -> usize {
		self.queue_depth
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_builder_pattern() {
		let config = EngineConfig::builder()
			.with_device_count(2)
			.with_compute_units(3)
			.with_timeout(Duration::from_millis(250))
			.with_core_pinning(4);

		assert_eq!(config.device_count(), 2);
		assert_eq!(config.device_properties(1).compute_units, 3);
		assert_eq!(config.device_properties(1).index, 1);
		assert_eq!(config.timeout(), Duration::from_millis(250));
		assert_eq!(config.pin_core(), Some(4));
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_validation() {
		let bad = [
			EngineConfig::builder().with_device_count(0),
			EngineConfig::builder().with_compute_units(0),
			EngineConfig::builder().with_timeout(Duration::ZERO),
			EngineConfig::builder().with_queue_depth(0),
		];
		for config in bad {
			assert!(matches!(
				config.validate(),
				Err(DispatchError::InvalidConfiguration(_))
			));
		}
	}
}
