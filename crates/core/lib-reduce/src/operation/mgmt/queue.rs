// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use super::config::EngineConfig;
use super::error::{DispatchError, Result, Stage};
use crate::operation::device::{
	device_worker, BufferRep, DeviceCommand, DeviceProperties, DeviceResponse, Kernel,
	KernelExecutor, KernelOrder, Numeric,
};
use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// In-order command queue over one worker thread per device.
///
/// Every wait is bounded by the configured timeout. A device whose command times out
/// is marked stalled and refuses further commands.
pub struct CommandQueue<N: Numeric> {
	channels: Vec<Sender<DeviceCommand<N>>>,
	workers: Vec<thread::JoinHandle<()>>,
	devices: Vec<DeviceProperties>,
	stalled: Vec<AtomicBool>,
	timeout: Duration,
}

fn pin_to_core(
	device: usize,
	core: usize,
) {
	let core_ids = core_affinity::get_core_ids().unwrap_or_default();
	match core_ids.get(core) {
		Some(core_id) if core_affinity::set_for_current(*core_id) => {
			debug!(device, core, "device worker pinned");
		},
		Some(_) => warn!(device, core, "failed to pin device worker"),
		None => warn!(device, core, available = core_ids.len(), "core not available"),
	}
}

impl<N: Numeric> CommandQueue<N> {
	pub fn init(config: &EngineConfig) -> Result<Self> {
		config.validate()?;

		let mut queue = Self {
			channels: Vec::with_capacity(config.device_count()),
			workers: Vec::with_capacity(config.device_count()),
			devices: Vec::with_capacity(config.device_count()),
			stalled: Vec::with_capacity(config.device_count()),
			timeout: config.timeout(),
		};

		for device in 0..config.device_count() {
			let props = config.device_properties(device);
			let (tx, rx) = bounded::<DeviceCommand<N>>(config.queue_depth());
			let pin = config.pin_core().map(|first| first + device);
			let worker_props = props.clone();

			let handle = thread::Builder::new()
				.name(format!("device-worker-{}", device))
				.spawn(move || {
					if let Some(core) = pin {
						pin_to_core(device, core);
					}
					device_worker::<N>(worker_props, rx);
				})
				.map_err(|e| DispatchError::Setup {
					stage: Stage::DeviceInit,
					message: e.to_string(),
				})?;

			queue.channels.push(tx);
			queue.workers.push(handle);
			queue.devices.push(props);
			queue.stalled.push(AtomicBool::new(false));
		}

		for device in 0..queue.device_count() {
			queue.synchronize(device, Stage::DeviceInit)?;
		}

		info!(
			devices = queue.device_count(),
			compute_units = queue.devices[0].compute_units,
			"command queue ready"
		);
		Ok(queue)
	}

	pub fn device(
		&self,
		device: usize,
	) -> Result<&DeviceProperties> {
		self.devices.get(device).ok_or(DispatchError::InvalidDevice {
			id: device,
			max: self.devices.len().saturating_sub(1),
		})
	}

	pub fn device_count(&self) -> usize {
		self.devices.len()
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	pub fn is_stalled(
		&self,
		device: usize,
	) -> bool {
		self.stalled
			.get(device)
			.is_some_and(|flag| flag.load(Ordering::Acquire))
	}

	fn submit(
		&self,
		device: usize,
		stage: Stage,
		command: DeviceCommand<N>,
	) -> Result<()> {
		self.device(device)?;
		if self.is_stalled(device) {
			return Err(DispatchError::Stalled { device });
		}

		self.channels[device]
			.send_timeout(command, self.timeout)
			.map_err(|e| match e {
				SendTimeoutError::Timeout(_) => self.stall(device, stage),
				SendTimeoutError::Disconnected(_) => DispatchError::ChannelClosed { stage },
			})
	}

	fn wait(
		&self,
		device: usize,
		stage: Stage,
		rx: &Receiver<DeviceResponse>,
	) -> Result<DeviceResponse> {
		match rx.recv_timeout(self.timeout) {
			Ok(response) if response.device() != device => {
				warn!(device, from = response.device(), %stage, "response from wrong device");
				Err(DispatchError::InvalidResponse { stage })
			},
			Ok(DeviceResponse::Error { message, .. }) => {
				Err(DispatchError::Setup { stage, message })
			},
			Ok(response) => Ok(response),
			Err(RecvTimeoutError::Timeout) => Err(self.stall(device, stage)),
			Err(RecvTimeoutError::Disconnected) => Err(DispatchError::ChannelClosed { stage }),
		}
	}

	fn request(
		&self,
		device: usize,
		stage: Stage,
		command: impl FnOnce(Sender<DeviceResponse>) -> DeviceCommand<N>,
	) -> Result<DeviceResponse> {
		let (response_tx, response_rx) = bounded(1);
		self.submit(device, stage, command(response_tx))?;
		self.wait(device, stage, &response_rx)
	}

	fn stall(
		&self,
		device: usize,
		stage: Stage,
	) -> DispatchError {
		warn!(device, %stage, timeout = ?self.timeout, "device stalled");
		if let Some(flag) = self.stalled.get(device) {
			flag.store(true, Ordering::Release);
		}
		DispatchError::Timeout {
			stage,
			after: self.timeout,
		}
	}

	fn synchronize(
		&self,
		device: usize,
		stage: Stage,
	) -> Result<()> {
		match self.request(device, stage, |response| DeviceCommand::Synchronize {
			response,
		})? {
			DeviceResponse::Synchronized { .. } => Ok(()),
			_ => Err(DispatchError::InvalidResponse { stage }),
		}
	}

	/// Stages `values` into a new device buffer.
	pub fn buffer_upload(
		&self,
		device: usize,
		values: &[N],
	) -> Result<BufferRep> {
		let bytes = bytemuck::cast_slice(values).to_vec();
		match self.request(device, Stage::Upload, |response| DeviceCommand::Upload {
			bytes,
			response,
		})? {
			DeviceResponse::BufferCreated { buffer, .. } => Ok(buffer),
			_ => Err(DispatchError::InvalidResponse {
				stage: Stage::Upload,
			}),
		}
	}

	/// Allocates `len` zero-initialised elements on `device`.
	pub fn buffer_zeroed(
		&self,
		device: usize,
		len: usize,
	) -> Result<BufferRep> {
		match self.request(device, Stage::Allocate, |response| {
			DeviceCommand::CreateZeroed { len, response }
		})? {
			DeviceResponse::BufferCreated { buffer, .. } => Ok(buffer),
			_ => Err(DispatchError::InvalidResponse {
				stage: Stage::Allocate,
			}),
		}
	}

	pub fn buffer_read(
		&self,
		device: usize,
		buffer: &BufferRep,
	) -> Result<Vec<N>> {
		let buffer = buffer.clone();
		match self.request(device, Stage::Download, |response| DeviceCommand::Read {
			buffer,
			response,
		})? {
			DeviceResponse::DataRetrieved { bytes, .. } => Ok(bytemuck::pod_collect_to_vec(&bytes)),
			_ => Err(DispatchError::InvalidResponse {
				stage: Stage::Download,
			}),
		}
	}

	pub fn buffer_release(
		&self,
		device: usize,
		buffer: &BufferRep,
	) -> Result<()> {
		let buffer = buffer.clone();
		match self.request(device, Stage::Release, |response| DeviceCommand::Release {
			buffer,
			response,
		})? {
			DeviceResponse::Released { .. } => Ok(()),
			_ => Err(DispatchError::InvalidResponse {
				stage: Stage::Release,
			}),
		}
	}

	/// Enqueues `kernel` and blocks until it has completed on `device`.
	///
	/// Failures reported by the kernel surface as [`Stage::Launch`]; running past the
	/// timeout surfaces as [`Stage::Completion`].
	pub fn exec_kernel<K: Kernel<N>>(
		&self,
		device: usize,
		kernel: K,
		config: K::Cfg,
		input: K::Input,
		output: K::Output,
	) -> Result<()> {
		let name = kernel.name();
		let order = KernelOrder::order(kernel, config, input, output);
		let executor: KernelExecutor<N> = Box::new(move |pool| order.op.exec(&order, pool));

		let (response_tx, response_rx) = bounded(1);
		self.submit(
			device,
			Stage::Launch,
			DeviceCommand::ExecuteKernel {
				name,
				executor,
				response: response_tx,
			},
		)?;

		match self.wait(device, Stage::Completion, &response_rx) {
			Ok(DeviceResponse::Executed { .. }) => Ok(()),
			Ok(_) => Err(DispatchError::InvalidResponse {
				stage: Stage::Completion,
			}),
			Err(DispatchError::Setup { message, .. }) => Err(DispatchError::Setup {
				stage: Stage::Launch,
				message,
			}),
			Err(e) => Err(e),
		}
	}

	/// Blocks until every command queued on `device` has been served.
	pub fn finish(
		&self,
		device: usize,
	) -> Result<()> {
		self.synchronize(device, Stage::Completion)
	}

	pub fn allocation_count(
		&self,
		device: usize,
	) -> Result<usize> {
		match self.request(device, Stage::Release, |response| {
			DeviceCommand::CountAllocations { response }
		})? {
			DeviceResponse::Allocations { count, .. } => Ok(count),
			_ => Err(DispatchError::InvalidResponse {
				stage: Stage::Release,
			}),
		}
	}

	fn stop(&mut self) -> Result<()> {
		for (device, channel) in self.channels.iter().enumerate() {
			// A full channel only happens behind a stuck command.
			if channel.try_send(DeviceCommand::Shutdown).is_err() {
				debug!(device, "shutdown not delivered");
			}
		}

		let mut result = Ok(());
		for (device, handle) in std::mem::take(&mut self.workers).into_iter().enumerate() {
			if self.is_stalled(device) {
				warn!(device, "detaching stalled device worker");
				continue;
			}
			if handle.join().is_err() {
				result = Err(DispatchError::WorkerPanic);
			}
		}
		result
	}

	/// Stops every device worker and waits for those that are not stalled.
	pub fn shutdown(mut self) -> Result<()> {
		self.stop()
	}
}

impl<N: Numeric> Drop for CommandQueue<N> {
	fn drop(&mut self) {
		if let Err(e) = self.stop() {
			warn!(error = %e, "command queue shutdown failed");
		}
	}
}
