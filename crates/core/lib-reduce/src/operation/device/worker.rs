// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use super::line::Numeric;
use super::mem_rep::BufferRep;
use super::pool::DeviceMemoryPool;
use super::properties::DeviceProperties;
use crate::operation::error::Result;
use crossbeam::channel::{Receiver, Sender};
use tracing::{debug, warn};

pub(crate) type KernelExecutor<N> = Box<dyn FnOnce(&DeviceMemoryPool<N>) -> Result<()> + Send>;

pub(crate) enum DeviceCommand<N: Numeric> {
	Upload {
		bytes: Vec<u8>,
		response: Sender<DeviceResponse>,
	},
	CreateZeroed {
		len: usize,
		response: Sender<DeviceResponse>,
	},
	Read {
		buffer: BufferRep,
		response: Sender<DeviceResponse>,
	},
	ExecuteKernel {
		name: &'static str,
		executor: KernelExecutor<N>,
		response: Sender<DeviceResponse>,
	},
	Synchronize {
		response: Sender<DeviceResponse>,
	},
	Release {
		buffer: BufferRep,
		response: Sender<DeviceResponse>,
	},
	CountAllocations {
		response: Sender<DeviceResponse>,
	},
	Shutdown,
}

#[derive(Clone, Debug)]
pub(crate) enum DeviceResponse {
	BufferCreated { device: usize, buffer: BufferRep },
	DataRetrieved { device: usize, bytes: Vec<u8> },
	Executed { device: usize },
	Synchronized { device: usize },
	Released { device: usize },
	Allocations { device: usize, count: usize },
	Error { device: usize, message: String },
}

impl DeviceResponse {
	pub(crate) fn device(&self) -> usize {
		match self {
			Self::BufferCreated { device, .. }
			| Self::DataRetrieved { device, .. }
			| Self::Executed { device }
			| Self::Synchronized { device }
			| Self::Released { device }
			| Self::Allocations { device, .. }
			| Self::Error { device, .. } => *device,
		}
	}
}

fn respond<T, E: std::fmt::Display>(
	device: usize,
	response: &Sender<DeviceResponse>,
	result: core::result::Result<T, E>,
	ok: impl FnOnce(T) -> DeviceResponse,
) {
	let resp = match result {
		Ok(value) => ok(value),
		Err(e) => DeviceResponse::Error {
			device,
			message: e.to_string(),
		},
	};
	// The host may have given up waiting; a dropped receiver is not an error here.
	let _ = response.send(resp);
}

/// Serves commands for one device in submission order until `Shutdown`.
pub(crate) fn device_worker<N: Numeric>(
	props: DeviceProperties,
	rx: Receiver<DeviceCommand<N>>,
) {
	let device = props.index;
	let pool = DeviceMemoryPool::<N>::new(props);
	debug!(device, "device worker started");

	while let Ok(command) = rx.recv() {
		match command {
			DeviceCommand::Upload { bytes, response } => {
				let result = pool.allocate_from_bytes(&bytes);
				respond(device, &response, result, |buffer| {
					DeviceResponse::BufferCreated { device, buffer }
				});
			},
			DeviceCommand::CreateZeroed { len, response } => {
				let result = pool.allocate_zeroed(len);
				respond(device, &response, result, |buffer| {
					DeviceResponse::BufferCreated { device, buffer }
				});
			},
			DeviceCommand::Read { buffer, response } => {
				let result = pool.read_bytes(&buffer);
				respond(device, &response, result, |bytes| {
					DeviceResponse::DataRetrieved { device, bytes }
				});
			},
			DeviceCommand::ExecuteKernel {
				name,
				executor,
				response,
			} => {
				debug!(device, kernel = name, "executing kernel");
				let result = executor(&pool);
				if let Err(e) = &result {
					warn!(device, kernel = name, error = %e, "kernel failed");
				}
				respond(device, &response, result, |_| {
					DeviceResponse::Executed { device }
				});
			},
			DeviceCommand::Synchronize { response } => {
				let _ = response.send(DeviceResponse::Synchronized { device });
			},
			DeviceCommand::Release { buffer, response } => {
				let result = pool.deallocate(&buffer);
				respond(device, &response, result, |_| {
					DeviceResponse::Released { device }
				});
			},
			DeviceCommand::CountAllocations { response } => {
				let result = pool.allocation_count();
				respond(device, &response, result, |count| {
					DeviceResponse::Allocations { device, count }
				});
			},
			DeviceCommand::Shutdown => break,
		}
	}

	match pool.allocation_count() {
		Ok(0) => debug!(device, "device worker stopped"),
		Ok(live) => warn!(device, live, "device worker stopped with live buffers"),
		Err(e) => warn!(device, error = %e, "device worker stopped"),
	}
}
