// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

mod barrier;
mod error;
mod kernels;
mod launch;
mod line;
mod mem_rep;
mod memory;
mod pool;
mod program;
mod properties;
mod worker;

pub(crate) use worker::*;

pub use barrier::{BarrierBroken, GroupBarrier};
pub use error::{BuildError, DeviceError};
pub use kernels::*;
pub use launch::{launch, NdRange, WorkItem};
pub use line::{Line4, Numeric, PACKING_WIDTH};
pub use mem_rep::BufferRep;
pub use memory::{GlobalBuffer, LocalMemory};
pub use pool::DeviceMemoryPool;
pub use program::{BuiltKernel, KernelSource, Program, PROGRAM_ABI_VERSION};
pub use properties::{DeviceProperties, LOCAL_MEM_SIZE, MAX_WORK_GROUP_SIZE};
