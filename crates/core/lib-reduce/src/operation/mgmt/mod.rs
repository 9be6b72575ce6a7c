// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

mod buffer;
mod config;
mod dispatch;
mod error;
mod partition;
mod queue;


pub use buffer::DeviceBuffer;
pub use config::{EngineConfig, DEFAULT_TIMEOUT};
pub use dispatch::{PartialSums, Reducer};
pub use error::{DispatchError, PartitionError, Result, Stage};
pub use partition::{LaunchParams, Partition};
pub use queue::CommandQueue;
