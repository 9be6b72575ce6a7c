// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

mod base;
mod reduction;

pub use base::{Kernel, KernelConfig, KernelInput, KernelOrder, KernelOutput};
pub use reduction::ReductionVector;
