// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use super::line::PACKING_WIDTH;

/// Host-side representation of a device buffer.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct BufferRep {
	pub id: usize,
	pub len: usize,
	pub byte_size: usize,
}

impl BufferRep {
	pub fn size_in_bytes(&self) -> usize {
		self.len * self.byte_size
	}

	pub fn lines(&self) -> usize {
		self.len / PACKING_WIDTH
	}
}
