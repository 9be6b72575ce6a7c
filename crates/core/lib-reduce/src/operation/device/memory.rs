// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use super::line::{Line4, Numeric, PACKING_WIDTH};
use crossbeam::atomic::AtomicCell;

/// Device global memory: one cell per scalar, shared by every work-item of a launch.
#[derive(Debug)]
pub struct GlobalBuffer<N: Numeric> {
	cells: Box<[AtomicCell<N>]>,
}

impl<N: Numeric> GlobalBuffer<N> {
	pub fn zeroed(len: usize) -> Self {
		let cells = (0..len).map(|_| AtomicCell::new(N::zero())).collect();
		Self { cells }
	}

	pub fn from_slice(values: &[N]) -> Self {
		let cells = values.iter().map(|&v| AtomicCell::new(v)).collect();
		Self { cells }
	}

	pub fn len(&self) -> usize {
		self.cells.len()
	}

	pub fn is_empty(&self) -> bool {
		self.cells.is_empty()
	}

	/// Number of whole packed lines in the buffer.
	pub fn lines(&self) -> usize {
		self.cells.len() / PACKING_WIDTH
	}

	pub fn load(
		&self,
		index: usize,
	) -> N {
		self.cells[index].load()
	}

	pub fn store(
		&self,
		index: usize,
		value: N,
	) {
		self.cells[index].store(value);
	}

	/// Packed load of scalars `[4 * line, 4 * line + 4)`.
	pub fn load_line(
		&self,
		line: usize,
	) -> Line4<N> {
		let base = line * PACKING_WIDTH;
		Line4::new([
			self.load(base),
			self.load(base + 1),
			self.load(base + 2),
			self.load(base + 3),
		])
	}

	pub fn to_vec(&self) -> Vec<N> {
		self.cells.iter().map(AtomicCell::load).collect()
	}
}

/// Work-group scratch memory, one slot per local id.
#[derive(Debug)]
pub struct LocalMemory<L: Copy + Default + Send> {
	slots: Box<[AtomicCell<L>]>,
}

impl<L: Copy + Default + Send> LocalMemory<L> {
	pub fn new(len: usize) -> Self {
		let slots = (0..len).map(|_| AtomicCell::new(L::default())).collect();
		Self { slots }
	}

	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	pub fn load(
		&self,
		slot: usize,
	) -> L {
		self.slots[slot].load()
	}

	pub fn store(
		&self,
		slot: usize,
		value: L,
	) {
		self.slots[slot].store(value);
	}

	pub fn reset(
		&self,
		slot: usize,
	) {
		self.slots[slot].store(L::default());
	}
}
