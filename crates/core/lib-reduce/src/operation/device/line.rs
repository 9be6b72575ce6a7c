// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use bytemuck::Pod;
use std::fmt::Debug;
use std::ops::{Add, AddAssign};

/// Number of scalars packed into one work-item load.
pub const PACKING_WIDTH: usize = 4;

/// Scalar element type the device can reduce.
pub trait Numeric:
	Pod + Debug + PartialEq + PartialOrd + Send + Sync + Add<Output = Self> + AddAssign + 'static
{
	fn zero() -> Self;

	fn from_usize(value: usize) -> Self;

	fn to_f64(self) -> f64;
}

macro_rules! impl_numeric {
	($($ty:ty),*) => {
		$(
			impl Numeric for $ty {
				fn zero() -> Self {
					0.0
				}

				fn from_usize(value: usize) -> Self {
					value as $ty
				}

				fn to_f64(self) -> f64 {
					self as f64
				}
			}
		)*
	};
}

impl_numeric!(f32, f64);

/// Packed 4-wide value, the emulated `float4`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Line4<N: Numeric> {
	lanes: [N; PACKING_WIDTH],
}

impl<N: Numeric> Line4<N> {
	pub fn new(lanes: [N; PACKING_WIDTH]) -> Self {
		Self { lanes }
	}

	pub fn splat(value: N) -> Self {
		Self {
			lanes: [value; PACKING_WIDTH],
		}
	}

	pub fn zero() -> Self {
		Self::splat(N::zero())
	}

	/// Packs the first four scalars of `values`.
	pub fn from_slice(values: &[N]) -> Option<Self> {
		let lanes: [N; PACKING_WIDTH] = values.get(..PACKING_WIDTH)?.try_into().ok()?;
		Some(Self { lanes })
	}

	pub fn lanes(&self) -> &[N; PACKING_WIDTH] {
		&self.lanes
	}

	/// Sum of the four lanes, left to right. Same as `dot(v, (1, 1, 1, 1))`.
	pub fn horizontal_sum(&self) -> N {
		let [x, y, z, w] = self.lanes;
		x + y + z + w
	}
}

impl<N: Numeric> Default for Line4<N> {
	fn default() -> Self {
		Self::zero()
	}
}

impl<N: Numeric> Add for Line4<N> {
	type Output = Self;

	fn add(
		mut self,
		rhs: Self,
	) -> Self {
		self += rhs;
		self
	}
}

impl<N: Numeric> AddAssign for Line4<N> {
	fn add_assign(
		&mut self,
		rhs: Self,
	) {
		for (lane, other) in self.lanes.iter_mut().zip(rhs.lanes) {
			*lane += other;
		}
	}
}
