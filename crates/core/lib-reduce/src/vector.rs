// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use crate::operation::Numeric;
use bytemuck::cast_slice;

/// Host-side input of a reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct InputVector<N: Numeric> {
	data: Vec<N>,
}

impl<N: Numeric> InputVector<N> {
	pub fn new(data: Vec<N>) -> Self {
		Self { data }
	}

	/// `[0, 1, ..., len - 1]`
	pub fn sequence(len: usize) -> Self {
		Self::new((0..len).map(N::from_usize).collect())
	}

	pub fn zeros(len: usize) -> Self {
		Self::filled(len, N::zero())
	}

	pub fn filled(
		len: usize,
		value: N,
	) -> Self {
		Self::new(vec![value; len])
	}

	pub fn data(&self) -> &[N] {
		&self.data
	}

	pub fn bytes(&self) -> &[u8] {
		cast_slice(&self.data)
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	pub fn into_inner(self) -> Vec<N> {
		self.data
	}
}

impl<N: Numeric> From<Vec<N>> for InputVector<N> {
	fn from(data: Vec<N>) -> Self {
		Self::new(data)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_sequence() {
		let v = InputVector::<f32>::sequence(5);
		assert_eq!(v.data(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
		assert_eq!(v.bytes().len(), 20);
	}

	#[test]
	fn test_filled() {
		let v = InputVector::filled(3, 1.5f64);
		assert_eq!(v.len(), 3);
		assert!(v.data().iter().all(|x| *x == 1.5));
		assert!(InputVector::<f32>::zeros(0).is_empty());
	}
}
