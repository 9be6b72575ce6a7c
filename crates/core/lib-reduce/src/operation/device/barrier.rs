// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Returned to every waiter once a team member has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierBroken;

#[derive(Debug)]
struct BarrierState {
	arrived: usize,
	generation: u64,
	broken: bool,
}

/// Reusable work-group barrier driven by a generation counter.
///
/// Unlike `std::sync::Barrier` it can be broken: when one work-item dies, the
/// remaining members are released with [`BarrierBroken`] instead of waiting forever.
#[derive(Debug)]
pub struct GroupBarrier {
	size: usize,
	state: Mutex<BarrierState>,
	cvar: Condvar,
}

impl GroupBarrier {
	pub fn new(size: usize) -> Self {
		Self {
			size: size.max(1),
			state: Mutex::new(BarrierState {
				arrived: 0,
				generation: 0,
				broken: false,
			}),
			cvar: Condvar::new(),
		}
	}

	fn lock(&self) -> MutexGuard<'_, BarrierState> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	pub fn wait(&self) -> Result<(), BarrierBroken> {
		let mut state = self.lock();
		if state.broken {
			return Err(BarrierBroken);
		}

		let generation = state.generation;
		state.arrived += 1;
		if state.arrived == self.size {
			state.arrived = 0;
			state.generation = state.generation.wrapping_add(1);
			self.cvar.notify_all();
			return Ok(());
		}

		while state.generation == generation && !state.broken {
			state = self
				.cvar
				.wait(state)
				.unwrap_or_else(PoisonError::into_inner);
		}

		if state.generation != generation {
			Ok(())
		} else {
			Err(BarrierBroken)
		}
	}

	pub fn break_barrier(&self) {
		let mut state = self.lock();
		state.broken = true;
		self.cvar.notify_all();
	}

	pub fn is_broken(&self) -> bool {
		self.lock().broken
	}

	pub fn generation(&self) -> u64 {
		self.lock().generation
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};

	#[test]
	fn test_generation_advances_per_phase() {
		let barrier = GroupBarrier::new(4);
		let counter = AtomicUsize::new(0);

		crossbeam::scope(|s| {
			for _ in 0..4 {
				s.spawn(|_| {
					for _ in 0..3 {
						counter.fetch_add(1, Ordering::SeqCst);
						barrier.wait().unwrap();
					}
				});
			}
		})
		.unwrap();

		assert_eq!(counter.load(Ordering::SeqCst), 12);
		assert_eq!(barrier.generation(), 3);
	}

	#[test]
	fn test_phase_is_visible_after_wait() {
		let barrier = GroupBarrier::new(2);
		let arrivals = AtomicUsize::new(0);

		crossbeam::scope(|s| {
			for _ in 0..2 {
				s.spawn(|_| {
					arrivals.fetch_add(1, Ordering::SeqCst);
					barrier.wait().unwrap();
					assert_eq!(arrivals.load(Ordering::SeqCst), 2);
				});
			}
		})
		.unwrap();
	}

	#[test]
	fn test_break_releases_waiters() {
		let barrier = GroupBarrier::new(3);

		crossbeam::scope(|s| {
			let a = s.spawn(|_| barrier.wait());
			let b = s.spawn(|_| barrier.wait());
			while barrier.lock().arrived < 2 {
				std::thread::yield_now();
			}
			barrier.break_barrier();
			assert_eq!(a.join().unwrap(), Err(BarrierBroken));
			assert_eq!(b.join().unwrap(), Err(BarrierBroken));
		})
		.unwrap();

		assert!(barrier.is_broken());
		assert_eq!(barrier.wait(), Err(BarrierBroken));
	}
}
