// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use super::barrier::{BarrierBroken, GroupBarrier};
use super::error::{DeviceError, Result};
use super::memory::LocalMemory;
use super::properties::DeviceProperties;
use crossbeam::thread::Scope;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(test)]
thread_local! {
	// Remaining successful spawns before `spawn_member` fails.
	static SPAWN_BUDGET: std::cell::Cell<Option<usize>> = const { std::cell::Cell::new(None) };
}

/// 1-D index space of a launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NdRange {
	pub global_size: usize,
	pub local_size: usize,
}

impl NdRange {
	pub fn new(
		global_size: usize,
		local_size: usize,
	) -> Self {
		Self {
			global_size,
			local_size,
		}
	}

	pub fn group_count(&self) -> usize {
		self.global_size / self.local_size.max(1)
	}

	pub fn validate(
		&self,
		props: &DeviceProperties,
	) -> Result<()> {
		let invalid = self.global_size == 0
			|| self.local_size == 0
			|| self.local_size > props.max_work_group_size
			|| self.global_size % self.local_size != 0;

		if invalid {
			return Err(DeviceError::InvalidRange {
				global: self.global_size,
				local: self.local_size,
			});
		}
		Ok(())
	}
}

/// Execution context handed to the kernel body, one per work-item.
pub struct WorkItem<'a> {
	global_id: usize,
	local_id: usize,
	group_id: usize,
	local_size: usize,
	num_groups: usize,
	barrier: &'a GroupBarrier,
}

impl WorkItem<'_> {
	pub fn global_id(&self) -> usize {
		self.global_id
	}

	pub fn local_id(&self) -> usize {
		self.local_id
	}

	pub fn group_id(&self) -> usize {
		self.group_id
	}

	pub fn local_size(&self) -> usize {
		self.local_size
	}

	pub fn num_groups(&self) -> usize {
		self.num_groups
	}

	/// Work-group barrier with a local memory fence.
	///
	/// Every work-item of the group must reach the same call. If a sibling died the
	/// barrier is broken and this work-item unwinds out of the kernel.
	pub fn barrier(&self) {
		if self.barrier.wait().is_err() {
			panic::resume_unwind(Box::new(BarrierBroken));
		}
	}
}

struct Team<L: Copy + Default + Send> {
	barrier: GroupBarrier,
	scratch: LocalMemory<L>,
}

impl<L: Copy + Default + Send> Team<L> {
	fn new(
		local_size: usize,
		local_len: usize,
	) -> Self {
		Self {
			barrier: GroupBarrier::new(local_size),
			scratch: LocalMemory::new(local_len),
		}
	}

	// Compute unit `unit` owns groups unit, unit + units, unit + 2 * units, ...
	fn run<F>(
		&self,
		unit: usize,
		units: usize,
		local_id: usize,
		range: NdRange,
		kernel: &F,
	) -> core::result::Result<(), BarrierBroken>
	where
		F: Fn(&WorkItem<'_>, &LocalMemory<L>) + Sync,
	{
		let num_groups = range.group_count();
		for group_id in (unit..num_groups).step_by(units) {
			for slot in (local_id..self.scratch.len()).step_by(range.local_size) {
				self.scratch.reset(slot);
			}
			self.barrier.wait()?;

			let item = WorkItem {
				global_id: group_id * range.local_size + local_id,
				local_id,
				group_id,
				local_size: range.local_size,
				num_groups,
				barrier: &self.barrier,
			};
			kernel(&item, &self.scratch);

			self.barrier.wait()?;
		}
		Ok(())
	}
}

fn spawn_member<'env, G>(
	s: &Scope<'env>,
	unit: usize,
	local_id: usize,
	body: G,
) -> io::Result<()>
where
	G: FnOnce(&Scope<'env>) + Send + 'env,
{
	#[cfg(test)]
	if let Some(left) = SPAWN_BUDGET.with(|budget| budget.get()) {
		if left == 0 {
			return Err(io::Error::new(io::ErrorKind::WouldBlock, "thread budget exhausted"));
		}
		SPAWN_BUDGET.with(|budget| budget.set(Some(left - 1)));
	}

	s.builder()
		.name(format!("work-item-{}-{}", unit, local_id))
		.spawn(body)
		.map(drop)
}

/// Runs `kernel` once per work-item of `range` and blocks until every group is done.
///
/// Each compute unit gets a team of `range.local_size` threads sharing one barrier
/// and `local_len` slots of scratch memory. Scratch is zeroed before each group.
pub fn launch<L, F>(
	props: &DeviceProperties,
	range: NdRange,
	local_len: usize,
	kernel: F,
) -> Result<()>
where
	L: Copy + Default + Send,
	F: Fn(&WorkItem<'_>, &LocalMemory<L>) + Sync,
{
	range.validate(props)?;

	let units = props.compute_units.clamp(1, range.group_count());
	let teams: Vec<Team<L>> = (0..units)
		.map(|_| Team::new(range.local_size, local_len))
		.collect();
	let failed = AtomicBool::new(false);

	let spawned = crossbeam::scope(|s| {
		for (unit, team) in teams.iter().enumerate() {
			for local_id in 0..range.local_size {
				let kernel = &kernel;
				let failed = &failed;
				let spawn = spawn_member(s, unit, local_id, move |_| {
					let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
						team.run(unit, units, local_id, range, kernel)
					}));
					if !matches!(outcome, Ok(Ok(()))) {
						failed.store(true, Ordering::SeqCst);
						team.barrier.break_barrier();
					}
				});

				if let Err(e) = spawn {
					// Members already running would wait forever on missing teammates.
					for team in &teams {
						team.barrier.break_barrier();
					}
					return Err(DeviceError::Spawn(e.to_string()));
				}
			}
		}
		Ok(())
	})
	.map_err(|_| DeviceError::WorkItemPanic)?;
	spawned?;

	if failed.load(Ordering::SeqCst) {
		return Err(DeviceError::WorkItemPanic);
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::AtomicUsize;
	use std::sync::Mutex;

	fn props(units: usize) -> DeviceProperties {
		DeviceProperties::detect(0).with_compute_units(units)
	}

	#[test]
	fn test_every_work_item_runs_once() {
		let range = NdRange::new(64, 8);
		let hits: Vec<AtomicUsize> = (0..64).map(|_| AtomicUsize::new(0)).collect();

		launch::<u32, _>(&props(3), range, 8, |item, _| {
			hits[item.global_id()].fetch_add(1, Ordering::SeqCst);
		})
		.unwrap();

		assert!(hits.iter().all(|h| h.load(Ordering::SeqCst) == 1));
	}

	#[test]
	fn test_ids_are_consistent() {
		let range = NdRange::new(32, 4);
		let seen = Mutex::new(Vec::new());

		launch::<u32, _>(&props(2), range, 4, |item, _| {
			assert_eq!(item.num_groups(), 8);
			assert_eq!(
				item.global_id(),
				item.group_id() * item.local_size() + item.local_id()
			);
			seen.lock().unwrap().push(item.global_id());
		})
		.unwrap();

		let mut seen = seen.into_inner().unwrap();
		seen.sort_unstable();
		assert_eq!(seen, (0..32).collect::<Vec<_>>());
	}

	#[test]
	fn test_scratch_is_shared_within_group() {
		let range = NdRange::new(16, 4);
		let sums: Vec<AtomicUsize> = (0..4).map(|_| AtomicUsize::new(0)).collect();

		launch::<usize, _>(&props(2), range, 4, |item, scratch| {
			scratch.store(item.local_id(), item.global_id());
			item.barrier();
			if item.local_id() == 0 {
				let total = (0..4).map(|slot| scratch.load(slot)).sum();
				sums[item.group_id()].store(total, Ordering::SeqCst);
			}
		})
		.unwrap();

		let sums: Vec<usize> = sums.iter().map(|s| s.load(Ordering::SeqCst)).collect();
		assert_eq!(sums, vec![6, 22, 38, 54]);
	}

	#[test]
	fn test_scratch_starts_zeroed_each_group() {
		let range = NdRange::new(8, 2);

		launch::<usize, _>(&props(1), range, 2, |item, scratch| {
			assert_eq!(scratch.load(item.local_id()), 0);
			item.barrier();
			scratch.store(item.local_id(), 99);
		})
		.unwrap();
	}

	#[test]
	fn test_panicking_item_fails_launch() {
		let range = NdRange::new(16, 4);

		let result = launch::<u32, _>(&props(2), range, 4, |item, _| {
			if item.group_id() == 1 && item.local_id() == 2 {
				panic!("injected work-item fault");
			}
			item.barrier();
		});

		assert!(matches!(result, Err(DeviceError::WorkItemPanic)));
	}

	#[test]
	fn test_spawn_failure_releases_started_items() {
		let range = NdRange::new(32, 8);
		SPAWN_BUDGET.with(|budget| budget.set(Some(11)));

		let result = launch::<u32, _>(&props(2), range, 8, |item, _| {
			item.barrier();
		});
		SPAWN_BUDGET.with(|budget| budget.set(None));

		assert!(matches!(result, Err(DeviceError::Spawn(_))));
		assert!(launch::<u32, _>(&props(2), range, 8, |item, _| item.barrier()).is_ok());
	}

	#[test]
	fn test_invalid_ranges_are_rejected() {
		let p = props(1);
		assert!(NdRange::new(0, 4).validate(&p).is_err());
		assert!(NdRange::new(16, 0).validate(&p).is_err());
		assert!(NdRange::new(18, 4).validate(&p).is_err());
		assert!(NdRange::new(1024, 512).validate(&p).is_err());
		assert!(NdRange::new(1024, 256).validate(&p).is_ok());
	}
}
