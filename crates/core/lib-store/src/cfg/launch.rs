// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use serde::{Deserialize, Serialize};

fn default_packing_width() -> usize {
	4
}

fn default_timeout_ms() -> u64 {
	30_000
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSection {
	pub total_elements: usize,
	pub local_item_size: usize,
	#[serde(default = "default_packing_width")]
	pub packing_width: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSection {
	pub compute_units: Option<usize>,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	pub pin_core: Option<usize>,
}

impl Default for DeviceSection {
	fn default() -> Self {
		Self {
			compute_units: None,
			timeout_ms: default_timeout_ms(),
			pin_core: None,
		}
	}
}

/// How the playground fills the input vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
	#[default]
	Sequence,
	Zeros,
	Ones,
	Random,
}
