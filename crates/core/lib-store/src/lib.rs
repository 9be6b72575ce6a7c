// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

pub mod cfg;
pub mod error;

use crate::cfg::LaunchFile;
use crate::error::Result;
use std::path::Path;

/// Loads a launch file, or the reference launch when no path is given.
pub fn launch_from_file(path: Option<&Path>) -> Result<LaunchFile> {
	match path {
		Some(path) => LaunchFile::get_config(path),
		None => Ok(LaunchFile::reference()),
	}
}
