// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

pub mod launch;

pub use launch::*;

use crate::error::{Result, StoreError};

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchFile {
	pub version: String,
	pub launch: LaunchSection,
	#[serde(default)]
	pub device: DeviceSection,
	#[serde(default)]
	pub fill: Fill,
}

impl LaunchFile {
	pub fn cfg_version() -> String {
		"0.1".to_string()
	}

	/// The 1024-element, 64-wide sequence run.
	pub fn reference() -> Self {
		Self {
			version: Self::cfg_version(),
			launch: LaunchSection {
				total_elements: 1024,
				local_item_size: 64,
				packing_width: 4,
			},
			device: DeviceSection::default(),
			fill: Fill::Sequence,
		}
	}

	pub fn get_config(path: impl AsRef<Path>) -> Result<LaunchFile> {
		let file = File::open(path.as_ref())?;
		let reader = BufReader::new(file);

		let config: LaunchFile = serde_json::from_reader(reader)?;
		if config.version != Self::cfg_version() {
			Err(StoreError::InvalidConfig {
				found: config.version,
				expected: Self::cfg_version(),
			})
		} else {
			Ok(config)
		}
	}

	pub fn save(
		&self,
		path: impl AsRef<Path>,
	) -> Result<()> {
		let file = File::create(path.as_ref())?;
		serde_json::to_writer_pretty(file, self)?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	fn write(contents: &str) -> NamedTempFile {
		let mut file = NamedTempFile::new().unwrap();
		file.write_all(contents.as_bytes()).unwrap();
		file
	}

	#[test]
	fn test_full_file() {
		let file = write(
			r#"{
				"version": "0.1",
				"launch": { "total_elements": 2048, "local_item_size": 128, "packing_width": 4 },
				"device": { "compute_units": 2, "timeout_ms": 500, "pin_core": 3 },
				"fill": "random"
			}"#,
		);

		let config = LaunchFile::get_config(file.path()).unwrap();
		assert_eq!(config.launch.total_elements, 2048);
		assert_eq!(config.launch.local_item_size, 128);
		assert_eq!(config.device.compute_units, Some(2));
		assert_eq!(config.device.timeout_ms, 500);
		assert_eq!(config.device.pin_core, Some(3));
		assert_eq!(config.fill, Fill::Random);
	}

	#[test]
	fn test_defaults() {
		let file = write(
			r#"{ "version": "0.1", "launch": { "total_elements": 1024, "local_item_size": 64 } }"#,
		);

		let config = LaunchFile::get_config(file.path()).unwrap();
		assert_eq!(config, LaunchFile::reference());
	}

	#[test]
	fn test_wrong_version() {
		let file = write(
			r#"{ "version": "0.0", "launch": { "total_elements": 1024, "local_item_size": 64 } }"#,
		);

		assert!(matches!(
			LaunchFile::get_config(file.path()),
			Err(StoreError::InvalidConfig { .. })
		));
	}

	#[test]
	fn test_malformed_and_missing() {
		let file = write(r#"{ "version": "0.1" }"#);
		assert!(matches!(
			LaunchFile::get_config(file.path()),
			Err(StoreError::SerdeJsonError(_))
		));

		let dir = tempfile::tempdir().unwrap();
		assert!(matches!(
			LaunchFile::get_config(dir.path().join("missing.json")),
			Err(StoreError::IOError(_))
		));
	}

	#[test]
	fn test_save_then_load() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("launch.json");

		let mut config = LaunchFile::reference();
		config.fill = Fill::Ones;
		config.save(&path).unwrap();

		assert_eq!(LaunchFile::get_config(&path).unwrap(), config);
	}
}
