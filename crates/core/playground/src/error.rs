// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Dispatch(#[from] lib_reduce::DispatchError),
	#[error("Launch file error: {0}")]
	Store(#[from] lib_store::error::StoreError),
	#[error("Output Error")]
	Output(#[from] std::io::Error),
}
