// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Crate-level error type.
//!
//! Each concern has its own error enum; this one wraps them for callers that
//! want a single `Result`. Most engine operations never return it: they log
//! and degrade instead.

use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::engine::ProviderError;
use crate::index::IndexError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
