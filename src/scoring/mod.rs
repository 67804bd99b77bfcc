// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Scoring and ranking: how search results get their numbers.
//!
//! [`core`] holds the per-document relevance math the index evaluates.
//! [`ranking`] takes the index's raw hits and runs them through filters and
//! boosts that need the query's keywords, the settings, or the document
//! itself.

pub mod core;
pub mod ranking;

pub use self::core::*;
