// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the sift command-line interface.
//!
//! Three subcommands: `index` to (re)build the index of a notes directory,
//! `search` to query it, and `inspect` to examine a persisted cache blob.
//! The index lives in `<vault>/.sift/` unless `--cache` points elsewhere.

pub mod display;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sift",
    about = "Full-text search for a directory of notes",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rebuild the index of a notes directory from scratch
    Index {
        /// Notes directory
        vault: PathBuf,

        /// Cache directory (default: <vault>/.sift)
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Settings file (JSON, camelCase keys)
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },

    /// Search a notes directory, building its index first if needed
    Search {
        /// Notes directory
        vault: PathBuf,

        /// Search query, e.g. `garden -weeds "raised bed" ext:md path:projects`
        query: String,

        /// Maximum number of results to display
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Only search inside this document id, one excerpt per match group
        #[arg(long = "in", value_name = "ID")]
        single: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Cache directory (default: <vault>/.sift)
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Settings file (JSON, camelCase keys)
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },

    /// Inspect a persisted index cache
    Inspect {
        /// Cache blob file, or a cache directory
        file: PathBuf,
    },
}
